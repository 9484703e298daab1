//! Product catalog
//!
//! In-memory registry of product versions per tenant. Versions are checked
//! when registered, so a calculation never starts from a broken definition.

use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use core_kernel::{Currency, TenantId};

use crate::error::CalculationError;
use crate::product::ProductVersion;

type ProductKey = (TenantId, String, u32);

/// Registered product versions keyed by tenant, product code and version
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: HashMap<ProductKey, Arc<ProductVersion>>,
    default_currency: Currency,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currency given to loaded definitions that do not name one
    pub fn with_default_currency(mut self, currency: Currency) -> Self {
        self.default_currency = currency;
        self
    }

    /// Adds or replaces a product version
    pub fn register(&mut self, tenant: TenantId, product: ProductVersion) -> Result<(), CalculationError> {
        product.check()?;
        debug!(%tenant, product = %product.product_code, version = product.version_no, "Registered product version");
        let key = (tenant, product.product_code.clone(), product.version_no);
        self.products.insert(key, Arc::new(product));
        Ok(())
    }

    /// Returns one version of a product
    pub fn get(&self, tenant: TenantId, product_code: &str, version_no: u32) -> Result<Arc<ProductVersion>, CalculationError> {
        self.products
            .get(&(tenant, product_code.to_string(), version_no))
            .cloned()
            .ok_or_else(|| CalculationError::product_not_found(product_code, Some(version_no)))
    }

    /// Returns the highest registered version of a product
    pub fn latest(&self, tenant: TenantId, product_code: &str) -> Result<Arc<ProductVersion>, CalculationError> {
        self.products
            .iter()
            .filter(|((t, code, _), _)| *t == tenant && code == product_code)
            .max_by_key(|((_, _, version), _)| *version)
            .map(|(_, product)| product.clone())
            .ok_or_else(|| CalculationError::product_not_found(product_code, None))
    }

    /// Version numbers registered for a product, ascending
    pub fn versions(&self, tenant: TenantId, product_code: &str) -> Vec<u32> {
        let mut versions: Vec<u32> = self
            .products
            .keys()
            .filter(|(t, code, _)| *t == tenant && code == product_code)
            .map(|(_, _, version)| *version)
            .collect();
        versions.sort_unstable();
        versions
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Loads one product version, or an array of them, from JSON
    pub fn load_from_str(&mut self, tenant: TenantId, json_str: &str) -> Result<usize, CalculationError> {
        let value: Value = serde_json::from_str(json_str).map_err(|e| CalculationError::Parse(e.to_string()))?;
        let mut items = match value {
            Value::Array(items) => items,
            other => vec![other],
        };
        for item in &mut items {
            if let Value::Object(fields) = item {
                fields
                    .entry("currency")
                    .or_insert_with(|| Value::String(self.default_currency.code().to_string()));
            }
        }
        let products: Vec<ProductVersion> = serde_json::from_value(Value::Array(items))
            .map_err(|e| CalculationError::Parse(e.to_string()))?;

        let count = products.len();
        for product in products {
            self.register(tenant, product)?;
        }
        Ok(count)
    }

    pub fn load_from_file(&mut self, tenant: TenantId, path: &Path) -> Result<usize, CalculationError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CalculationError::Parse(format!("{}: {}", path.display(), e)))?;
        self.load_from_str(tenant, &content)
    }

    /// Loads every `*.json` file of a directory, in file name order
    pub fn load_dir(&mut self, tenant: TenantId, dir: &Path) -> Result<usize, CalculationError> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| CalculationError::Parse(format!("{}: {}", dir.display(), e)))?;

        let mut files: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        let mut count = 0;
        for file in &files {
            count += self.load_from_file(tenant, file)?;
        }
        info!(dir = %dir.display(), files = files.len(), products = count, "Loaded product definitions");
        Ok(count)
    }
}
