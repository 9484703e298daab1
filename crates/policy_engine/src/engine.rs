//! Engine facade
//!
//! [`PolicyEngine`] is what an orchestrator calls: it owns the product and
//! coefficient catalogs and the number generator, and exposes the five
//! engine operations over them.

use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use core_kernel::TenantId;
use domain_calculation::{CalculationReport, Calculator, ProductCatalog, ProductVersion};
use domain_coefficient::{CoefficientCatalog, CoefficientColumn, CoefficientTableId};
use domain_numbering::{NumberGenerator, NumberGeneratorPort};
use domain_rules::{RuleResult, ValidationRule, Validator};
use domain_variables::{resolve, VariableContext, VariableDefinition};

use crate::config::EngineConfig;
use crate::error::EngineError;

/// Calculation and validation over loaded product configuration
pub struct PolicyEngine {
    products: ProductCatalog,
    coefficients: CoefficientCatalog,
    numbers: NumberGenerator,
}

impl PolicyEngine {
    pub fn new(products: ProductCatalog, coefficients: CoefficientCatalog, numbers: NumberGenerator) -> Self {
        Self {
            products,
            coefficients,
            numbers,
        }
    }

    /// Creates an engine with empty catalogs, configured from `config`
    pub fn from_config(config: &EngineConfig, port: Arc<dyn NumberGeneratorPort>) -> Result<Self, EngineError> {
        let products = ProductCatalog::new().with_default_currency(config.currency()?);
        let numbers = NumberGenerator::new(port, config.timezone()?, config.number_cas_max_retries);
        Ok(Self::new(products, CoefficientCatalog::new(), numbers))
    }

    pub fn products(&self) -> &ProductCatalog {
        &self.products
    }

    pub fn products_mut(&mut self) -> &mut ProductCatalog {
        &mut self.products
    }

    pub fn coefficients(&self) -> &CoefficientCatalog {
        &self.coefficients
    }

    pub fn coefficients_mut(&mut self) -> &mut CoefficientCatalog {
        &mut self.coefficients
    }

    pub fn numbers(&self) -> &NumberGenerator {
        &self.numbers
    }

    /// Loads a tenant's product definitions from a file or a directory
    pub fn load_products(&mut self, tenant: TenantId, path: &Path) -> Result<usize, EngineError> {
        let count = if path.is_dir() {
            self.products.load_dir(tenant, path)?
        } else {
            self.products.load_from_file(tenant, path)?
        };
        Ok(count)
    }

    /// Loads coefficient tables from a JSON file
    pub fn load_coefficients(&mut self, path: &Path) -> Result<usize, EngineError> {
        let count = self.coefficients.load_from_file(path)?;
        info!(path = %path.display(), tables = count, "Loaded coefficient tables");
        Ok(count)
    }

    /// Reads typed variables out of a document
    pub fn resolve_variables(&self, document: &Value, definitions: &[VariableDefinition]) -> VariableContext {
        resolve(document, definitions)
    }

    /// Evaluates every rule, failing ones included
    pub fn validate(&self, ctx: &VariableContext, rules: &[ValidationRule]) -> Vec<RuleResult> {
        Validator::validate(ctx, rules)
    }

    /// Evaluates a product's pre-calculation rules against a document
    pub fn pre_validate(
        &self,
        tenant: TenantId,
        product_code: &str,
        version_no: Option<u32>,
        document: &Value,
    ) -> Result<Vec<RuleResult>, EngineError> {
        let product = self.product(tenant, product_code, version_no)?;
        Ok(Calculator::new(tenant, &self.coefficients).pre_validate(document, &product))
    }

    /// Calculates a document with one product version, or the latest one
    pub fn calculate(
        &self,
        tenant: TenantId,
        product_code: &str,
        version_no: Option<u32>,
        document: Value,
    ) -> Result<CalculationReport, EngineError> {
        let product = self.product(tenant, product_code, version_no)?;
        let report = Calculator::new(tenant, &self.coefficients).calculate(document, &product)?;
        Ok(report)
    }

    /// Looks up a coefficient with the values known in `ctx`
    pub fn lookup_coefficient(
        &self,
        table: &CoefficientTableId,
        ctx: &VariableContext,
        columns: &[CoefficientColumn],
    ) -> Option<String> {
        self.coefficients.lookup(table, &ctx.known_values(), columns)
    }

    /// Issues the next number of a product
    pub async fn next_number(
        &self,
        tenant: TenantId,
        product_code: &str,
        values: &HashMap<String, String>,
    ) -> Result<String, EngineError> {
        Ok(self.numbers.next(tenant, product_code, values).await?)
    }

    fn product(
        &self,
        tenant: TenantId,
        product_code: &str,
        version_no: Option<u32>,
    ) -> Result<Arc<ProductVersion>, EngineError> {
        let product = match version_no {
            Some(version) => self.products.get(tenant, product_code, version)?,
            None => self.products.latest(tenant, product_code)?,
        };
        Ok(product)
    }
}
