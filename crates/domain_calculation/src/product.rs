//! Product version definitions
//!
//! A product version is the declarative description the calculator runs:
//! which variables to read, what to compute, which covers exist and where
//! results go in the policy document. Versions are loaded from JSON.
//!
//! # Cover paths
//!
//! Cover-scoped variable paths are relative to the cover node. The cover
//! node is found with `coverPath`, a pattern with two placeholders:
//!
//! ```text
//! insuredObjects[{object}].covers[?(@.code == "{cover}")]
//! ```
//!
//! `{object}` is the insured object's index and `{cover}` the cover code.

use serde::{Deserialize, Serialize};

use core_kernel::{CalculatorId, Currency};
use domain_rules::ValidationRule;
use domain_variables::{Path, VariableDefinition};

use crate::computed::ComputedVariable;
use crate::deductible::Deductible;
use crate::error::CalculationError;

fn default_insured_objects_path() -> String {
    "insuredObjects".to_string()
}

fn default_cover_path() -> String {
    r#"insuredObjects[{object}].covers[?(@.code == "{cover}")]"#.to_string()
}

fn default_total_premium_path() -> String {
    "premium".to_string()
}

/// One cover a product offers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverDefinition {
    pub code: String,
    /// Variables read relative to the cover node
    #[serde(default)]
    pub variables: Vec<VariableDefinition>,
    /// Computed in declaration order, after the product-level computations
    #[serde(default)]
    pub computed: Vec<ComputedVariable>,
    /// Variable holding the cover premium
    pub premium_code: String,
    #[serde(default)]
    pub sum_insured_code: Option<String>,
    /// Variable holding the selected deductible id
    #[serde(default)]
    pub deductible_code: Option<String>,
    /// Where the selected deductible id is written, relative to the cover node
    #[serde(default)]
    pub deductible_path: Option<String>,
    #[serde(default)]
    pub deductibles: Vec<Deductible>,
}

impl CoverDefinition {
    pub fn new(code: impl Into<String>, premium_code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            variables: Vec::new(),
            computed: Vec::new(),
            premium_code: premium_code.into(),
            sum_insured_code: None,
            deductible_code: None,
            deductible_path: None,
            deductibles: Vec::new(),
        }
    }
}

/// A versioned product description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVersion {
    pub product_code: String,
    pub version_no: u32,
    pub calculator_id: CalculatorId,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub variables: Vec<VariableDefinition>,
    #[serde(default)]
    pub computed: Vec<ComputedVariable>,
    #[serde(default)]
    pub covers: Vec<CoverDefinition>,
    #[serde(default = "default_insured_objects_path")]
    pub insured_objects_path: String,
    #[serde(default = "default_cover_path")]
    pub cover_path: String,
    #[serde(default = "default_total_premium_path")]
    pub total_premium_path: String,
    /// Checked before calculation, over the product-level variables
    #[serde(default)]
    pub pre_rules: Vec<ValidationRule>,
    /// Checked after calculation, over the product-level variables
    #[serde(default)]
    pub post_rules: Vec<ValidationRule>,
}

impl ProductVersion {
    pub fn new(product_code: impl Into<String>, version_no: u32, calculator_id: CalculatorId) -> Self {
        Self {
            product_code: product_code.into(),
            version_no,
            calculator_id,
            currency: Currency::default(),
            variables: Vec::new(),
            computed: Vec::new(),
            covers: Vec::new(),
            insured_objects_path: default_insured_objects_path(),
            cover_path: default_cover_path(),
            total_premium_path: default_total_premium_path(),
            pre_rules: Vec::new(),
            post_rules: Vec::new(),
        }
    }

    /// Parses a product version from JSON and checks it
    pub fn from_json(json_str: &str) -> Result<Self, CalculationError> {
        let product: ProductVersion =
            serde_json::from_str(json_str).map_err(|e| CalculationError::Parse(e.to_string()))?;
        product.check()?;
        Ok(product)
    }

    pub fn cover(&self, code: &str) -> Option<&CoverDefinition> {
        self.covers.iter().find(|c| c.code == code)
    }

    /// Path of one cover node inside the document
    pub fn cover_path_for(&self, object_index: usize, cover_code: &str) -> Result<Path, CalculationError> {
        let expanded = self
            .cover_path
            .replace("{object}", &object_index.to_string())
            .replace("{cover}", cover_code);
        Path::parse(&expanded).map_err(|e| CalculationError::invalid_path("coverPath", e))
    }

    pub fn insured_objects(&self) -> Result<Path, CalculationError> {
        Path::parse(&self.insured_objects_path)
            .map_err(|e| CalculationError::invalid_path("insuredObjectsPath", e))
    }

    pub fn total_premium(&self) -> Result<Path, CalculationError> {
        Path::parse(&self.total_premium_path)
            .map_err(|e| CalculationError::invalid_path("totalPremiumPath", e))
    }

    /// Checks every path pattern and rule of the product
    ///
    /// Variable paths that fail to parse only leave their variable unset at
    /// calculation time; paths the calculator writes to must be valid.
    pub fn check(&self) -> Result<(), CalculationError> {
        self.insured_objects()?;
        self.total_premium()?;
        for cover in &self.covers {
            self.cover_path_for(0, &cover.code)?;
            if let Some(path) = &cover.deductible_path {
                Path::parse(path).map_err(|e| {
                    CalculationError::invalid_path(format!("deductiblePath of cover {}", cover.code), e)
                })?;
            }
        }

        let outputs = self
            .computed
            .iter()
            .chain(self.covers.iter().flat_map(|c| c.computed.iter()));
        for computed in outputs {
            if computed.definition.has_path() {
                Path::parse(&computed.definition.path).map_err(|e| {
                    CalculationError::invalid_path(format!("computed variable {}", computed.code()), e)
                })?;
            }
        }

        for rule in self.pre_rules.iter().chain(self.post_rules.iter()) {
            rule.check()?;
        }
        Ok(())
    }

    /// Codes of every coefficient table the product reads
    pub fn coefficient_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self
            .computed
            .iter()
            .chain(self.covers.iter().flat_map(|c| c.computed.iter()))
            .filter_map(|c| c.source.coefficient_code())
            .collect();
        codes.sort_unstable();
        codes.dedup();
        codes
    }
}
