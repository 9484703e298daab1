//! Calculation errors
//!
//! [`CalculationError`] covers setup defects that stop a calculation.
//! [`ComputeFailure`] describes why a single computed variable stayed unset;
//! it is reported, never raised.

use thiserror::Error;

use core_kernel::TemporalError;
use domain_coefficient::CoefficientTableId;
use domain_rules::RuleError;
use domain_variables::PathError;

/// Configuration errors that abort a calculation
#[derive(Debug, Error)]
pub enum CalculationError {
    /// No product version registered for the key
    #[error("Product not found: {product_code} version {}", version_no.map(|v| v.to_string()).unwrap_or_else(|| "latest".to_string()))]
    ProductNotFound {
        product_code: String,
        version_no: Option<u32>,
    },

    /// A path in the product definition does not parse
    #[error("Invalid path in {location}: {source}")]
    InvalidPath {
        location: String,
        #[source]
        source: PathError,
    },

    /// A computed variable refers to a coefficient table that does not exist
    #[error("Coefficient table not found: {0}")]
    MissingCoefficientTable(CoefficientTableId),

    /// A pre or post rule is malformed
    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),

    /// A product definition could not be read
    #[error("Invalid product definition: {0}")]
    Parse(String),
}

impl CalculationError {
    pub fn product_not_found(product_code: impl Into<String>, version_no: Option<u32>) -> Self {
        Self::ProductNotFound {
            product_code: product_code.into(),
            version_no,
        }
    }

    pub fn invalid_path(location: impl Into<String>, source: PathError) -> Self {
        Self::InvalidPath {
            location: location.into(),
            source,
        }
    }
}

/// Why a computed variable could not be produced
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComputeFailure {
    /// An input variable is unset or has the wrong type
    #[error("Operand {0} is not set")]
    MissingOperand(String),

    /// The operation has no operands at all
    #[error("No operands")]
    NoOperands,

    /// No row of the coefficient table matched the known values
    #[error("No row of coefficient table {0} matched")]
    NoCoefficientRow(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow")]
    Overflow,

    /// The computed text cannot be read as the variable's type
    #[error("Result '{0}' does not fit the variable type")]
    Unparsable(String),

    #[error(transparent)]
    Temporal(#[from] TemporalError),
}
