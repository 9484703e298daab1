//! Rule configuration errors
//!
//! Evaluating a rule never fails. These errors are raised when rules are
//! loaded from product configuration.

use thiserror::Error;

use crate::operator::Operator;

/// Errors in a rule set definition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    /// Operator spelling not recognised
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    /// A binary operator has neither a right key nor a right literal
    #[error("Rule on {left_key} with operator {operator} has no right operand")]
    MissingOperand { left_key: String, operator: Operator },

    /// A binary operator has both a right key and a right literal
    #[error("Rule on {left_key} has both a right key and a right literal")]
    ConflictingOperands { left_key: String },

    /// A literal pattern for MATCHES_REGEX does not compile
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A literal range for RANGE is not `min-max`
    #[error("Invalid range '{0}', expected min-max")]
    InvalidRange(String),

    /// The rule set document is not valid JSON for rules
    #[error("Invalid rule set: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for RuleError {
    fn from(err: serde_json::Error) -> Self {
        // Unknown operators surface through serde as a custom message
        RuleError::Malformed(err.to_string())
    }
}
