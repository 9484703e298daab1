//! Engine errors

use thiserror::Error;

use domain_calculation::CalculationError;
use domain_coefficient::CoefficientError;
use domain_numbering::NumberingError;
use domain_rules::RuleError;

/// Errors surfaced by the engine facade
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Calculation(#[from] CalculationError),

    #[error(transparent)]
    Coefficient(#[from] CoefficientError),

    #[error(transparent)]
    Numbering(#[from] NumberingError),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid setting {name}: '{value}'")]
    InvalidSetting { name: String, value: String },
}

impl EngineError {
    pub fn invalid_setting(name: impl Into<String>, value: impl Into<String>) -> Self {
        EngineError::InvalidSetting {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns true for concurrency conflicts the caller should retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Numbering(e) if e.is_retryable())
    }
}
