//! Number generator errors

use thiserror::Error;

use core_kernel::PortError;

/// Errors raised while issuing a number
#[derive(Debug, Error)]
pub enum NumberingError {
    /// The mask has an unclosed or empty placeholder
    #[error("Malformed mask '{mask}': {reason}")]
    MalformedMask { mask: String, reason: String },

    /// No generator is configured for the product
    #[error("Number generator not found for product {product_code}")]
    NotFound { product_code: String },

    /// Every compare-and-swap attempt lost to a concurrent issuer
    #[error("Concurrency conflict on {product_code} after {attempts} attempts")]
    Conflict { product_code: String, attempts: u32 },

    #[error("Store error: {0}")]
    Port(#[from] PortError),
}

impl NumberingError {
    pub fn malformed_mask(mask: impl Into<String>, reason: impl Into<String>) -> Self {
        NumberingError::MalformedMask {
            mask: mask.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the caller may retry the whole issuance
    pub fn is_retryable(&self) -> bool {
        match self {
            NumberingError::Conflict { .. } => true,
            NumberingError::Port(e) => e.is_transient(),
            _ => false,
        }
    }
}
