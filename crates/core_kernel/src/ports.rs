//! Ports for durable engine state
//!
//! The engine is pure computation except for the product catalog's durable
//! configuration (number generator counters, coefficient tables). Domains that
//! touch that state define a port trait extending [`DomainPort`] and report
//! failures with [`PortError`], so an in-memory adapter and a database adapter
//! are interchangeable.
//!
//! ```rust,ignore
//! #[async_trait]
//! pub trait NumberGeneratorPort: DomainPort {
//!     async fn load(&self, tenant: TenantId, product_code: &str)
//!         -> Result<NumberGeneratorState, PortError>;
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Error type for port operations
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// An optimistic write lost against a concurrent writer
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Connection to the underlying store failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. } | PortError::Conflict { .. }
        )
    }

    /// Returns true if a compare-and-swap lost the race
    pub fn is_conflict(&self) -> bool {
        matches!(self, PortError::Conflict { .. })
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// Ports are shared across tasks, so implementations must be thread-safe.
pub trait DomainPort: Send + Sync + 'static {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_not_found() {
        let error = PortError::not_found("NumberGenerator", "OSAGO");
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert!(error.to_string().contains("OSAGO"));
    }

    #[test]
    fn test_conflict_is_transient() {
        let error = PortError::conflict("version 3 already advanced");
        assert!(error.is_conflict());
        assert!(error.is_transient());
    }

    #[test]
    fn test_internal_is_not_transient() {
        assert!(PortError::connection("store unreachable").is_transient());
        assert!(!PortError::internal("corrupt state").is_transient());
    }
}
