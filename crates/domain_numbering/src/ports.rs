//! Number generator ports
//!
//! Generator state is durable configuration owned by the product catalog.
//! The generator reaches it only through [`NumberGeneratorPort`], so the same
//! issuing logic runs against the in-memory store in tests and a database
//! adapter in production.
//!
//! # Atomicity
//!
//! Adapters must implement [`NumberGeneratorPort::compare_and_swap`] as a
//! single atomic step: the write succeeds only if the stored `version` still
//! equals `expected_version`, and otherwise fails with
//! [`PortError::Conflict`]. A database adapter does this with
//! `UPDATE ... WHERE version = $expected`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_numbering::{InMemoryNumberGeneratorStore, NumberGenerator, NumberGeneratorPort};
//! use std::sync::Arc;
//!
//! let port: Arc<dyn NumberGeneratorPort> = Arc::new(InMemoryNumberGeneratorStore::new());
//! let generator = NumberGenerator::new(port, timezone, max_retries);
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError, TenantId};

use crate::state::NumberGeneratorState;

/// Durable store of number generator state
#[async_trait]
pub trait NumberGeneratorPort: DomainPort {
    /// Loads the generator of a product
    async fn load(&self, tenant: TenantId, product_code: &str) -> Result<NumberGeneratorState, PortError>;

    /// Stores `state` if the stored version still equals `expected_version`
    async fn compare_and_swap(
        &self,
        state: &NumberGeneratorState,
        expected_version: u64,
    ) -> Result<(), PortError>;

    /// Creates or replaces a generator unconditionally
    async fn save(&self, state: NumberGeneratorState) -> Result<(), PortError>;
}
