//! Adapters for the number generator port
//!
//! - **InMemoryNumberGeneratorStore**: process-local store for tests and
//!   single-node deployments

pub mod in_memory;

pub use in_memory::InMemoryNumberGeneratorStore;
