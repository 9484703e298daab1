//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! engine test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built products, coefficient tables, rules and generators
//! - `builders`: Builder for policy documents
//! - `assertions`: Custom assertion helpers for rule results and reports
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
