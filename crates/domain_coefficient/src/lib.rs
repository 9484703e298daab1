//! Coefficient Resolver
//!
//! Tenant and calculator scoped lookup tables used by the calculation engine
//! for tariff factors: region coefficients, age bands, sum insured ranges.
//!
//! - [`CoefficientTable`] - ordered rows with EXACT and RANGE columns
//! - [`CoefficientCatalog`] - the registry, with lookup, diagnostic query
//!   rendering and table copying

pub mod catalog;
pub mod error;
pub mod table;

pub use catalog::CoefficientCatalog;
pub use error::CoefficientError;
pub use table::{CoefficientColumn, CoefficientRow, CoefficientTable, CoefficientTableId, MatchMode};
