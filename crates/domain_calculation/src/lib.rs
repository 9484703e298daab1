//! Calculation Engine
//!
//! Turns a policy document and a product version into premiums, sums
//! insured and deductible choices per cover, plus the policy total.
//!
//! # Overview
//!
//! - [`ProductVersion`] / [`CoverDefinition`] - the declarative product
//! - [`ComputedVariable`] / [`ValueSource`] - how each output is produced
//! - [`Calculator`] - runs a product over a document
//! - [`CalculationReport`] - the enriched document and everything left unresolved
//! - [`ProductCatalog`] - registered product versions per tenant

pub mod calculator;
pub mod catalog;
pub mod computed;
pub mod deductible;
pub mod error;
pub mod magic;
pub mod product;
pub mod report;

pub use calculator::{Calculator, TOTAL_PREMIUM};
pub use catalog::ProductCatalog;
pub use computed::{ArithmeticOp, CoefficientScope, ComputedVariable, Operand, ValueSource};
pub use deductible::{default_deductible, sort_deductibles, Deductible};
pub use error::{CalculationError, ComputeFailure};
pub use magic::MagicValue;
pub use product::{CoverDefinition, ProductVersion};
pub use report::{CalculationReport, CalculationState, CoverResult, Unresolved};
