//! Typed Variable Store and Path Resolver
//!
//! This crate turns an arbitrary nested policy document into typed variables
//! and writes computed values back into it.
//!
//! # Overview
//!
//! - **Definitions**: the product catalog declares each variable's code,
//!   document path and [`DataType`]
//! - **Context**: [`VariableContext`] holds definitions and typed values for
//!   one request
//! - **Paths**: a JSONPath-like locator with array indices and a predicate
//!   selector for picking a cover out of a list by its code
//!
//! # Example
//!
//! ```rust
//! use domain_variables::{resolve, DataType, VariableDefinition};
//! use serde_json::json;
//!
//! let document = json!({ "covers": [ { "code": "FIRE", "sumInsured": 150000 } ] });
//! let definitions = vec![VariableDefinition::new(
//!     "fireSum",
//!     "Fire sum insured",
//!     "covers[?(@.code == 'FIRE')].sumInsured",
//!     DataType::Number,
//! )];
//!
//! let ctx = resolve(&document, &definitions);
//! assert_eq!(ctx.raw("fireSum"), "150000");
//! ```

pub mod context;
pub mod definition;
pub mod error;
pub mod path;
pub mod resolver;
pub mod value;

pub use context::VariableContext;
pub use definition::{DataType, VariableDefinition};
pub use error::{PathError, VariableError};
pub use path::{Path, Segment, Predicate, PredicateOp, Literal};
pub use resolver::{resolve, resolve_into, read_raw, write, write_at};
pub use value::{TypedValue, parse_decimal};
