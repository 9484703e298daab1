//! Rule Evaluator
//!
//! Validates a policy's variables against the binary comparison rules a
//! product declares. Rules are plain data loaded with the product; every rule
//! is evaluated and reported, so a quote screen can show all problems at once.
//!
//! ```rust
//! use domain_rules::{Operator, ValidationRule, Validator};
//! use domain_variables::{DataType, VariableContext, VariableDefinition};
//!
//! let ctx = VariableContext::with_definitions(vec![
//!     VariableDefinition::constant("age", DataType::Number, "30"),
//! ]);
//! let rule = ValidationRule::literal("age", Operator::GreaterOrEquals, "18");
//! assert!(Validator::evaluate(&ctx, &rule));
//! ```

pub mod error;
pub mod formats;
pub mod operator;
pub mod rule;
pub mod validator;

pub use error::RuleError;
pub use operator::Operator;
pub use rule::{parse_rules, RuleOperand, ValidationRule};
pub use validator::{all_satisfied, failure_messages, RuleResult, Validator};
