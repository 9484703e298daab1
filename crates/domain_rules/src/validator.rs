//! Rule evaluation over a variable context
//!
//! # Evaluation
//!
//! The left variable's declared type picks the operator table:
//!
//! - STRING: `NOT_NULL`, `=`, `!=`, `MATCHES_REGEX`, `IN_LIST` and the format checks
//! - NUMBER: `NOT_NULL`, `=`, `!=`, `>`, `<`, `>=`, `<=`, `RANGE`
//! - DATE and TIME: `NOT_NULL` and the six comparisons, chronologically
//!
//! A rule whose left variable is unknown, whose right variable has another
//! type, whose literal cannot be read, or whose operator is outside the table
//! is not satisfied. Evaluation never fails.

use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

use core_kernel::DecimalRange;
use domain_variables::{parse_decimal, DataType, TypedValue, VariableContext};

use crate::formats::{check_format, full_match};
use crate::operator::Operator;
use crate::rule::{RuleOperand, ValidationRule};

/// Outcome of one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResult {
    pub rule: ValidationRule,
    pub satisfied: bool,
    /// Set for unsatisfied rules: the rule's message, or a description of the rule
    pub message: Option<String>,
}

/// Returns true if every result is satisfied
pub fn all_satisfied(results: &[RuleResult]) -> bool {
    results.iter().all(|r| r.satisfied)
}

/// Messages of the unsatisfied results, in rule order
pub fn failure_messages(results: &[RuleResult]) -> Vec<String> {
    results
        .iter()
        .filter(|r| !r.satisfied)
        .filter_map(|r| r.message.clone())
        .collect()
}

/// Evaluates validation rules against a variable context
pub struct Validator;

impl Validator {
    /// Evaluates every rule, without stopping at the first failure
    pub fn validate(ctx: &VariableContext, rules: &[ValidationRule]) -> Vec<RuleResult> {
        rules
            .iter()
            .map(|rule| {
                let satisfied = Self::evaluate(ctx, rule);
                let message = if satisfied {
                    None
                } else {
                    Some(rule.message.clone().unwrap_or_else(|| format!("Rule failed: {}", rule)))
                };
                RuleResult {
                    rule: rule.clone(),
                    satisfied,
                    message,
                }
            })
            .collect()
    }

    /// Evaluates one rule
    pub fn evaluate(ctx: &VariableContext, rule: &ValidationRule) -> bool {
        let Some(left_type) = ctx.data_type(&rule.left_key) else {
            debug!(left_key = %rule.left_key, "Rule references unknown variable");
            return false;
        };

        if !rule.operator.applies_to(left_type) {
            debug!(
                left_key = %rule.left_key,
                operator = %rule.operator,
                data_type = %left_type,
                "Operator does not apply to variable type"
            );
            return false;
        }

        if rule.operator == Operator::NotNull {
            return ctx.is_set(&rule.left_key);
        }

        match left_type {
            DataType::String => Self::evaluate_text(ctx, rule),
            DataType::Number => Self::evaluate_number(ctx, rule),
            DataType::Date | DataType::Time => Self::evaluate_temporal(ctx, rule, left_type),
        }
    }

    fn evaluate_text(ctx: &VariableContext, rule: &ValidationRule) -> bool {
        let left = ctx.raw(&rule.left_key);

        if rule.operator.is_format() {
            return check_format(rule.operator, &left);
        }

        let right = match rule.right_operand() {
            Some(RuleOperand::Literal(text)) => text.to_string(),
            Some(RuleOperand::Variable(code)) => match ctx.data_type(code) {
                Some(DataType::String) => ctx.raw(code),
                _ => return false,
            },
            None => return false,
        };

        match rule.operator {
            Operator::Equals => left == right,
            Operator::NotEquals => left != right,
            Operator::MatchesRegex => match full_match(&right) {
                Ok(re) => re.is_match(&left),
                Err(err) => {
                    debug!(pattern = %right, error = %err, "Invalid rule pattern");
                    false
                }
            },
            // Optional field: an empty value passes
            Operator::InList => {
                let value = left.trim();
                value.is_empty() || right.split(',').any(|item| item.trim() == value)
            }
            _ => false,
        }
    }

    fn evaluate_number(ctx: &VariableContext, rule: &ValidationRule) -> bool {
        let Some(left) = ctx.number(&rule.left_key) else {
            return false;
        };

        if rule.operator == Operator::Range {
            let range_text = match rule.right_operand() {
                Some(RuleOperand::Literal(text)) => text.to_string(),
                // A range held in another variable must be declared numeric like the left side
                Some(RuleOperand::Variable(code)) if ctx.data_type(code) == Some(DataType::Number) => ctx.raw(code),
                _ => return false,
            };
            return DecimalRange::parse(&range_text).is_some_and(|range| range.contains(left));
        }

        let right: Option<Decimal> = match rule.right_operand() {
            Some(RuleOperand::Literal(text)) => parse_decimal(text),
            Some(RuleOperand::Variable(code)) if ctx.data_type(code) == Some(DataType::Number) => {
                ctx.number(code)
            }
            _ => None,
        };

        match right {
            Some(right) => compare(rule.operator, left.cmp(&right)),
            None => false,
        }
    }

    fn evaluate_temporal(ctx: &VariableContext, rule: &ValidationRule, data_type: DataType) -> bool {
        let Some(left) = ctx.get(&rule.left_key) else {
            return false;
        };

        let right = match rule.right_operand() {
            Some(RuleOperand::Literal(text)) => TypedValue::parse(data_type, text),
            Some(RuleOperand::Variable(code)) if ctx.data_type(code) == Some(data_type) => {
                ctx.get(code).cloned()
            }
            _ => None,
        };

        let ordering = match (left, right) {
            (TypedValue::Date(l), Some(TypedValue::Date(r))) => l.cmp(&r),
            (TypedValue::Time(l), Some(TypedValue::Time(r))) => l.cmp(&r),
            _ => return false,
        };
        compare(rule.operator, ordering)
    }
}

fn compare(operator: Operator, ordering: Ordering) -> bool {
    match operator {
        Operator::Equals => ordering == Ordering::Equal,
        Operator::NotEquals => ordering != Ordering::Equal,
        Operator::Greater => ordering == Ordering::Greater,
        Operator::Less => ordering == Ordering::Less,
        Operator::GreaterOrEquals => ordering != Ordering::Less,
        Operator::LessOrEquals => ordering != Ordering::Greater,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_variables::VariableDefinition;

    fn ctx() -> VariableContext {
        VariableContext::with_definitions(vec![
            VariableDefinition::constant("age", DataType::Number, "30"),
            VariableDefinition::constant("minAge", DataType::Number, "18"),
            VariableDefinition::constant("region", DataType::String, "MSK"),
            VariableDefinition::constant("startDate", DataType::Date, "2024-03-01"),
        ])
    }

    #[test]
    fn test_numeric_comparison_with_variable() {
        let rule = ValidationRule::variables("age", Operator::GreaterOrEquals, "minAge");
        assert!(Validator::evaluate(&ctx(), &rule));
    }

    #[test]
    fn test_right_variable_of_other_type_fails() {
        let rule = ValidationRule::variables("age", Operator::Equals, "region");
        assert!(!Validator::evaluate(&ctx(), &rule));
    }

    #[test]
    fn test_operator_outside_type_table_fails() {
        let rule = ValidationRule::literal("region", Operator::Greater, "AAA");
        assert!(!Validator::evaluate(&ctx(), &rule));
    }

    #[test]
    fn test_unparsable_literal_fails() {
        let rule = ValidationRule::literal("age", Operator::Less, "forty");
        assert!(!Validator::evaluate(&ctx(), &rule));
        let rule = ValidationRule::literal("age", Operator::NotEquals, "forty");
        assert!(!Validator::evaluate(&ctx(), &rule));
    }

    #[test]
    fn test_dates_compare_chronologically() {
        let rule = ValidationRule::literal("startDate", Operator::Greater, "28.02.2024");
        assert!(Validator::evaluate(&ctx(), &rule));
    }

    #[test]
    fn test_violated_operand_shape_is_unsatisfied() {
        let mut rule = ValidationRule::literal("age", Operator::Equals, "30");
        rule.right_key = Some("minAge".to_string());
        assert!(!Validator::evaluate(&ctx(), &rule));
    }
}
