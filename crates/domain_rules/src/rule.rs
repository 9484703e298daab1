//! Validation rule definitions

use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::DecimalRange;

use crate::error::RuleError;
use crate::formats::full_match;
use crate::operator::Operator;

/// The right-hand side of a binary rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOperand<'a> {
    /// Another variable, by code
    Variable(&'a str),
    /// Literal text, read per the left variable's type
    Literal(&'a str),
}

/// A binary comparison or unary check over policy variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    pub left_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_literal: Option<String>,
    pub operator: Operator,
    /// Text shown to the user when the rule is not satisfied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationRule {
    /// Compares a variable against literal text
    pub fn literal(left_key: impl Into<String>, operator: Operator, literal: impl Into<String>) -> Self {
        Self {
            left_key: left_key.into(),
            right_key: None,
            right_literal: Some(literal.into()),
            operator,
            message: None,
        }
    }

    /// Compares two variables
    pub fn variables(left_key: impl Into<String>, operator: Operator, right_key: impl Into<String>) -> Self {
        Self {
            left_key: left_key.into(),
            right_key: Some(right_key.into()),
            right_literal: None,
            operator,
            message: None,
        }
    }

    /// A rule without a right operand: `NOT_NULL` or a format check
    pub fn unary(left_key: impl Into<String>, operator: Operator) -> Self {
        Self {
            left_key: left_key.into(),
            right_key: None,
            right_literal: None,
            operator,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns the right operand when exactly one of key and literal is set
    pub fn right_operand(&self) -> Option<RuleOperand<'_>> {
        match (&self.right_key, &self.right_literal) {
            (Some(key), None) => Some(RuleOperand::Variable(key)),
            (None, Some(literal)) => Some(RuleOperand::Literal(literal)),
            _ => None,
        }
    }

    /// Checks the rule's shape at load time
    ///
    /// Literal patterns and ranges are checked here as well, so a typo in
    /// product configuration is caught before any policy is validated.
    pub fn check(&self) -> Result<(), RuleError> {
        if self.operator.is_unary() {
            return Ok(());
        }

        let operand = match (&self.right_key, &self.right_literal) {
            (Some(_), Some(_)) => {
                return Err(RuleError::ConflictingOperands {
                    left_key: self.left_key.clone(),
                })
            }
            (None, None) => {
                return Err(RuleError::MissingOperand {
                    left_key: self.left_key.clone(),
                    operator: self.operator,
                })
            }
            _ => self.right_operand(),
        };

        if let Some(RuleOperand::Literal(literal)) = operand {
            match self.operator {
                Operator::MatchesRegex => {
                    full_match(literal).map_err(|err| RuleError::InvalidPattern {
                        pattern: literal.to_string(),
                        message: err.to_string(),
                    })?;
                }
                Operator::Range if DecimalRange::parse(literal).is_none() => {
                    return Err(RuleError::InvalidRange(literal.to_string()));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.left_key, self.operator)?;
        match self.right_operand() {
            Some(RuleOperand::Variable(code)) => write!(f, " {}", code),
            Some(RuleOperand::Literal(text)) => write!(f, " '{}'", text),
            None => Ok(()),
        }
    }
}

/// Parses and checks a JSON array of rules
pub fn parse_rules(json: &str) -> Result<Vec<ValidationRule>, RuleError> {
    let rules: Vec<ValidationRule> = serde_json::from_str(json)?;
    for rule in &rules {
        rule.check()?;
    }
    Ok(rules)
}
