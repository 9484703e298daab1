//! Rule operators
//!
//! Operators are written in product configuration either symbolically
//! (`">="`) or by name (`"GREATER_OR_EQUALS"`). Which operators apply depends
//! on the declared type of the rule's left variable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use domain_variables::DataType;

use crate::error::RuleError;

/// Comparison or check applied by a validation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Operator {
    NotNull,
    Equals,
    NotEquals,
    Greater,
    Less,
    GreaterOrEquals,
    LessOrEquals,
    Range,
    MatchesRegex,
    InList,
    Email,
    Phone,
    PhoneRu,
    PhoneInternational,
    Inn,
    Snils,
    Passport,
}

impl Operator {
    /// Canonical configuration name
    pub fn name(&self) -> &'static str {
        match self {
            Operator::NotNull => "NOT_NULL",
            Operator::Equals => "EQUALS",
            Operator::NotEquals => "NOT_EQUALS",
            Operator::Greater => "GREATER",
            Operator::Less => "LESS",
            Operator::GreaterOrEquals => "GREATER_OR_EQUALS",
            Operator::LessOrEquals => "LESS_OR_EQUALS",
            Operator::Range => "RANGE",
            Operator::MatchesRegex => "MATCHES_REGEX",
            Operator::InList => "IN_LIST",
            Operator::Email => "EMAIL",
            Operator::Phone => "PHONE",
            Operator::PhoneRu => "PHONE_RU",
            Operator::PhoneInternational => "PHONE_INTERNATIONAL",
            Operator::Inn => "INN",
            Operator::Snils => "SNILS",
            Operator::Passport => "PASSPORT",
        }
    }

    /// Symbolic spelling for comparison operators
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            Operator::Equals => Some("="),
            Operator::NotEquals => Some("!="),
            Operator::Greater => Some(">"),
            Operator::Less => Some("<"),
            Operator::GreaterOrEquals => Some(">="),
            Operator::LessOrEquals => Some("<="),
            _ => None,
        }
    }

    /// Operators that take no right operand
    pub fn is_unary(&self) -> bool {
        matches!(self, Operator::NotNull) || self.is_format()
    }

    /// Built-in format validators
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            Operator::Email
                | Operator::Phone
                | Operator::PhoneRu
                | Operator::PhoneInternational
                | Operator::Inn
                | Operator::Snils
                | Operator::Passport
        )
    }

    /// Returns true if the operator belongs to the operator table for `data_type`
    pub fn applies_to(&self, data_type: DataType) -> bool {
        match data_type {
            DataType::String => matches!(
                self,
                Operator::NotNull
                    | Operator::Equals
                    | Operator::NotEquals
                    | Operator::MatchesRegex
                    | Operator::InList
            ) || self.is_format(),
            DataType::Number => matches!(
                self,
                Operator::NotNull
                    | Operator::Equals
                    | Operator::NotEquals
                    | Operator::Greater
                    | Operator::Less
                    | Operator::GreaterOrEquals
                    | Operator::LessOrEquals
                    | Operator::Range
            ),
            DataType::Date | DataType::Time => {
                matches!(self, Operator::NotNull) || self.symbol().is_some()
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol().unwrap_or(self.name()))
    }
}

impl FromStr for Operator {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let operator = match s.trim().to_ascii_uppercase().as_str() {
            "NOT_NULL" | "NOTNULL" | "REQUIRED" => Operator::NotNull,
            "=" | "==" | "EQ" | "EQUALS" => Operator::Equals,
            "!=" | "<>" | "NE" | "NOT_EQUALS" => Operator::NotEquals,
            ">" | "GT" | "GREATER" => Operator::Greater,
            "<" | "LT" | "LESS" => Operator::Less,
            ">=" | "GE" | "GREATER_OR_EQUALS" => Operator::GreaterOrEquals,
            "<=" | "LE" | "LESS_OR_EQUALS" => Operator::LessOrEquals,
            "RANGE" | "BETWEEN" => Operator::Range,
            "MATCHES_REGEX" | "REGEX" => Operator::MatchesRegex,
            "IN_LIST" | "IN" => Operator::InList,
            "EMAIL" => Operator::Email,
            "PHONE" => Operator::Phone,
            "PHONE_RU" => Operator::PhoneRu,
            "PHONE_INTERNATIONAL" => Operator::PhoneInternational,
            "INN" => Operator::Inn,
            "SNILS" => Operator::Snils,
            "PASSPORT" => Operator::Passport,
            _ => return Err(RuleError::UnknownOperator(s.to_string())),
        };
        Ok(operator)
    }
}

impl TryFrom<String> for Operator {
    type Error = RuleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Operator> for String {
    fn from(operator: Operator) -> Self {
        operator.name().to_string()
    }
}
