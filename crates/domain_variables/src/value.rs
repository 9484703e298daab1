//! Typed variable values
//!
//! Text read from a policy document is normalised into a [`TypedValue`]
//! according to the variable's declared [`DataType`]. Numbers are exact
//! decimals; an `f64` never holds a premium or a sum insured.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use core_kernel::temporal::{parse_date, parse_time};

use crate::definition::DataType;

/// A resolved variable value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    Number(Decimal),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
}

impl TypedValue {
    /// Reads raw text as the given type
    ///
    /// Returns `None` for empty text and for text that is not a valid value
    /// of the type. Numbers accept a comma decimal separator and spaces as
    /// thousands separators (`"150 000,50"`).
    pub fn parse(data_type: DataType, raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        match data_type {
            DataType::Number => parse_decimal(trimmed).map(TypedValue::Number),
            DataType::String => Some(TypedValue::Text(raw.to_string())),
            DataType::Date => parse_date(trimmed).ok().map(TypedValue::Date),
            DataType::Time => parse_time(trimmed).ok().map(TypedValue::Time),
        }
    }

    /// Reads a JSON scalar as the given type
    ///
    /// Objects, arrays and null are not values.
    pub fn from_json(data_type: DataType, node: &Value) -> Option<Self> {
        match node {
            Value::String(s) => Self::parse(data_type, s),
            Value::Number(n) => Self::parse(data_type, &n.to_string()),
            Value::Bool(b) => Self::parse(data_type, if *b { "true" } else { "false" }),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Returns the type this value belongs to
    pub fn data_type(&self) -> DataType {
        match self {
            TypedValue::Number(_) => DataType::Number,
            TypedValue::Text(_) => DataType::String,
            TypedValue::Date(_) => DataType::Date,
            TypedValue::Time(_) => DataType::Time,
        }
    }

    /// Returns the decimal for numbers
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            TypedValue::Number(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the date for dates
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            TypedValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Canonical text form, the inverse of [`TypedValue::parse`]
    pub fn to_raw(&self) -> String {
        match self {
            TypedValue::Number(d) => d.normalize().to_string(),
            TypedValue::Text(s) => s.clone(),
            TypedValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            TypedValue::Time(t) => t.format("%H:%M:%S").to_string(),
        }
    }

    /// JSON form written back into a policy document
    ///
    /// Numbers become JSON numbers only when the JSON number reads back as the
    /// same decimal; otherwise they are written as text so no digits are lost.
    pub fn to_json(&self) -> Value {
        match self {
            TypedValue::Number(d) => {
                let raw = d.normalize().to_string();
                match serde_json::from_str::<serde_json::Number>(&raw) {
                    Ok(number) if parse_decimal(&number.to_string()) == Some(d.normalize()) => {
                        Value::Number(number)
                    }
                    _ => Value::String(raw),
                }
            }
            other => Value::String(other.to_raw()),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_raw())
    }
}

/// Parses a decimal as written in policy documents
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
        .map(|d| d.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parse_number_with_separators() {
        assert_eq!(
            TypedValue::parse(DataType::Number, "150 000,50"),
            Some(TypedValue::Number(dec!(150000.5)))
        );
        assert_eq!(TypedValue::parse(DataType::Number, "abc"), None);
        assert_eq!(TypedValue::parse(DataType::Number, "  "), None);
    }

    #[test]
    fn test_from_json_number_is_exact() {
        let value = TypedValue::from_json(DataType::Number, &json!(0.1)).unwrap();
        assert_eq!(value.as_decimal(), Some(dec!(0.1)));
    }

    #[test]
    fn test_from_json_rejects_containers() {
        assert_eq!(TypedValue::from_json(DataType::String, &json!({"a": 1})), None);
        assert_eq!(TypedValue::from_json(DataType::String, &Value::Null), None);
    }

    #[test]
    fn test_to_json_keeps_long_decimals_as_text() {
        let long = TypedValue::Number(dec!(1234567890.12345678901234));
        assert_eq!(long.to_json(), json!("1234567890.12345678901234"));

        let short = TypedValue::Number(dec!(1200.50));
        assert_eq!(short.to_json(), json!(1200.5));
    }

    #[test]
    fn test_date_normalised() {
        let value = TypedValue::parse(DataType::Date, "01.03.2024").unwrap();
        assert_eq!(value.to_raw(), "2024-03-01");
    }
}
