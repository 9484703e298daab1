//! Variable definitions
//!
//! A definition is the product catalog's description of one variable: its
//! code, where it lives in the policy document, and how its text is typed.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared type of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    /// Exact decimal
    Number,
    /// Free text
    String,
    /// Calendar date
    Date,
    /// Time of day
    Time,
}

impl DataType {
    /// Returns the catalog spelling of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Number => "NUMBER",
            DataType::String => "STRING",
            DataType::Date => "DATE",
            DataType::Time => "TIME",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NUMBER" | "DECIMAL" => Ok(DataType::Number),
            "STRING" | "TEXT" => Ok(DataType::String),
            "DATE" => Ok(DataType::Date),
            "TIME" => Ok(DataType::Time),
            other => Err(format!("unknown data type: {}", other)),
        }
    }
}

/// Definition of a single product variable
///
/// The `code` is fixed at construction; rules and coefficient columns refer
/// to variables by code, so it has no setter. `value` is the declared default
/// and reads as an empty string when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDefinition {
    code: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Locator of the value inside the policy document; empty for constants
    #[serde(default)]
    pub path: String,
    /// Declared type
    pub data_type: DataType,
    #[serde(default, deserialize_with = "null_as_empty")]
    value: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl VariableDefinition {
    /// Creates a definition without a default value
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            path: path.into(),
            data_type,
            value: String::new(),
        }
    }

    /// Creates a constant: a definition with no path and a fixed value
    pub fn constant(code: impl Into<String>, data_type: DataType, value: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            name: code.clone(),
            code,
            path: String::new(),
            data_type,
            value: value.into(),
        }
    }

    /// Sets the declared default value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Returns the variable code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the declared value, empty if none
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns true if the definition reads from the document
    pub fn has_path(&self) -> bool {
        !self.path.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_catalog_definition() {
        let json = r#"{"code":"sumInsured","name":"Sum insured","path":"covers[0].sumInsured","dataType":"NUMBER"}"#;
        let definition: VariableDefinition = serde_json::from_str(json).unwrap();

        assert_eq!(definition.code(), "sumInsured");
        assert_eq!(definition.data_type, DataType::Number);
        assert_eq!(definition.value(), "");
        assert!(definition.has_path());
    }

    #[test]
    fn test_value_reads_empty_when_null() {
        let json = r#"{"code":"x","dataType":"STRING","value":null}"#;
        let definition: VariableDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(definition.value(), "");
        assert!(!definition.has_path());
    }

    #[test]
    fn test_data_type_parse() {
        assert_eq!("number".parse::<DataType>().unwrap(), DataType::Number);
        assert!("BLOB".parse::<DataType>().is_err());
    }
}
