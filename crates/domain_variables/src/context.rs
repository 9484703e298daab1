//! Per-request variable store
//!
//! A [`VariableContext`] maps variable codes to their definitions and keeps a
//! secondary index of resolved typed values. It lives for one calculation or
//! validation request and is never persisted.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use crate::definition::{DataType, VariableDefinition};
use crate::error::VariableError;
use crate::value::TypedValue;

/// Variable definitions plus their resolved values
#[derive(Debug, Clone, Default)]
pub struct VariableContext {
    definitions: BTreeMap<String, VariableDefinition>,
    values: HashMap<String, TypedValue>,
}

impl VariableContext {
    /// Creates an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context holding the given definitions and their declared values
    pub fn with_definitions<I>(definitions: I) -> Self
    where
        I: IntoIterator<Item = VariableDefinition>,
    {
        let mut ctx = Self::new();
        for definition in definitions {
            ctx.insert_definition(definition);
        }
        ctx
    }

    /// Adds or replaces a definition
    ///
    /// The definition's declared value, if any, becomes the current value.
    /// Replacing a definition drops any value resolved under the old one.
    pub fn insert_definition(&mut self, definition: VariableDefinition) {
        let code = definition.code().to_string();
        match TypedValue::parse(definition.data_type, definition.value()) {
            Some(value) => {
                self.values.insert(code.clone(), value);
            }
            None => {
                self.values.remove(&code);
            }
        }
        self.definitions.insert(code, definition);
    }

    /// Stores raw text for a variable, typed per its definition
    ///
    /// Empty or unparsable text leaves the variable unset.
    pub fn set_raw(&mut self, code: &str, raw: &str) -> Result<(), VariableError> {
        let definition = self
            .definitions
            .get(code)
            .ok_or_else(|| VariableError::UnknownVariable(code.to_string()))?;

        if raw.trim().is_empty() {
            self.values.remove(code);
            return Ok(());
        }

        match TypedValue::parse(definition.data_type, raw) {
            Some(value) => {
                self.values.insert(code.to_string(), value);
                Ok(())
            }
            None => {
                let data_type = definition.data_type;
                self.values.remove(code);
                Err(VariableError::Unparsable {
                    code: code.to_string(),
                    raw: raw.to_string(),
                    data_type,
                })
            }
        }
    }

    /// Stores an already typed value
    pub fn set(&mut self, code: &str, value: TypedValue) -> Result<(), VariableError> {
        let declared = self
            .data_type(code)
            .ok_or_else(|| VariableError::UnknownVariable(code.to_string()))?;

        if declared != value.data_type() {
            return Err(VariableError::TypeMismatch {
                code: code.to_string(),
                declared,
                actual: value.data_type(),
            });
        }
        self.values.insert(code.to_string(), value);
        Ok(())
    }

    /// Clears a variable's value, keeping its definition
    pub fn unset(&mut self, code: &str) {
        self.values.remove(code);
    }

    /// Returns the definition for a code
    pub fn definition(&self, code: &str) -> Option<&VariableDefinition> {
        self.definitions.get(code)
    }

    /// Returns the declared type for a code
    pub fn data_type(&self, code: &str) -> Option<DataType> {
        self.definitions.get(code).map(|d| d.data_type)
    }

    /// Returns true if the code has a definition
    pub fn contains(&self, code: &str) -> bool {
        self.definitions.contains_key(code)
    }

    /// Returns the typed value, if set
    pub fn get(&self, code: &str) -> Option<&TypedValue> {
        self.values.get(code)
    }

    /// Returns true if the variable has a value
    pub fn is_set(&self, code: &str) -> bool {
        self.values.contains_key(code)
    }

    /// Canonical text of the value; empty when unset or unknown
    pub fn raw(&self, code: &str) -> String {
        self.values.get(code).map(TypedValue::to_raw).unwrap_or_default()
    }

    pub fn number(&self, code: &str) -> Option<Decimal> {
        self.values.get(code).and_then(TypedValue::as_decimal)
    }

    pub fn text(&self, code: &str) -> Option<&str> {
        match self.values.get(code) {
            Some(TypedValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn date(&self, code: &str) -> Option<NaiveDate> {
        self.values.get(code).and_then(TypedValue::as_date)
    }

    pub fn time(&self, code: &str) -> Option<NaiveTime> {
        match self.values.get(code) {
            Some(TypedValue::Time(t)) => Some(*t),
            _ => None,
        }
    }

    /// Iterates over all defined codes in sorted order
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    /// Iterates over all definitions in code order
    pub fn definitions(&self) -> impl Iterator<Item = &VariableDefinition> {
        self.definitions.values()
    }

    /// Raw text of every set variable, keyed by code
    pub fn known_values(&self) -> HashMap<String, String> {
        self.values
            .iter()
            .map(|(code, value)| (code.clone(), value.to_raw()))
            .collect()
    }

    /// A snapshot of the definitions with their current values filled in
    pub fn snapshot(&self) -> Vec<VariableDefinition> {
        self.definitions
            .values()
            .map(|d| d.clone().with_value(self.raw(d.code())))
            .collect()
    }

    /// Number of defined variables
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// A copy of this context used as a nested scope
    ///
    /// Changes made in the child never reach the parent.
    pub fn child(&self) -> Self {
        self.clone()
    }
}
