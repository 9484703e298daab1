//! Coefficient tables
//!
//! A table maps combinations of variable values to a pricing factor or text.
//! Rows are kept in stored order and the first row matching every column
//! wins, so a product can end a table with a deliberately broad fallback row.
//!
//! Column matching is explicit:
//!
//! - `EXACT` compares the known raw value with the cell text, character for
//!   character. `"*"` is a literal asterisk, not a wildcard.
//! - `RANGE` cells hold `"min-max"` and contain the known decimal when it
//!   lies within both bounds.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use core_kernel::{CalculatorId, DecimalRange, TenantId};
use domain_variables::parse_decimal;

use crate::error::CoefficientError;

/// Identifies a table within a tenant's calculator
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoefficientTableId {
    pub tenant: TenantId,
    pub calculator: CalculatorId,
    pub code: String,
}

impl CoefficientTableId {
    pub fn new(tenant: TenantId, calculator: CalculatorId, code: impl Into<String>) -> Self {
        Self {
            tenant,
            calculator,
            code: code.into(),
        }
    }
}

impl fmt::Display for CoefficientTableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.tenant, self.calculator, self.code)
    }
}

/// How a column's cells are compared with a known value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchMode {
    #[default]
    Exact,
    Range,
}

/// A matching column: the table column and the variable feeding it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoefficientColumn {
    pub name: String,
    pub variable_code: String,
    #[serde(default)]
    pub match_mode: MatchMode,
}

impl CoefficientColumn {
    pub fn exact(name: impl Into<String>, variable_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variable_code: variable_code.into(),
            match_mode: MatchMode::Exact,
        }
    }

    pub fn range(name: impl Into<String>, variable_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variable_code: variable_code.into(),
            match_mode: MatchMode::Range,
        }
    }

    /// Returns true if the cell accepts the known raw value
    pub fn accepts(&self, cell: &str, known: &str) -> bool {
        match self.match_mode {
            MatchMode::Exact => cell == known,
            MatchMode::Range => match (DecimalRange::parse(cell), parse_decimal(known)) {
                (Some(range), Some(value)) => range.contains(value),
                _ => false,
            },
        }
    }
}

/// One row: a cell per column plus the result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoefficientRow {
    pub values: Vec<String>,
    pub result: String,
}

/// An ordered coefficient table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoefficientTable {
    #[serde(flatten)]
    pub id: CoefficientTableId,
    pub columns: Vec<CoefficientColumn>,
    #[serde(default)]
    rows: Vec<CoefficientRow>,
}

impl CoefficientTable {
    /// Creates an empty table, rejecting duplicate column names
    pub fn new(id: CoefficientTableId, columns: Vec<CoefficientColumn>) -> Result<Self, CoefficientError> {
        let table = Self {
            id,
            columns,
            rows: Vec::new(),
        };
        table.check()?;
        Ok(table)
    }

    /// Appends a row after every existing row
    pub fn push_row<I, S>(&mut self, values: I, result: impl Into<String>) -> Result<(), CoefficientError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.len() != self.columns.len() {
            return Err(CoefficientError::RowArity {
                table: self.id.to_string(),
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        self.rows.push(CoefficientRow {
            values,
            result: result.into(),
        });
        Ok(())
    }

    /// Builder form of [`CoefficientTable::push_row`]
    pub fn with_row<I, S>(mut self, values: I, result: impl Into<String>) -> Result<Self, CoefficientError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_row(values, result)?;
        Ok(self)
    }

    pub fn rows(&self) -> &[CoefficientRow] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Checks column names and row arity, used after deserialising
    pub fn check(&self) -> Result<(), CoefficientError> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(CoefficientError::DuplicateColumn {
                    table: self.id.to_string(),
                    column: column.name.clone(),
                });
            }
        }
        for (index, row) in self.rows.iter().enumerate() {
            if row.values.len() != self.columns.len() {
                return Err(CoefficientError::RowArity {
                    table: self.id.to_string(),
                    row: index,
                    expected: self.columns.len(),
                    actual: row.values.len(),
                });
            }
        }
        Ok(())
    }

    /// Finds the first row matching every given column
    ///
    /// A column missing from the table, or a known value missing for a
    /// column, means no row can match.
    pub fn find(&self, known_values: &HashMap<String, String>, columns: &[CoefficientColumn]) -> Option<&CoefficientRow> {
        let mut criteria = Vec::with_capacity(columns.len());
        for column in columns {
            let index = self.column_index(&column.name)?;
            let known = known_values.get(&column.variable_code)?;
            criteria.push((index, column, known.as_str()));
        }

        self.rows.iter().find(|row| {
            criteria
                .iter()
                .all(|(index, column, known)| column.accepts(&row.values[*index], known))
        })
    }

    /// A copy of this table under another identity, rows in the same order
    pub fn copy_as(&self, id: CoefficientTableId) -> Self {
        Self {
            id,
            columns: self.columns.clone(),
            rows: self.rows.clone(),
        }
    }
}
