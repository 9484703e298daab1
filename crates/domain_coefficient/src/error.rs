//! Coefficient table errors
//!
//! Lookups never fail; a missing row is `None`. These errors cover table
//! maintenance and loading.

use thiserror::Error;

use crate::table::CoefficientTableId;

/// Errors in coefficient table configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoefficientError {
    /// The table does not exist in the catalog
    #[error("Coefficient table not found: {0}")]
    TableNotFound(CoefficientTableId),

    /// A row has a different number of values than the table has columns
    #[error("Row {row} of table {table} has {actual} values, expected {expected}")]
    RowArity {
        table: String,
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A column name is declared twice
    #[error("Duplicate column {column} in table {table}")]
    DuplicateColumn { table: String, column: String },

    /// Table definitions could not be read
    #[error("Invalid coefficient tables: {0}")]
    Parse(String),
}
