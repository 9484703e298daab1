//! Variable store errors
//!
//! Reading a document never fails; these errors surface only where a caller
//! asked for something that cannot be made to work (a malformed path in the
//! product configuration, a value of the wrong type).

use thiserror::Error;

use crate::definition::DataType;

/// Errors raised by the variable store
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VariableError {
    /// No definition with this code exists in the context
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// The raw text cannot be read as the declared type
    #[error("Cannot read '{raw}' as {data_type} for variable {code}")]
    Unparsable {
        code: String,
        raw: String,
        data_type: DataType,
    },

    /// A typed value was assigned to a variable of another type
    #[error("Type mismatch for variable {code}: declared {declared}, got {actual}")]
    TypeMismatch {
        code: String,
        declared: DataType,
        actual: DataType,
    },

    /// The variable's path is malformed
    #[error(transparent)]
    Path(#[from] PathError),
}

/// Errors raised while parsing a path expression
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("Empty path")]
    Empty,

    #[error("Invalid path '{path}' at position {position}: {message}")]
    Syntax {
        path: String,
        position: usize,
        message: String,
    },
}

impl PathError {
    pub(crate) fn syntax(path: &str, position: usize, message: impl Into<String>) -> Self {
        PathError::Syntax {
            path: path.to_string(),
            position,
            message: message.into(),
        }
    }
}
