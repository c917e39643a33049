//! Error types for the comparison engine.
//!
//! Structural failures (bad configuration, unjoinable keys, report write
//! failures) surface as [`CompareError`]. Per-cell data problems never do; they
//! degrade into missing cells instead.

use std::{fmt, path::PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Identifies which of the two compared sources an error or row refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSide {
    File1,
    File2,
}

impl SourceSide {
    /// Name of the config section describing this source.
    pub fn config_section(&self) -> &'static str {
        match self {
            SourceSide::File1 => "file1",
            SourceSide::File2 => "file2",
        }
    }
}

impl fmt::Display for SourceSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSide::File1 => write!(f, "file 1"),
            SourceSide::File2 => write!(f, "file 2"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CompareError {
    /// The configuration document could not be deserialized.
    #[error("Failed to parse comparison config: {0}")]
    ConfigParse(String),

    /// A config field is missing or invalid.
    #[error("Invalid config field '{field}': {message}")]
    Config { field: String, message: String },

    /// The configured key column does not exist in a source table.
    #[error("Key column '{column}' ({}.key_column) not found in {file}", file.config_section())]
    MissingKeyColumn { file: SourceSide, column: String },

    /// Two headers collapse to the same name once case-folded or renamed.
    #[error("Column '{column}' appears more than once in {file} after case-folding")]
    DuplicateColumn { file: SourceSide, column: String },

    /// Key values cannot be ordered against each other.
    #[error("Key values are incomparable: {found} key in {file} cannot be ordered against {expected} keys")]
    KeyType {
        file: SourceSide,
        expected: &'static str,
        found: &'static str,
    },

    /// Building the report workbook failed.
    #[error("Failed to build report workbook: {0}")]
    Report(#[from] rust_xlsxwriter::XlsxError),

    /// Writing the report to its destination failed.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CompareError {
    pub(crate) fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        CompareError::Config {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompareError>;
