use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the individual pipeline stages.
///
/// Nothing in the pipeline recovers from these; `main` reports them and
/// aborts before a window is opened.
#[derive(Debug, Error)]
pub enum TrendError {
    #[error("cannot read {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("required column '{column}' not found in input table")]
    MissingColumn { column: String },

    #[error("column '{column}', row {row}: '{value}' is not numeric")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("configuration mismatch: {0}")]
    Configuration(String),
}

pub type TrendResult<T> = std::result::Result<T, TrendError>;
