//! Error types for pypistats-core

use thiserror::Error;

/// Main error type for the pypistats-core library
#[derive(Error, Debug)]
pub enum Error {
    /// A requested field name is not in the catalog
    #[error("\"{field}\" is an unsupported field")]
    UnsupportedField { field: String },

    /// A pivot field does not name a column of the result table
    #[error("no column named \"{field}\" in the result table")]
    UnknownField { field: String },

    /// A measure cell could not be parsed as an integer
    #[error("measure value \"{value}\" is not an integer")]
    MalformedMeasure { value: String },

    /// The warehouse did not complete the query within its timeout
    #[error("query did not complete within {secs}s")]
    Timeout { secs: u64 },

    /// The warehouse failed or rejected the query
    #[error("warehouse error: {0}")]
    Warehouse(String),

    /// A data row does not match the header width
    #[error("row {line} has {found} cells, expected {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// CSV ingestion error
    #[error("CSV error: {0}")]
    Csv(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for pypistats-core
pub type Result<T> = std::result::Result<T, Error>;
