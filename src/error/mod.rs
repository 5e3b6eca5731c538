//! Error handling for the district scoring pipeline.

pub mod util;

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Specialized error type for loading, scoring and writing
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error opening, reading or writing a file
    #[error("IO error for {}: {message}: {source}", .path.display())]
    Io {
        /// Path of the file or directory
        path: PathBuf,
        /// What was being attempted
        message: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// A path that does not exist or is of the wrong kind
    #[error("Invalid path {}: {message}", .path.display())]
    InvalidPath {
        /// The offending path
        path: PathBuf,
        /// Description of the problem
        message: String,
    },

    /// Error processing Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error converting between Rust records and Arrow batches
    #[error("Record conversion error: {0}")]
    Conversion(#[from] serde_arrow::Error),

    /// Error parsing a configuration file
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A required column is absent from the input
    #[error("Required column '{column}' not found in {source_name}")]
    MissingColumn {
        /// Canonical column name
        column: String,
        /// Input file or stream the column was expected in
        source_name: String,
    },

    /// A sale date that does not match `YYYY-MM`
    #[error("Malformed sale date {value:?} at row {row} of {source_name}: expected YYYY-MM")]
    InvalidSaleDate {
        /// The raw value, `None` when the cell was null
        value: Option<String>,
        /// Zero-based row within the source
        row: usize,
        /// Input file or stream
        source_name: String,
    },

    /// A required value is null
    #[error("Missing value for required column '{column}' at row {row} of {source_name}")]
    MissingValue {
        /// Canonical column name
        column: String,
        /// Zero-based row within the source
        row: usize,
        /// Input file or stream
        source_name: String,
    },

    /// A metric has zero or non-finite standard deviation and cannot be normalized
    #[error("Cannot normalize {metric}: standard deviation is {stddev}")]
    DegenerateMetric {
        /// Metric name
        metric: String,
        /// The computed standard deviation
        stddev: f64,
    },

    /// Other validation failures
    #[error("Validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Wrap an I/O error with the path and operation it came from
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
            source,
        }
    }

    /// Error for a path that is missing or of the wrong kind
    pub fn invalid_path(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
