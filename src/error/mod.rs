//! Error handling for the dashboard pipeline.

use arrow::error::ArrowError;
use thiserror::Error;

/// Errors raised while loading, filtering or summarising admission data
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The database could not be reached or rejected the credentials
    #[error("Connection error: {message}")]
    Connection {
        /// What the adapter was trying to do
        message: String,
        /// Underlying driver error
        #[source]
        source: Option<sqlx::Error>,
    },

    /// The query ran against a live connection but failed
    #[error("Query error: {message}")]
    Query {
        /// Description of the failed query
        message: String,
        /// Underlying driver error
        #[source]
        source: sqlx::Error,
    },

    /// The loaded table does not match the expected schema
    #[error("Schema error: {0}")]
    Schema(String),

    /// A filter selection is inconsistent with the loaded table
    #[error("Filter error: {0}")]
    Filter(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error raised by an Arrow compute kernel
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error reading a configuration file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error decoding a configuration file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DashboardError {
    /// Create a connection error from a driver error
    pub fn connection(message: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Connection {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a query error from a driver error
    pub fn query(message: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Query {
            message: message.into(),
            source,
        }
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Create a missing column error
    #[must_use]
    pub fn column_not_found(column: &str) -> Self {
        Self::Schema(format!("Column '{column}' not found"))
    }

    /// Create a column type error
    #[must_use]
    pub fn column_type(column: &str, expected_type: &str) -> Self {
        Self::Schema(format!("Column '{column}' is not a {expected_type} column"))
    }

    /// Create a filter error
    pub fn filter(message: impl Into<String>) -> Self {
        Self::Filter(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error should halt the session before anything is rendered
    #[must_use]
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::Query { .. } | Self::Schema(_)
        )
    }
}

/// Result type for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;
