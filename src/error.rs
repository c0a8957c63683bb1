//! Error types for tickerlens
//!
//! Provides standardized error handling across the library.

use thiserror::Error;

/// Errors that can occur in tickerlens
#[derive(Debug, Error)]
pub enum LensError {
    /// Similarity target symbol is not in the catalog
    #[error("Symbol '{0}' not found in catalog")]
    NotFound(String),

    /// No catalog snapshot has been installed yet
    #[error("Catalog is not loaded yet")]
    CatalogUnavailable,

    /// The request was cancelled before it finished
    #[error("Request cancelled")]
    Cancelled,

    /// No answer arrived in time
    #[error("Timed out waiting for a search worker")]
    Timeout,

    /// The worker pool has shut down
    #[error("Search worker has stopped")]
    WorkerStopped,

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted state errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LensError {
    /// Whether the caller can retry the same request later.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LensError::NotFound(_)
                | LensError::CatalogUnavailable
                | LensError::Cancelled
                | LensError::Timeout
        )
    }
}

/// Result type alias for tickerlens operations
pub type LensResult<T> = Result<T, LensError>;
