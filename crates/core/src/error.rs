//! Error types for rkpack.

use thiserror::Error;

/// Result type alias for rkpack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while setting up or running a packing search.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid item geometry provided.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Invalid container provided.
    #[error("Invalid boundary: {0}")]
    InvalidBoundary(String),

    /// Structurally invalid instance (duplicate ids and the like).
    #[error("Invalid instance: {0}")]
    InvalidInstance(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
