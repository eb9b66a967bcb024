//! Error types for smnview

use thiserror::Error;

use crate::cache::CacheError;

/// Result type alias for smnview operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Errors that end a command
///
/// Fetch failures never show up here: they are carried inside a
/// [`FetchEnvelope`](crate::data::FetchEnvelope) instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Server error: {0}")]
    Server(String),
}
