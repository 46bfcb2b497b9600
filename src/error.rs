//! Unified error types for the slide tour engine.

use std::fmt;

/// Application-specific errors.
#[derive(Debug)]
pub enum AppError {
    /// Error reading from or writing to the persistent store
    Store(String),
    /// The on-disk schema is newer than this build supports
    SchemaVersion { found: i64, supported: i64 },
    /// Error constructing the HTTP probe client
    HttpClient(String),
    /// A region was opened before any slides were discovered for it
    NoSlides(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Store(msg) => write!(f, "Persistent store error: {}", msg),
            AppError::SchemaVersion { found, supported } => write!(
                f,
                "Store schema version {} is newer than supported version {}",
                found, supported
            ),
            AppError::HttpClient(msg) => write!(f, "HTTP client error: {}", msg),
            AppError::NoSlides(region) => {
                write!(f, "No slides available for region: {}", region)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Store(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Store(format!("Task join error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::HttpClient(err.to_string())
    }
}

/// Type alias for Results in this application.
pub type Result<T> = std::result::Result<T, AppError>;
