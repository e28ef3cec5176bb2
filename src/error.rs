//! StashBot error types

use thiserror::Error;

/// StashBot error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Channel error (Slack transport)
    #[error("Channel error: {0}")]
    Channel(String),

    /// Input classification error
    #[error("Classification error: {0}")]
    Classification(String),

    /// Content extraction error
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Language-model call error
    #[error("Model error: {0}")]
    Model(String),

    /// Persistence error (Notion)
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for StashBot operations
pub type Result<T> = std::result::Result<T, Error>;
