use thiserror::Error;

/// Top-level error type for folio.
///
/// Only setup can fail: loading configuration or a knowledge base file.
/// Runtime operations (search, submit, playback) express every outcome as
/// data and never return this type.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FolioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Knowledge base must contain at least one chunk")]
    EmptyKnowledgeBase,

    #[error("Invalid knowledge chunk at position {index}: {reason}")]
    InvalidChunk { index: usize, reason: String },
}

impl From<toml::de::Error> for FolioError {
    fn from(err: toml::de::Error) -> Self {
        FolioError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for FolioError {
    fn from(err: toml::ser::Error) -> Self {
        FolioError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(err: serde_json::Error) -> Self {
        FolioError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for folio setup operations.
pub type Result<T> = std::result::Result<T, FolioError>;
