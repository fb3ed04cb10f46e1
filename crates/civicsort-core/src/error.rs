//! Error types for CivicSort

/// Result type alias using CivicSort's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for CivicSort operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Training could not produce a model (empty or degenerate corpus)
    #[error("training error: {0}")]
    Training(String),

    /// A loaded model could not be evaluated
    #[error("model error: {0}")]
    Model(String),

    /// Model artifact or metadata could not be read or written
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Label outside the fixed category set
    #[error("invalid category: {0}")]
    InvalidCategory(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new training error
    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    /// Create a new model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a new invalid category error
    pub fn invalid_category(label: impl Into<String>) -> Self {
        Self::InvalidCategory(label.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the caller supplied bad input, as opposed to an operational failure
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidCategory(_))
    }
}
