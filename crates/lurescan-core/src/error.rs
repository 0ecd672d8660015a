//! Error types for LureScan

/// Result type alias using LureScan's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for LureScan operations
///
/// Per-input anomalies (malformed URLs, empty messages, missing models) never
/// surface here; they are absorbed into default feature vectors or the
/// untrained result. Only contract violations and persistence failures do.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Domain key that is neither `url` nor `message`
    #[error("unknown domain: {0:?} (expected \"url\" or \"message\")")]
    UnknownDomain(String),

    /// Caller contract violations (mismatched lengths, empty training data)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Model fitting or inference errors
    #[error("model error: {0}")]
    Model(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new invalid-argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a new model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
