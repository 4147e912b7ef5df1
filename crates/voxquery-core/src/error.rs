use thiserror::Error;

/// Top-level error type for VoxQuery.
///
/// Recognition failures reported by the platform are not errors in this
/// sense; they arrive as events and end in a user notification. This type
/// covers configuration problems and failed calls into a collaborator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VoxQueryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Speech recognition is not available on this platform")]
    CapabilityUnavailable,

    #[error("Recognition capability error: {0}")]
    Capability(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for VoxQueryError {
    fn from(err: toml::de::Error) -> Self {
        VoxQueryError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for VoxQueryError {
    fn from(err: toml::ser::Error) -> Self {
        VoxQueryError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for VoxQueryError {
    fn from(err: serde_json::Error) -> Self {
        VoxQueryError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for VoxQuery operations.
pub type Result<T> = std::result::Result<T, VoxQueryError>;
