use crate::store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Queue errors
    /// This voter already has a vote recorded for this track. Expected and
    /// user-facing; callers surface it as feedback, not as a failure.
    #[error("already voted for this track")]
    AlreadyVoted,

    #[error("track not found in queue: {queue_id}")]
    TrackNotFound { queue_id: String },

    #[error("invalid submission: {reason}")]
    InvalidSubmission { reason: String },

    // Store errors
    #[error("store constraint violated: {constraint}")]
    ConstraintViolation { constraint: String },

    #[error("store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    // Configuration errors
    #[error(
        "Config file not found at {}. A template has been created - please edit it and restart.",
        path.display()
    )]
    ConfigNotFound { path: PathBuf },

    #[error("Missing required config field: {field}")]
    ConfigMissingField { field: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { constraint } => Self::ConstraintViolation { constraint },
            StoreError::RowNotFound => Self::StoreUnavailable {
                reason: "referenced row not found".to_string(),
            },
            StoreError::Unavailable { reason } => Self::StoreUnavailable { reason },
        }
    }
}
