//! Error types for topic subscriptions.

use thiserror::Error;

/// Main error type for transport and subscriber operations.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("Invalid topic name '{topic}': {reason}")]
    InvalidTopic { topic: String, reason: String },

    #[error("Topic {topic} carries {expected}, not {got}")]
    TypeMismatch {
        topic: String,
        expected: String,
        got: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for OverlayError {
    fn from(e: serde_json::Error) -> Self {
        OverlayError::InvalidConfig(e.to_string())
    }
}

/// Result type for topic subscription operations.
pub type Result<T> = std::result::Result<T, OverlayError>;
