//! Error types for forum-privacy.

use thiserror::Error;

/// Common error type for privacy operations.
#[derive(Error, Debug)]
pub enum PrivacyError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant. They are never
    /// retried here; the caller's transaction is expected to roll back.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure while serializing an exported record.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A collaborator (ratings, tags, files, plagiarism, writer) failed.
    #[error("{component} failed: {message}")]
    Collaborator {
        /// Name of the collaborating subsystem.
        component: &'static str,
        /// Failure description.
        message: String,
    },

    /// Validation error for caller input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PrivacyError {
    /// Build a collaborator failure.
    pub fn collaborator(component: &'static str, message: impl Into<String>) -> Self {
        PrivacyError::Collaborator {
            component,
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for PrivacyError {
    fn from(e: sqlx::Error) -> Self {
        PrivacyError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for PrivacyError {
    fn from(e: serde_json::Error) -> Self {
        PrivacyError::Serialization(e.to_string())
    }
}

/// Result type alias for privacy operations.
pub type Result<T> = std::result::Result<T, PrivacyError>;
