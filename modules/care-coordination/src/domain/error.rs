use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    /// Missing, or owned by someone else. The two are indistinguishable to the caller.
    #[error("{resource} not found")]
    NotFound { resource: &'static str, id: Uuid },

    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{message}")]
    Internal { message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn not_found(resource: &'static str, id: Uuid) -> Self {
        Self::NotFound { resource, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<carelink_auth::AuthError> for DomainError {
    fn from(e: carelink_auth::AuthError) -> Self {
        Self::internal(e.to_string())
    }
}

/// Repositories report failures through `anyhow`; the service boundary folds them here.
pub(crate) fn db_err(e: anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}
