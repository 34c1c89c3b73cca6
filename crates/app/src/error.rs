//! Error types for the repository and use-case layers.

use thiserror::Error;

use atomo_core::CreateDecision;

use crate::local::LocalError;
use crate::remote::RemoteError;

/// Errors returned by repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Local cache error.
    #[error("local store error: {0}")]
    Local(#[from] LocalError),

    /// Backend error.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Data in the local store or from the backend is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        Self::Local(LocalError::Database(err))
    }
}

/// Errors returned by use cases.
#[derive(Debug, Error)]
pub enum UseCaseError {
    /// Input failed validation.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// The owner's plan does not allow creating another service.
    #[error("plan limit reached: {0:?}")]
    LimitReached(CreateDecision),

    /// Repository error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl UseCaseError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

impl From<LocalError> for UseCaseError {
    fn from(err: LocalError) -> Self {
        Self::Repository(RepositoryError::Local(err))
    }
}

impl From<RemoteError> for UseCaseError {
    fn from(err: RemoteError) -> Self {
        Self::Repository(RepositoryError::Remote(err))
    }
}
