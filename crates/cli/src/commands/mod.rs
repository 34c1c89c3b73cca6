//! Command implementations.

pub mod migrate;
pub mod services;
pub mod sync;

use thiserror::Error;

use atomo_app::StateError;
use atomo_app::config::ConfigError;
use atomo_app::error::RepositoryError;
use atomo_app::local::LocalError;

/// Errors a command can fail with.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("local store: {0}")]
    Local(#[from] LocalError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("serialization: {0}")]
    Json(#[from] serde_json::Error),

    /// Sync finished but some steps failed.
    #[error("{0} sync step(s) failed")]
    IncompleteSync(usize),
}
