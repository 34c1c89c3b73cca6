//! Local database schema.
//!
//! # Usage
//!
//! ```bash
//! atomo migrate
//! ```
//!
//! # Environment Variables
//!
//! - `ATOMO_DATABASE_URL` - `SQLite` database (default: `sqlite://atomo.db?mode=rwc`)

use tracing::info;

use atomo_app::config::{database_url_from_env, redacted_database_url};
use atomo_app::local::LocalStore;

use super::CommandError;

/// Open the local database and apply the embedded migrations.
///
/// # Errors
///
/// Returns `CommandError::Local` if the database cannot be opened or a
/// migration fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url_from_env();

    info!(database = %redacted_database_url(&database_url), "Opening local database...");
    let store = LocalStore::open(&database_url).await?;

    info!("Running migrations...");
    store.migrate().await?;

    info!("Migrations complete");
    Ok(())
}
