//! Local SQLite cache.
//!
//! # Database: on-device `atomo.db`
//!
//! Mirrors the remote tables one-to-one. Every row is keyed by its
//! client-generated id, so a sync pull can overwrite rows in place.
//!
//! ## Tables
//!
//! - `profiles`
//! - `menus`, `menu_categories`, `dishes`
//! - `shops`, `shop_categories`, `products`
//! - `portfolios`, `portfolio_items`
//! - `cvs`, `cv_education`, `cv_experience`, `cv_skills`
//! - `invitations`, `invitation_responses`
//! - `plans`, `subscriptions`
//!
//! # Change notifications
//!
//! Every DAO write publishes the [`Table`]s it touched on a broadcast
//! channel. Observers re-query when a table they depend on changes; this is
//! what drives the `observe` streams in the repository layer.
//!
//! # Migrations
//!
//! The schema is embedded from `crates/app/migrations/` and applied with
//! [`LocalStore::migrate`] (or `atomo migrate` from the CLI).

pub mod dao;
pub mod entities;

use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;
use tokio::sync::broadcast;

/// Capacity of the change-notification channel. Slow observers that fall
/// further behind than this just re-query once.
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// Errors raised by the local store.
#[derive(Debug, Error)]
pub enum LocalError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying the embedded schema failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Local tables, used for change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Profiles,
    Menus,
    MenuCategories,
    Dishes,
    Shops,
    ShopCategories,
    Products,
    Portfolios,
    PortfolioItems,
    Cvs,
    CvEducation,
    CvExperience,
    CvSkills,
    Invitations,
    InvitationResponses,
    Plans,
    Subscriptions,
}

impl Table {
    /// Table name, shared by the local schema and the backend.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Profiles => "profiles",
            Self::Menus => "menus",
            Self::MenuCategories => "menu_categories",
            Self::Dishes => "dishes",
            Self::Shops => "shops",
            Self::ShopCategories => "shop_categories",
            Self::Products => "products",
            Self::Portfolios => "portfolios",
            Self::PortfolioItems => "portfolio_items",
            Self::Cvs => "cvs",
            Self::CvEducation => "cv_education",
            Self::CvExperience => "cv_experience",
            Self::CvSkills => "cv_skills",
            Self::Invitations => "invitations",
            Self::InvitationResponses => "invitation_responses",
            Self::Plans => "plans",
            Self::Subscriptions => "subscriptions",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle to the local cache: a connection pool plus the change channel.
///
/// Cheap to clone; clones share the pool and the channel.
#[derive(Clone, Debug)]
pub struct LocalStore {
    pool: SqlitePool,
    changes: broadcast::Sender<Table>,
}

impl LocalStore {
    /// Wrap an existing pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { pool, changes }
    }

    /// Open (creating if needed) the database at `database_url`.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the URL is invalid or the database
    /// cannot be opened.
    pub async fn open(database_url: &SecretString) -> Result<Self, LocalError> {
        Ok(Self::new(create_pool(database_url).await?))
    }

    /// A fresh in-memory database with the schema applied.
    ///
    /// Uses a single connection so every query sees the same database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or migrated.
    pub async fn in_memory() -> Result<Self, LocalError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Apply the embedded schema.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Migration` if a migration fails.
    pub async fn migrate(&self) -> Result<(), LocalError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Subscribe to table change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Table> {
        self.changes.subscribe()
    }

    /// Publish that `tables` changed.
    pub(crate) fn notify(&self, tables: &[Table]) {
        for table in tables {
            // No receivers is fine: nobody is observing right now.
            let _ = self.changes.send(*table);
        }
    }
}

/// Create a SQLite connection pool with sensible defaults.
///
/// Foreign keys are enforced so cascades and `SET NULL` references behave
/// the same as on the backend.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the database cannot be
/// opened.
pub async fn create_pool(database_url: &SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_has_schema() {
        let store = LocalStore::in_memory().await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menus")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_notify_reaches_subscribers() {
        let store = LocalStore::in_memory().await.unwrap();
        let mut rx = store.subscribe();
        store.notify(&[Table::Menus, Table::Dishes]);
        assert_eq!(rx.recv().await.unwrap(), Table::Menus);
        assert_eq!(rx.recv().await.unwrap(), Table::Dishes);
    }
}
