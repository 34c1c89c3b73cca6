//! Profile rows.

use atomo_core::ProfileId;

use crate::local::entities::ProfileEntity;
use crate::local::{LocalError, LocalStore, Table};

const UPSERT: &str = r"
    INSERT INTO profiles (id, full_name, email, phone, bio, avatar_url, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        full_name = excluded.full_name,
        email = excluded.email,
        phone = excluded.phone,
        bio = excluded.bio,
        avatar_url = excluded.avatar_url,
        created_at = excluded.created_at,
        updated_at = excluded.updated_at
";

/// Query object for the `profiles` table.
pub struct ProfileDao<'a> {
    store: &'a LocalStore,
}

impl<'a> ProfileDao<'a> {
    #[must_use]
    pub const fn new(store: &'a LocalStore) -> Self {
        Self { store }
    }

    /// Get a profile by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn get(&self, id: &ProfileId) -> Result<Option<ProfileEntity>, LocalError> {
        let row = sqlx::query_as::<_, ProfileEntity>(
            r"
            SELECT id, full_name, email, phone, bio, avatar_url, created_at, updated_at
            FROM profiles
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.store.pool())
        .await?;

        Ok(row)
    }

    /// Insert or replace profiles by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if any write fails; the batch is
    /// rolled back.
    pub async fn upsert_all(&self, rows: &[ProfileEntity]) -> Result<(), LocalError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.store.pool().begin().await?;
        for row in rows {
            sqlx::query(UPSERT)
                .bind(&row.id)
                .bind(&row.full_name)
                .bind(&row.email)
                .bind(&row.phone)
                .bind(&row.bio)
                .bind(&row.avatar_url)
                .bind(row.created_at)
                .bind(row.updated_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.store.notify(&[Table::Profiles]);
        Ok(())
    }

    /// Delete a profile. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the delete fails.
    pub async fn delete(&self, id: &ProfileId) -> Result<u64, LocalError> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;

        self.store.notify(&[Table::Profiles]);
        Ok(result.rows_affected())
    }
}
