//! Invitation and RSVP rows.

use atomo_core::{InvitationId, InvitationResponseId, ProfileId};

use super::count_to_u32;
use crate::local::entities::{InvitationEntity, InvitationResponseEntity};
use crate::local::{LocalError, LocalStore, Table};

const UPSERT_INVITATION: &str = r"
    INSERT INTO invitations (id, user_id, title, description, event_date, location, host_name,
                             cover_image_url, primary_color, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        user_id = excluded.user_id,
        title = excluded.title,
        description = excluded.description,
        event_date = excluded.event_date,
        location = excluded.location,
        host_name = excluded.host_name,
        cover_image_url = excluded.cover_image_url,
        primary_color = excluded.primary_color,
        created_at = excluded.created_at
";

const UPSERT_RESPONSE: &str = r"
    INSERT INTO invitation_responses (id, invitation_id, guest_name, status, guest_count,
                                      message, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        invitation_id = excluded.invitation_id,
        guest_name = excluded.guest_name,
        status = excluded.status,
        guest_count = excluded.guest_count,
        message = excluded.message,
        created_at = excluded.created_at
";

/// Query object for `invitations` and `invitation_responses`.
pub struct InvitationDao<'a> {
    store: &'a LocalStore,
}

impl<'a> InvitationDao<'a> {
    #[must_use]
    pub const fn new(store: &'a LocalStore) -> Self {
        Self { store }
    }

    /// Get an invitation by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn get(&self, id: &InvitationId) -> Result<Option<InvitationEntity>, LocalError> {
        let row = sqlx::query_as::<_, InvitationEntity>(
            r"
            SELECT id, user_id, title, description, event_date, location, host_name,
                   cover_image_url, primary_color, created_at
            FROM invitations
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.store.pool())
        .await?;

        Ok(row)
    }

    /// List an owner's invitations, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn list_by_owner(
        &self,
        owner: &ProfileId,
    ) -> Result<Vec<InvitationEntity>, LocalError> {
        let rows = sqlx::query_as::<_, InvitationEntity>(
            r"
            SELECT id, user_id, title, description, event_date, location, host_name,
                   cover_image_url, primary_color, created_at
            FROM invitations
            WHERE user_id = ?
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(owner)
        .fetch_all(self.store.pool())
        .await?;

        Ok(rows)
    }

    /// Count an owner's invitations.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn count_by_owner(&self, owner: &ProfileId) -> Result<u32, LocalError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invitations WHERE user_id = ?")
            .bind(owner)
            .fetch_one(self.store.pool())
            .await?;

        Ok(count_to_u32(count))
    }

    /// Insert or replace invitations by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if any write fails; the batch is
    /// rolled back.
    pub async fn upsert_all(&self, rows: &[InvitationEntity]) -> Result<(), LocalError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.store.pool().begin().await?;
        for row in rows {
            sqlx::query(UPSERT_INVITATION)
                .bind(&row.id)
                .bind(&row.user_id)
                .bind(&row.title)
                .bind(&row.description)
                .bind(row.event_date)
                .bind(&row.location)
                .bind(&row.host_name)
                .bind(&row.cover_image_url)
                .bind(&row.primary_color)
                .bind(row.created_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.store.notify(&[Table::Invitations]);
        Ok(())
    }

    /// Delete an invitation and its responses.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the delete fails.
    pub async fn delete(&self, id: &InvitationId) -> Result<u64, LocalError> {
        let result = sqlx::query("DELETE FROM invitations WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;

        self.store.notify(&[Table::Invitations, Table::InvitationResponses]);
        Ok(result.rows_affected())
    }

    /// List an invitation's responses in arrival order.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn list_responses(
        &self,
        invitation_id: &InvitationId,
    ) -> Result<Vec<InvitationResponseEntity>, LocalError> {
        let rows = sqlx::query_as::<_, InvitationResponseEntity>(
            r"
            SELECT id, invitation_id, guest_name, status, guest_count, message, created_at
            FROM invitation_responses
            WHERE invitation_id = ?
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(invitation_id)
        .fetch_all(self.store.pool())
        .await?;

        Ok(rows)
    }

    /// Insert or replace responses by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if any write fails; the batch is
    /// rolled back.
    pub async fn upsert_responses(
        &self,
        rows: &[InvitationResponseEntity],
    ) -> Result<(), LocalError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.store.pool().begin().await?;
        for row in rows {
            sqlx::query(UPSERT_RESPONSE)
                .bind(&row.id)
                .bind(&row.invitation_id)
                .bind(&row.guest_name)
                .bind(&row.status)
                .bind(row.guest_count)
                .bind(&row.message)
                .bind(row.created_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.store.notify(&[Table::InvitationResponses]);
        Ok(())
    }

    /// Delete a response.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the delete fails.
    pub async fn delete_response(&self, id: &InvitationResponseId) -> Result<u64, LocalError> {
        let result = sqlx::query("DELETE FROM invitation_responses WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;

        self.store.notify(&[Table::InvitationResponses]);
        Ok(result.rows_affected())
    }
}
