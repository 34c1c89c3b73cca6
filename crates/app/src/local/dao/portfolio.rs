//! Portfolio and item rows.

use atomo_core::{PortfolioId, PortfolioItemId, ProfileId};

use super::count_to_u32;
use crate::local::entities::{PortfolioEntity, PortfolioItemEntity};
use crate::local::{LocalError, LocalStore, Table};

const UPSERT_PORTFOLIO: &str = r"
    INSERT INTO portfolios (id, user_id, title, description, cover_image_url, primary_color,
                            font_family, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        user_id = excluded.user_id,
        title = excluded.title,
        description = excluded.description,
        cover_image_url = excluded.cover_image_url,
        primary_color = excluded.primary_color,
        font_family = excluded.font_family,
        created_at = excluded.created_at
";

const UPSERT_ITEM: &str = r"
    INSERT INTO portfolio_items (id, portfolio_id, title, description, image_url, link_url,
                                 sort_order, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        portfolio_id = excluded.portfolio_id,
        title = excluded.title,
        description = excluded.description,
        image_url = excluded.image_url,
        link_url = excluded.link_url,
        sort_order = excluded.sort_order,
        created_at = excluded.created_at
";

/// Query object for `portfolios` and `portfolio_items`.
pub struct PortfolioDao<'a> {
    store: &'a LocalStore,
}

impl<'a> PortfolioDao<'a> {
    #[must_use]
    pub const fn new(store: &'a LocalStore) -> Self {
        Self { store }
    }

    /// Get a portfolio by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn get(&self, id: &PortfolioId) -> Result<Option<PortfolioEntity>, LocalError> {
        let row = sqlx::query_as::<_, PortfolioEntity>(
            r"
            SELECT id, user_id, title, description, cover_image_url, primary_color,
                   font_family, created_at
            FROM portfolios
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.store.pool())
        .await?;

        Ok(row)
    }

    /// List an owner's portfolios, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn list_by_owner(
        &self,
        owner: &ProfileId,
    ) -> Result<Vec<PortfolioEntity>, LocalError> {
        let rows = sqlx::query_as::<_, PortfolioEntity>(
            r"
            SELECT id, user_id, title, description, cover_image_url, primary_color,
                   font_family, created_at
            FROM portfolios
            WHERE user_id = ?
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(owner)
        .fetch_all(self.store.pool())
        .await?;

        Ok(rows)
    }

    /// Count an owner's portfolios.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn count_by_owner(&self, owner: &ProfileId) -> Result<u32, LocalError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM portfolios WHERE user_id = ?")
            .bind(owner)
            .fetch_one(self.store.pool())
            .await?;

        Ok(count_to_u32(count))
    }

    /// Insert or replace portfolios by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if any write fails; the batch is
    /// rolled back.
    pub async fn upsert_all(&self, rows: &[PortfolioEntity]) -> Result<(), LocalError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.store.pool().begin().await?;
        for row in rows {
            sqlx::query(UPSERT_PORTFOLIO)
                .bind(&row.id)
                .bind(&row.user_id)
                .bind(&row.title)
                .bind(&row.description)
                .bind(&row.cover_image_url)
                .bind(&row.primary_color)
                .bind(&row.font_family)
                .bind(row.created_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.store.notify(&[Table::Portfolios]);
        Ok(())
    }

    /// Delete a portfolio and its items.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the delete fails.
    pub async fn delete(&self, id: &PortfolioId) -> Result<u64, LocalError> {
        let result = sqlx::query("DELETE FROM portfolios WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;

        self.store.notify(&[Table::Portfolios, Table::PortfolioItems]);
        Ok(result.rows_affected())
    }

    /// List a portfolio's items by `sort_order`.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn list_items(
        &self,
        portfolio_id: &PortfolioId,
    ) -> Result<Vec<PortfolioItemEntity>, LocalError> {
        let rows = sqlx::query_as::<_, PortfolioItemEntity>(
            r"
            SELECT id, portfolio_id, title, description, image_url, link_url,
                   sort_order, created_at
            FROM portfolio_items
            WHERE portfolio_id = ?
            ORDER BY sort_order ASC, created_at ASC, id ASC
            ",
        )
        .bind(portfolio_id)
        .fetch_all(self.store.pool())
        .await?;

        Ok(rows)
    }

    /// Insert or replace items by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if any write fails; the batch is
    /// rolled back.
    pub async fn upsert_items(&self, rows: &[PortfolioItemEntity]) -> Result<(), LocalError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.store.pool().begin().await?;
        for row in rows {
            sqlx::query(UPSERT_ITEM)
                .bind(&row.id)
                .bind(&row.portfolio_id)
                .bind(&row.title)
                .bind(&row.description)
                .bind(&row.image_url)
                .bind(&row.link_url)
                .bind(row.sort_order)
                .bind(row.created_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.store.notify(&[Table::PortfolioItems]);
        Ok(())
    }

    /// Delete an item.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the delete fails.
    pub async fn delete_item(&self, id: &PortfolioItemId) -> Result<u64, LocalError> {
        let result = sqlx::query("DELETE FROM portfolio_items WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;

        self.store.notify(&[Table::PortfolioItems]);
        Ok(result.rows_affected())
    }
}
