//! Plan catalogue and per-owner subscription rows.

use atomo_core::{PlanId, ProfileId};

use crate::local::entities::{PlanEntity, SubscriptionEntity};
use crate::local::{LocalError, LocalStore, Table};

const UPSERT_PLAN: &str = r"
    INSERT INTO plans (id, name, price_monthly, features, sort_order)
    VALUES (?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        price_monthly = excluded.price_monthly,
        features = excluded.features,
        sort_order = excluded.sort_order
";

const UPSERT_SUBSCRIPTION: &str = r"
    INSERT INTO subscriptions (id, user_id, plan_id, status, started_at, expires_at,
                               created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        user_id = excluded.user_id,
        plan_id = excluded.plan_id,
        status = excluded.status,
        started_at = excluded.started_at,
        expires_at = excluded.expires_at,
        created_at = excluded.created_at,
        updated_at = excluded.updated_at
";

/// Query object for `plans` and `subscriptions`.
pub struct SubscriptionDao<'a> {
    store: &'a LocalStore,
}

impl<'a> SubscriptionDao<'a> {
    #[must_use]
    pub const fn new(store: &'a LocalStore) -> Self {
        Self { store }
    }

    // =========================================================================
    // Plans
    // =========================================================================

    /// List all cached plans, cheapest tier first.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn list_plans(&self) -> Result<Vec<PlanEntity>, LocalError> {
        let rows = sqlx::query_as::<_, PlanEntity>(
            r"
            SELECT id, name, price_monthly, features, sort_order
            FROM plans
            ORDER BY sort_order ASC, id ASC
            ",
        )
        .fetch_all(self.store.pool())
        .await?;

        Ok(rows)
    }

    /// Get a plan by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn get_plan(&self, id: &PlanId) -> Result<Option<PlanEntity>, LocalError> {
        let row = sqlx::query_as::<_, PlanEntity>(
            r"
            SELECT id, name, price_monthly, features, sort_order
            FROM plans
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.store.pool())
        .await?;

        Ok(row)
    }

    /// Insert or replace plans by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if any write fails; the batch is
    /// rolled back.
    pub async fn upsert_plans(&self, rows: &[PlanEntity]) -> Result<(), LocalError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.store.pool().begin().await?;
        for row in rows {
            sqlx::query(UPSERT_PLAN)
                .bind(&row.id)
                .bind(&row.name)
                .bind(&row.price_monthly)
                .bind(&row.features)
                .bind(row.sort_order)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.store.notify(&[Table::Plans]);
        Ok(())
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Get the owner's subscription, if any is cached.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn get_by_owner(
        &self,
        owner: &ProfileId,
    ) -> Result<Option<SubscriptionEntity>, LocalError> {
        let row = sqlx::query_as::<_, SubscriptionEntity>(
            r"
            SELECT id, user_id, plan_id, status, started_at, expires_at, created_at, updated_at
            FROM subscriptions
            WHERE user_id = ?
            ",
        )
        .bind(owner)
        .fetch_optional(self.store.pool())
        .await?;

        Ok(row)
    }

    /// Store the owner's subscription.
    ///
    /// An owner holds at most one row; a row with a different id for the
    /// same owner is replaced.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the write fails.
    pub async fn upsert(&self, row: &SubscriptionEntity) -> Result<(), LocalError> {
        let mut tx = self.store.pool().begin().await?;

        sqlx::query("DELETE FROM subscriptions WHERE user_id = ? AND id <> ?")
            .bind(&row.user_id)
            .bind(&row.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(UPSERT_SUBSCRIPTION)
            .bind(&row.id)
            .bind(&row.user_id)
            .bind(&row.plan_id)
            .bind(&row.status)
            .bind(row.started_at)
            .bind(row.expires_at)
            .bind(row.created_at)
            .bind(row.updated_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.store.notify(&[Table::Subscriptions]);
        Ok(())
    }
}
