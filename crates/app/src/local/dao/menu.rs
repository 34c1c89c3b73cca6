//! Menu, category and dish rows.

use atomo_core::{DishId, MenuCategoryId, MenuId, ProfileId};

use super::count_to_u32;
use crate::local::entities::{DishEntity, MenuCategoryEntity, MenuEntity};
use crate::local::{LocalError, LocalStore, Table};

const UPSERT_MENU: &str = r"
    INSERT INTO menus (id, user_id, name, description, logo_url, primary_color, font_family,
                       is_published, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        user_id = excluded.user_id,
        name = excluded.name,
        description = excluded.description,
        logo_url = excluded.logo_url,
        primary_color = excluded.primary_color,
        font_family = excluded.font_family,
        is_published = excluded.is_published,
        created_at = excluded.created_at
";

const UPSERT_CATEGORY: &str = r"
    INSERT INTO menu_categories (id, menu_id, name, sort_order, created_at)
    VALUES (?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        menu_id = excluded.menu_id,
        name = excluded.name,
        sort_order = excluded.sort_order,
        created_at = excluded.created_at
";

const UPSERT_DISH: &str = r"
    INSERT INTO dishes (id, menu_id, category_id, name, description, price, image_url,
                        is_available, sort_order, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        menu_id = excluded.menu_id,
        category_id = excluded.category_id,
        name = excluded.name,
        description = excluded.description,
        price = excluded.price,
        image_url = excluded.image_url,
        is_available = excluded.is_available,
        sort_order = excluded.sort_order,
        created_at = excluded.created_at
";

/// Query object for `menus`, `menu_categories` and `dishes`.
pub struct MenuDao<'a> {
    store: &'a LocalStore,
}

impl<'a> MenuDao<'a> {
    #[must_use]
    pub const fn new(store: &'a LocalStore) -> Self {
        Self { store }
    }

    // =========================================================================
    // Menus
    // =========================================================================

    /// Get a menu by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn get(&self, id: &MenuId) -> Result<Option<MenuEntity>, LocalError> {
        let row = sqlx::query_as::<_, MenuEntity>(
            r"
            SELECT id, user_id, name, description, logo_url, primary_color, font_family,
                   is_published, created_at
            FROM menus
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.store.pool())
        .await?;

        Ok(row)
    }

    /// List an owner's menus, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn list_by_owner(&self, owner: &ProfileId) -> Result<Vec<MenuEntity>, LocalError> {
        let rows = sqlx::query_as::<_, MenuEntity>(
            r"
            SELECT id, user_id, name, description, logo_url, primary_color, font_family,
                   is_published, created_at
            FROM menus
            WHERE user_id = ?
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(owner)
        .fetch_all(self.store.pool())
        .await?;

        Ok(rows)
    }

    /// Count an owner's menus.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn count_by_owner(&self, owner: &ProfileId) -> Result<u32, LocalError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menus WHERE user_id = ?")
            .bind(owner)
            .fetch_one(self.store.pool())
            .await?;

        Ok(count_to_u32(count))
    }

    /// Insert or replace menus by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if any write fails; the batch is
    /// rolled back.
    pub async fn upsert_all(&self, rows: &[MenuEntity]) -> Result<(), LocalError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.store.pool().begin().await?;
        for row in rows {
            sqlx::query(UPSERT_MENU)
                .bind(&row.id)
                .bind(&row.user_id)
                .bind(&row.name)
                .bind(&row.description)
                .bind(&row.logo_url)
                .bind(&row.primary_color)
                .bind(&row.font_family)
                .bind(row.is_published)
                .bind(row.created_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.store.notify(&[Table::Menus]);
        Ok(())
    }

    /// Delete a menu; its categories and dishes go with it.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the delete fails.
    pub async fn delete(&self, id: &MenuId) -> Result<u64, LocalError> {
        let result = sqlx::query("DELETE FROM menus WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;

        self.store.notify(&[Table::Menus, Table::MenuCategories, Table::Dishes]);
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// List a menu's categories by `sort_order`.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn list_categories(
        &self,
        menu_id: &MenuId,
    ) -> Result<Vec<MenuCategoryEntity>, LocalError> {
        let rows = sqlx::query_as::<_, MenuCategoryEntity>(
            r"
            SELECT id, menu_id, name, sort_order, created_at
            FROM menu_categories
            WHERE menu_id = ?
            ORDER BY sort_order ASC, created_at ASC, id ASC
            ",
        )
        .bind(menu_id)
        .fetch_all(self.store.pool())
        .await?;

        Ok(rows)
    }

    /// Insert or replace categories by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if any write fails; the batch is
    /// rolled back.
    pub async fn upsert_categories(&self, rows: &[MenuCategoryEntity]) -> Result<(), LocalError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.store.pool().begin().await?;
        for row in rows {
            sqlx::query(UPSERT_CATEGORY)
                .bind(&row.id)
                .bind(&row.menu_id)
                .bind(&row.name)
                .bind(row.sort_order)
                .bind(row.created_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.store.notify(&[Table::MenuCategories]);
        Ok(())
    }

    /// Delete a category. Its dishes stay, with `category_id` cleared.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the delete fails.
    pub async fn delete_category(&self, id: &MenuCategoryId) -> Result<u64, LocalError> {
        let result = sqlx::query("DELETE FROM menu_categories WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;

        self.store.notify(&[Table::MenuCategories, Table::Dishes]);
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Dishes
    // =========================================================================

    /// List a menu's dishes by `sort_order`.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn list_dishes(&self, menu_id: &MenuId) -> Result<Vec<DishEntity>, LocalError> {
        let rows = sqlx::query_as::<_, DishEntity>(
            r"
            SELECT id, menu_id, category_id, name, description, price, image_url,
                   is_available, sort_order, created_at
            FROM dishes
            WHERE menu_id = ?
            ORDER BY sort_order ASC, created_at ASC, id ASC
            ",
        )
        .bind(menu_id)
        .fetch_all(self.store.pool())
        .await?;

        Ok(rows)
    }

    /// Insert or replace dishes by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if any write fails; the batch is
    /// rolled back.
    pub async fn upsert_dishes(&self, rows: &[DishEntity]) -> Result<(), LocalError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.store.pool().begin().await?;
        for row in rows {
            sqlx::query(UPSERT_DISH)
                .bind(&row.id)
                .bind(&row.menu_id)
                .bind(&row.category_id)
                .bind(&row.name)
                .bind(&row.description)
                .bind(&row.price)
                .bind(&row.image_url)
                .bind(row.is_available)
                .bind(row.sort_order)
                .bind(row.created_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.store.notify(&[Table::Dishes]);
        Ok(())
    }

    /// Delete a dish.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the delete fails.
    pub async fn delete_dish(&self, id: &DishId) -> Result<u64, LocalError> {
        let result = sqlx::query("DELETE FROM dishes WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;

        self.store.notify(&[Table::Dishes]);
        Ok(result.rows_affected())
    }
}
