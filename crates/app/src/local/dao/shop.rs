//! Shop, category and product rows.

use atomo_core::{ProductId, ProfileId, ShopCategoryId, ShopId};

use super::count_to_u32;
use crate::local::entities::{ProductEntity, ShopCategoryEntity, ShopEntity};
use crate::local::{LocalError, LocalStore, Table};

const UPSERT_SHOP: &str = r"
    INSERT INTO shops (id, user_id, name, description, logo_url, primary_color, font_family,
                       currency, whatsapp_number, is_published, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        user_id = excluded.user_id,
        name = excluded.name,
        description = excluded.description,
        logo_url = excluded.logo_url,
        primary_color = excluded.primary_color,
        font_family = excluded.font_family,
        currency = excluded.currency,
        whatsapp_number = excluded.whatsapp_number,
        is_published = excluded.is_published,
        created_at = excluded.created_at
";

const UPSERT_CATEGORY: &str = r"
    INSERT INTO shop_categories (id, shop_id, name, sort_order, created_at)
    VALUES (?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        shop_id = excluded.shop_id,
        name = excluded.name,
        sort_order = excluded.sort_order,
        created_at = excluded.created_at
";

const UPSERT_PRODUCT: &str = r"
    INSERT INTO products (id, shop_id, category_id, name, description, price, image_url,
                          in_stock, sort_order, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        shop_id = excluded.shop_id,
        category_id = excluded.category_id,
        name = excluded.name,
        description = excluded.description,
        price = excluded.price,
        image_url = excluded.image_url,
        in_stock = excluded.in_stock,
        sort_order = excluded.sort_order,
        created_at = excluded.created_at
";

/// Query object for `shops`, `shop_categories` and `products`.
pub struct ShopDao<'a> {
    store: &'a LocalStore,
}

impl<'a> ShopDao<'a> {
    #[must_use]
    pub const fn new(store: &'a LocalStore) -> Self {
        Self { store }
    }

    // =========================================================================
    // Shops
    // =========================================================================

    /// Get a shop by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn get(&self, id: &ShopId) -> Result<Option<ShopEntity>, LocalError> {
        let row = sqlx::query_as::<_, ShopEntity>(
            r"
            SELECT id, user_id, name, description, logo_url, primary_color, font_family,
                   currency, whatsapp_number, is_published, created_at
            FROM shops
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.store.pool())
        .await?;

        Ok(row)
    }

    /// List an owner's shops, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn list_by_owner(&self, owner: &ProfileId) -> Result<Vec<ShopEntity>, LocalError> {
        let rows = sqlx::query_as::<_, ShopEntity>(
            r"
            SELECT id, user_id, name, description, logo_url, primary_color, font_family,
                   currency, whatsapp_number, is_published, created_at
            FROM shops
            WHERE user_id = ?
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(owner)
        .fetch_all(self.store.pool())
        .await?;

        Ok(rows)
    }

    /// Count an owner's shops.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn count_by_owner(&self, owner: &ProfileId) -> Result<u32, LocalError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shops WHERE user_id = ?")
            .bind(owner)
            .fetch_one(self.store.pool())
            .await?;

        Ok(count_to_u32(count))
    }

    /// Insert or replace shops by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if any write fails; the batch is
    /// rolled back.
    pub async fn upsert_all(&self, rows: &[ShopEntity]) -> Result<(), LocalError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.store.pool().begin().await?;
        for row in rows {
            sqlx::query(UPSERT_SHOP)
                .bind(&row.id)
                .bind(&row.user_id)
                .bind(&row.name)
                .bind(&row.description)
                .bind(&row.logo_url)
                .bind(&row.primary_color)
                .bind(&row.font_family)
                .bind(&row.currency)
                .bind(&row.whatsapp_number)
                .bind(row.is_published)
                .bind(row.created_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.store.notify(&[Table::Shops]);
        Ok(())
    }

    /// Delete a shop; its categories and products go with it.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the delete fails.
    pub async fn delete(&self, id: &ShopId) -> Result<u64, LocalError> {
        let result = sqlx::query("DELETE FROM shops WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;

        self.store.notify(&[Table::Shops, Table::ShopCategories, Table::Products]);
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// List a shop's categories by `sort_order`.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn list_categories(
        &self,
        shop_id: &ShopId,
    ) -> Result<Vec<ShopCategoryEntity>, LocalError> {
        let rows = sqlx::query_as::<_, ShopCategoryEntity>(
            r"
            SELECT id, shop_id, name, sort_order, created_at
            FROM shop_categories
            WHERE shop_id = ?
            ORDER BY sort_order ASC, created_at ASC, id ASC
            ",
        )
        .bind(shop_id)
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
    pub async fn upsert_categories(&self, rows: &[ShopCategoryEntity]) -> Result<(), LocalError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.store.pool().begin().await?;
        for row in rows {
            sqlx::query(UPSERT_CATEGORY)
                .bind(&row.id)
                .bind(&row.shop_id)
                .bind(&row.name)
                .bind(row.sort_order)
                .bind(row.created_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.store.notify(&[Table::ShopCategories]);
        Ok(())
    }

    /// Delete a category. Its products stay, with `category_id` cleared.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the delete fails.
    pub async fn delete_category(&self, id: &ShopCategoryId) -> Result<u64, LocalError> {
        let result = sqlx::query("DELETE FROM shop_categories WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;

        self.store.notify(&[Table::ShopCategories, Table::Products]);
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn get_product(&self, id: &ProductId) -> Result<Option<ProductEntity>, LocalError> {
        let row = sqlx::query_as::<_, ProductEntity>(
            r"
            SELECT id, shop_id, category_id, name, description, price, image_url,
                   in_stock, sort_order, created_at
            FROM products
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.store.pool())
        .await?;

        Ok(row)
    }

    /// List a shop's products by `sort_order`.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the query fails.
    pub async fn list_products(&self, shop_id: &ShopId) -> Result<Vec<ProductEntity>, LocalError> {
        let rows = sqlx::query_as::<_, ProductEntity>(
            r"
            SELECT id, shop_id, category_id, name, description, price, image_url,
                   in_stock, sort_order, created_at
            FROM products
            WHERE shop_id = ?
            ORDER BY sort_order ASC, created_at ASC, id ASC
            ",
        )
        .bind(shop_id)
        .fetch_all(self.store.pool())
        .await?;

        Ok(rows)
    }

    /// Insert or replace products by id.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if any write fails; the batch is
    /// rolled back.
    pub async fn upsert_products(&self, rows: &[ProductEntity]) -> Result<(), LocalError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.store.pool().begin().await?;
        for row in rows {
            sqlx::query(UPSERT_PRODUCT)
                .bind(&row.id)
                .bind(&row.shop_id)
                .bind(&row.category_id)
                .bind(&row.name)
                .bind(&row.description)
                .bind(&row.price)
                .bind(&row.image_url)
                .bind(row.in_stock)
                .bind(row.sort_order)
                .bind(row.created_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.store.notify(&[Table::Products]);
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `LocalError::Database` if the delete fails.
    pub async fn delete_product(&self, id: &ProductId) -> Result<u64, LocalError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;

        self.store.notify(&[Table::Products]);
        Ok(result.rows_affected())
    }
}
