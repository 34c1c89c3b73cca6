//! Shop repository: shops with their categories and products.

use futures::Stream;
use tracing::{info, instrument, warn};

use atomo_core::{
    Product, ProductId, ProfileId, Shop, ShopCategory, ShopCategoryId, ShopDetails, ShopId,
};

use super::watch_tables;
use crate::conversions::try_convert_all;
use crate::error::RepositoryError;
use crate::local::dao::ShopDao;
use crate::local::entities::{ProductEntity, ShopCategoryEntity, ShopEntity};
use crate::local::{LocalStore, Table};
use crate::remote::dto::{ProductDto, ShopCategoryDto, ShopDto};
use crate::remote::{self, Filter, RemoteBackend};

const TABLES: &[Table] = &[Table::Shops, Table::ShopCategories, Table::Products];

/// Local-first access to shops.
#[derive(Clone)]
pub struct ShopRepository<R> {
    local: LocalStore,
    remote: R,
}

impl<R: RemoteBackend + Clone> ShopRepository<R> {
    pub const fn new(local: LocalStore, remote: R) -> Self {
        Self { local, remote }
    }

    fn dao(&self) -> ShopDao<'_> {
        ShopDao::new(&self.local)
    }

    /// A cached shop with its categories and products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Local` if a query fails, or
    /// `RepositoryError::DataCorruption` if a cached price does not parse.
    pub async fn get(&self, id: &ShopId) -> Result<Option<ShopDetails>, RepositoryError> {
        match self.dao().get(id).await? {
            Some(row) => Ok(Some(load_details(&self.local, row).await?)),
            None => Ok(None),
        }
    }

    /// A single cached product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the row is corrupt.
    pub async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        self.dao()
            .get_product(id)
            .await?
            .map(Product::try_from)
            .transpose()
    }

    /// The owner's cached shops, without children.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Local` if the query fails.
    pub async fn list(&self, owner: &ProfileId) -> Result<Vec<Shop>, RepositoryError> {
        let rows = self.dao().list_by_owner(owner).await?;
        Ok(rows.into_iter().map(Shop::from).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Local` if the query fails.
    pub async fn count(&self, owner: &ProfileId) -> Result<u32, RepositoryError> {
        Ok(self.dao().count_by_owner(owner).await?)
    }

    /// Every shop the owner has, re-emitted on any shop, category or
    /// product change.
    pub fn observe(&self, owner: &ProfileId) -> impl Stream<Item = Vec<ShopDetails>> + Send + 'static {
        let store = self.local.clone();
        let owner = owner.clone();

        watch_tables(&self.local, TABLES, move || {
            let store = store.clone();
            let owner = owner.clone();
            async move {
                load_all(&store, &owner).await.unwrap_or_else(|e| {
                    warn!(error = %e, owner = %owner, "Failed to load shops");
                    Vec::new()
                })
            }
        })
    }

    // =========================================================================
    // Shop writes
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, shop), fields(shop_id = %shop.id))]
    pub async fn create(&self, shop: &Shop) -> Result<Shop, RepositoryError> {
        let stored: Shop = remote::insert(&self.remote, Table::Shops, &ShopDto::from(shop))
            .await?
            .into();
        self.dao().upsert_all(&[ShopEntity::from(&stored)]).await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, shop), fields(shop_id = %shop.id))]
    pub async fn update(&self, shop: &Shop) -> Result<Shop, RepositoryError> {
        let stored: Shop =
            remote::update(&self.remote, Table::Shops, shop.id.as_str(), &ShopDto::from(shop))
                .await?
                .into();
        self.dao().upsert_all(&[ShopEntity::from(&stored)]).await?;
        Ok(stored)
    }

    /// Delete a shop together with its categories and products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &ShopId) -> Result<(), RepositoryError> {
        remote::delete(&self.remote, Table::Shops, id.as_str()).await?;
        self.dao().delete(id).await?;
        Ok(())
    }

    // =========================================================================
    // Category writes
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, category), fields(category_id = %category.id, shop_id = %category.shop_id))]
    pub async fn create_category(
        &self,
        category: &ShopCategory,
    ) -> Result<ShopCategory, RepositoryError> {
        let stored: ShopCategory = remote::insert(
            &self.remote,
            Table::ShopCategories,
            &ShopCategoryDto::from(category),
        )
        .await?
        .into();
        self.dao()
            .upsert_categories(&[ShopCategoryEntity::from(&stored)])
            .await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, category), fields(category_id = %category.id))]
    pub async fn update_category(
        &self,
        category: &ShopCategory,
    ) -> Result<ShopCategory, RepositoryError> {
        let stored: ShopCategory = remote::update(
            &self.remote,
            Table::ShopCategories,
            category.id.as_str(),
            &ShopCategoryDto::from(category),
        )
        .await?
        .into();
        self.dao()
            .upsert_categories(&[ShopCategoryEntity::from(&stored)])
            .await?;
        Ok(stored)
    }

    /// Delete a category. Its products stay in the shop, uncategorized.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: &ShopCategoryId) -> Result<(), RepositoryError> {
        remote::delete(&self.remote, Table::ShopCategories, id.as_str()).await?;
        self.dao().delete_category(id).await?;
        Ok(())
    }

    // =========================================================================
    // Product writes
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, product), fields(product_id = %product.id, shop_id = %product.shop_id))]
    pub async fn create_product(&self, product: &Product) -> Result<Product, RepositoryError> {
        let stored: Product =
            remote::insert(&self.remote, Table::Products, &ProductDto::from(product))
                .await?
                .into();
        self.dao()
            .upsert_products(&[ProductEntity::from(&stored)])
            .await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn update_product(&self, product: &Product) -> Result<Product, RepositoryError> {
        let stored: Product = remote::update(
            &self.remote,
            Table::Products,
            product.id.as_str(),
            &ProductDto::from(product),
        )
        .await?
        .into();
        self.dao()
            .upsert_products(&[ProductEntity::from(&stored)])
            .await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), RepositoryError> {
        remote::delete(&self.remote, Table::Products, id.as_str()).await?;
        self.dao().delete_product(id).await?;
        Ok(())
    }

    // =========================================================================
    // Sync
    // =========================================================================

    /// Pull the owner's shops, then each shop's categories and products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on the first failed pull or cache write.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn sync(&self, owner: &ProfileId) -> Result<Vec<Shop>, RepositoryError> {
        let dtos: Vec<ShopDto> =
            remote::fetch(&self.remote, Table::Shops, &[Filter::eq("user_id", owner)]).await?;
        let shops: Vec<Shop> = dtos.into_iter().map(Shop::from).collect();

        let rows: Vec<ShopEntity> = shops.iter().map(ShopEntity::from).collect();
        self.dao().upsert_all(&rows).await?;

        let mut category_count = 0usize;
        let mut product_count = 0usize;

        for shop in &shops {
            let by_shop = [Filter::eq("shop_id", &shop.id)];

            let categories: Vec<ShopCategoryDto> =
                remote::fetch(&self.remote, Table::ShopCategories, &by_shop).await?;
            let rows: Vec<ShopCategoryEntity> = categories
                .into_iter()
                .map(|dto| ShopCategoryEntity::from(&ShopCategory::from(dto)))
                .collect();
            category_count += rows.len();
            self.dao().upsert_categories(&rows).await?;

            let products: Vec<ProductDto> =
                remote::fetch(&self.remote, Table::Products, &by_shop).await?;
            let rows: Vec<ProductEntity> = products
                .into_iter()
                .map(|dto| ProductEntity::from(&Product::from(dto)))
                .collect();
            product_count += rows.len();
            self.dao().upsert_products(&rows).await?;
        }

        info!(
            shops = shops.len(),
            categories = category_count,
            products = product_count,
            "Synced shops"
        );
        Ok(shops)
    }
}

async fn load_details(store: &LocalStore, row: ShopEntity) -> Result<ShopDetails, RepositoryError> {
    let dao = ShopDao::new(store);
    let categories = dao.list_categories(&row.id).await?;
    let products = try_convert_all(dao.list_products(&row.id).await?)?;

    Ok(ShopDetails {
        shop: Shop::from(row),
        categories: categories.into_iter().map(ShopCategory::from).collect(),
        products,
    })
}

async fn load_all(store: &LocalStore, owner: &ProfileId) -> Result<Vec<ShopDetails>, RepositoryError> {
    let rows = ShopDao::new(store).list_by_owner(owner).await?;

    let mut all = Vec::with_capacity(rows.len());
    for row in rows {
        all.push(load_details(store, row).await?);
    }
    Ok(all)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;
    use crate::remote::MemoryBackend;

    async fn repository() -> (ShopRepository<MemoryBackend>, MemoryBackend) {
        let store = LocalStore::in_memory().await.unwrap();
        let backend = MemoryBackend::new();
        (ShopRepository::new(store, backend.clone()), backend)
    }

    fn shop() -> Shop {
        Shop {
            id: ShopId::generate(),
            user_id: ProfileId::new("user_1"),
            name: "Corner store".to_string(),
            description: None,
            logo_url: None,
            primary_color: "#000000".to_string(),
            font_family: "Inter".to_string(),
            currency: "USD".to_string(),
            whatsapp_number: None,
            is_published: true,
            created_at: Utc::now(),
        }
    }

    fn category(shop: &Shop) -> ShopCategory {
        ShopCategory {
            id: ShopCategoryId::generate(),
            shop_id: shop.id.clone(),
            name: "Drinks".to_string(),
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    fn product(shop: &Shop, category: Option<&ShopCategory>) -> Product {
        Product {
            id: ProductId::generate(),
            shop_id: shop.id.clone(),
            category_id: category.map(|c| c.id.clone()),
            name: "Lemonade".to_string(),
            description: None,
            price: Decimal::new(300, 2),
            image_url: None,
            in_stock: true,
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_deleting_category_keeps_product_uncategorized() {
        let (repo, _) = repository().await;
        let shop = shop();
        let category = category(&shop);
        let product = product(&shop, Some(&category));
        repo.create(&shop).await.unwrap();
        repo.create_category(&category).await.unwrap();
        repo.create_product(&product).await.unwrap();

        repo.delete_category(&category.id).await.unwrap();

        let kept = repo.get_product(&product.id).await.unwrap().unwrap();
        assert_eq!(kept.category_id, None);
    }

    #[tokio::test]
    async fn test_deleting_shop_removes_children() {
        let (repo, _) = repository().await;
        let shop = shop();
        let product = product(&shop, None);
        repo.create(&shop).await.unwrap();
        repo.create_product(&product).await.unwrap();

        repo.delete(&shop.id).await.unwrap();

        assert!(repo.get(&shop.id).await.unwrap().is_none());
        assert!(repo.get_product(&product.id).await.unwrap().is_none());
        assert_eq!(repo.count(&shop.user_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sync_overwrites_local_changes() {
        let (repo, backend) = repository().await;
        let shop = shop();
        repo.create(&shop).await.unwrap();

        let mut renamed = shop.clone();
        renamed.name = "Renamed remotely".to_string();
        backend
            .seed(Table::Shops, serde_json::to_value(ShopDto::from(&renamed)).unwrap())
            .await;

        repo.sync(&shop.user_id).await.unwrap();

        let details = repo.get(&shop.id).await.unwrap().unwrap();
        assert_eq!(details.shop.name, "Renamed remotely");
    }
}
