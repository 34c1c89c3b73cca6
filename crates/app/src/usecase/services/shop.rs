//! Shop editing.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, instrument};

use atomo_core::{
    Product, ProductId, ProfileId, ServiceType, Shop, ShopCategory, ShopCategoryId, ShopId,
};

use super::{DEFAULT_COLOR, DEFAULT_CURRENCY, DEFAULT_FONT};
use crate::error::UseCaseError;
use crate::remote::RemoteBackend;
use crate::repository::ShopRepository;
use crate::usecase::limits::CanCreateService;
use crate::usecase::validate;

/// Fields a user fills in for a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub shop_id: ShopId,
    pub category_id: Option<ShopCategoryId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub sort_order: i32,
}

#[derive(Clone)]
pub struct ShopService<R> {
    shops: ShopRepository<R>,
    gate: CanCreateService<R>,
}

impl<R: RemoteBackend + Clone> ShopService<R> {
    pub const fn new(shops: ShopRepository<R>, gate: CanCreateService<R>) -> Self {
        Self { shops, gate }
    }

    /// Create an unpublished shop priced in the default currency.
    ///
    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank name,
    /// `UseCaseError::LimitReached` if the owner's plan is used up, or
    /// `UseCaseError::Repository` if the write fails.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn create(&self, owner: &ProfileId, name: &str) -> Result<Shop, UseCaseError> {
        let name = validate::name("name", name)?;
        self.gate.ensure(owner, ServiceType::Shop).await?;

        let shop = Shop {
            id: ShopId::generate(),
            user_id: owner.clone(),
            name,
            description: None,
            logo_url: None,
            primary_color: DEFAULT_COLOR.to_owned(),
            font_family: DEFAULT_FONT.to_owned(),
            currency: DEFAULT_CURRENCY.to_owned(),
            whatsapp_number: None,
            is_published: false,
            created_at: Utc::now(),
        };

        let stored = self.shops.create(&shop).await?;
        info!(shop_id = %stored.id, "Shop created");
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank name, a bad color or a
    /// currency that is not a three-letter code, or
    /// `UseCaseError::Repository` if the write fails.
    pub async fn update(&self, shop: &Shop) -> Result<Shop, UseCaseError> {
        let mut shop = shop.clone();
        shop.name = validate::name("name", &shop.name)?;
        validate::hex_color("primary_color", &shop.primary_color)?;
        if shop.currency.len() != 3 || !shop.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(UseCaseError::invalid("currency", "expected an ISO 4217 code"));
        }

        Ok(self.shops.update(&shop).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Repository` if the delete fails.
    pub async fn delete(&self, id: &ShopId) -> Result<(), UseCaseError> {
        Ok(self.shops.delete(id).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank name, or
    /// `UseCaseError::Repository` if the write fails.
    pub async fn add_category(
        &self,
        shop_id: &ShopId,
        name: &str,
        sort_order: i32,
    ) -> Result<ShopCategory, UseCaseError> {
        let category = ShopCategory {
            id: ShopCategoryId::generate(),
            shop_id: shop_id.clone(),
            name: validate::name("name", name)?,
            sort_order,
            created_at: Utc::now(),
        };
        Ok(self.shops.create_category(&category).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank name, or
    /// `UseCaseError::Repository` if the write fails.
    pub async fn update_category(
        &self,
        category: &ShopCategory,
    ) -> Result<ShopCategory, UseCaseError> {
        let mut category = category.clone();
        category.name = validate::name("name", &category.name)?;
        Ok(self.shops.update_category(&category).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Repository` if the delete fails.
    pub async fn delete_category(&self, id: &ShopCategoryId) -> Result<(), UseCaseError> {
        Ok(self.shops.delete_category(id).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank name or a negative
    /// price, or `UseCaseError::Repository` if the write fails.
    pub async fn add_product(&self, new: NewProduct) -> Result<Product, UseCaseError> {
        validate::price("price", new.price)?;

        let product = Product {
            id: ProductId::generate(),
            shop_id: new.shop_id,
            category_id: new.category_id,
            name: validate::name("name", &new.name)?,
            description: new.description,
            price: new.price,
            image_url: new.image_url,
            in_stock: true,
            sort_order: new.sort_order,
            created_at: Utc::now(),
        };
        Ok(self.shops.create_product(&product).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank name or a negative
    /// price, or `UseCaseError::Repository` if the write fails.
    pub async fn update_product(&self, product: &Product) -> Result<Product, UseCaseError> {
        let mut product = product.clone();
        product.name = validate::name("name", &product.name)?;
        validate::price("price", product.price)?;
        Ok(self.shops.update_product(&product).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Repository` if the delete fails.
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), UseCaseError> {
        Ok(self.shops.delete_product(id).await?)
    }
}
