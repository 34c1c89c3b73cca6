//! Integration tests for Atomo.
//!
//! Every test runs against an in-memory `SQLite` cache and the in-memory
//! backend, so no network or database server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p atomo-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `repository_contract` - reads, writes, sync and cascade rules
//! - `limit_gate` - plan limits through the use cases
//! - `view_models` - dashboard and plan picker end to end

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use atomo_app::AppState;
use atomo_app::local::{LocalError, LocalStore, Table};
use atomo_app::remote::{MemoryBackend, MemoryStorage};
use atomo_core::{
    Dish, DishId, Menu, MenuCategory, MenuCategoryId, MenuId, Product, ProductId, ProfileId, Shop,
    ShopCategory, ShopCategoryId, ShopId,
};

/// Application state over fakes, plus handles to the fakes themselves.
pub struct TestContext {
    pub state: AppState<MemoryBackend, MemoryStorage>,
    pub backend: MemoryBackend,
    pub storage: MemoryStorage,
}

impl TestContext {
    /// A fresh in-memory cache and empty backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub async fn new() -> Result<Self, LocalError> {
        let local = LocalStore::in_memory().await?;
        let backend = MemoryBackend::new();
        let storage = MemoryStorage::default();

        Ok(Self {
            state: AppState::new(local, backend.clone(), storage.clone()),
            backend,
            storage,
        })
    }

    /// Put a row straight into the backend, bypassing the cache.
    pub async fn seed_remote(&self, table: Table, row: JsonValue) {
        self.backend.seed(table, row).await;
    }
}

/// Owner used throughout the tests.
#[must_use]
pub fn owner() -> ProfileId {
    ProfileId::new("user_1")
}

/// A fixed instant, so values survive storage round trips unchanged.
#[must_use]
pub fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, day.clamp(1, 28), 12, 0, 0)
        .single()
        .unwrap_or_default()
}

#[must_use]
pub fn menu(id: &str, name: &str) -> Menu {
    Menu {
        id: MenuId::new(id),
        user_id: owner(),
        name: name.to_owned(),
        description: None,
        logo_url: None,
        primary_color: "#1E293B".to_owned(),
        font_family: "Inter".to_owned(),
        is_published: false,
        created_at: at(1),
    }
}

#[must_use]
pub fn menu_category(id: &str, menu_id: &MenuId, sort_order: i32) -> MenuCategory {
    MenuCategory {
        id: MenuCategoryId::new(id),
        menu_id: menu_id.clone(),
        name: format!("Category {id}"),
        sort_order,
        created_at: at(2),
    }
}

#[must_use]
pub fn dish(id: &str, menu_id: &MenuId, sort_order: i32) -> Dish {
    Dish {
        id: DishId::new(id),
        menu_id: menu_id.clone(),
        category_id: None,
        name: format!("Dish {id}"),
        description: None,
        price: Decimal::new(1250, 2),
        image_url: None,
        is_available: true,
        sort_order,
        created_at: at(2),
    }
}

#[must_use]
pub fn shop(id: &str, name: &str) -> Shop {
    Shop {
        id: ShopId::new(id),
        user_id: owner(),
        name: name.to_owned(),
        description: None,
        logo_url: None,
        primary_color: "#1E293B".to_owned(),
        font_family: "Inter".to_owned(),
        currency: "USD".to_owned(),
        whatsapp_number: None,
        is_published: false,
        created_at: at(1),
    }
}

#[must_use]
pub fn shop_category(id: &str, shop_id: &ShopId) -> ShopCategory {
    ShopCategory {
        id: ShopCategoryId::new(id),
        shop_id: shop_id.clone(),
        name: format!("Category {id}"),
        sort_order: 0,
        created_at: at(2),
    }
}

#[must_use]
pub fn product(id: &str, shop_id: &ShopId, category: Option<&ShopCategoryId>) -> Product {
    Product {
        id: ProductId::new(id),
        shop_id: shop_id.clone(),
        category_id: category.cloned(),
        name: format!("Product {id}"),
        description: None,
        price: Decimal::new(500, 2),
        image_url: None,
        in_stock: true,
        sort_order: 0,
        created_at: at(2),
    }
}
