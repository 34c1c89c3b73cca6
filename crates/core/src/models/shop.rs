//! Shop aggregate: Shop → ShopCategory → Product.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, ProfileId, ShopCategoryId, ShopId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub user_id: ProfileId,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub font_family: String,
    /// ISO 4217 code, e.g. `USD`.
    pub currency: String,
    /// Orders are placed through a chat link when set.
    pub whatsapp_number: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopCategory {
    pub id: ShopCategoryId,
    pub shop_id: ShopId,
    pub name: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub shop_id: ShopId,
    pub category_id: Option<ShopCategoryId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub in_stock: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopDetails {
    pub shop: Shop,
    pub categories: Vec<ShopCategory>,
    pub products: Vec<Product>,
}
