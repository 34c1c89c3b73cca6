//! Digital menu aggregate: Menu → MenuCategory → Dish.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{DishId, MenuCategoryId, MenuId, ProfileId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub id: MenuId,
    pub user_id: ProfileId,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    /// `#RRGGBB`
    pub primary_color: String,
    pub font_family: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuCategory {
    pub id: MenuCategoryId,
    pub menu_id: MenuId,
    pub name: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// A dish belongs to a menu and optionally to one of its categories.
///
/// Deleting the category keeps the dish with `category_id = None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    pub id: DishId,
    pub menu_id: MenuId,
    pub category_id: Option<MenuCategoryId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// A menu together with its child collections, each ordered by `sort_order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuDetails {
    pub menu: Menu,
    pub categories: Vec<MenuCategory>,
    pub dishes: Vec<Dish>,
}

impl MenuDetails {
    /// Dishes filed under `category`, in display order.
    pub fn dishes_in<'a>(&'a self, category: &'a MenuCategoryId) -> impl Iterator<Item = &'a Dish> {
        self.dishes
            .iter()
            .filter(move |d| d.category_id.as_ref() == Some(category))
    }

    /// Dishes without a category.
    pub fn uncategorized(&self) -> impl Iterator<Item = &Dish> {
        self.dishes.iter().filter(|d| d.category_id.is_none())
    }
}
