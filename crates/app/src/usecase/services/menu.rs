//! Menu editing.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, instrument};

use atomo_core::{
    Dish, DishId, Menu, MenuCategory, MenuCategoryId, MenuId, ProfileId, ServiceType,
};

use super::{DEFAULT_COLOR, DEFAULT_FONT};
use crate::error::UseCaseError;
use crate::remote::RemoteBackend;
use crate::repository::MenuRepository;
use crate::usecase::limits::CanCreateService;
use crate::usecase::validate;

/// Fields a user fills in for a new dish.
#[derive(Debug, Clone)]
pub struct NewDish {
    pub menu_id: MenuId,
    pub category_id: Option<MenuCategoryId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub sort_order: i32,
}

#[derive(Clone)]
pub struct MenuService<R> {
    menus: MenuRepository<R>,
    gate: CanCreateService<R>,
}

impl<R: RemoteBackend + Clone> MenuService<R> {
    pub const fn new(menus: MenuRepository<R>, gate: CanCreateService<R>) -> Self {
        Self { menus, gate }
    }

    /// Create an unpublished menu with default styling.
    ///
    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank name,
    /// `UseCaseError::LimitReached` if the owner's plan is used up, or
    /// `UseCaseError::Repository` if the write fails.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn create(&self, owner: &ProfileId, name: &str) -> Result<Menu, UseCaseError> {
        let name = validate::name("name", name)?;
        self.gate.ensure(owner, ServiceType::Menu).await?;

        let menu = Menu {
            id: MenuId::generate(),
            user_id: owner.clone(),
            name,
            description: None,
            logo_url: None,
            primary_color: DEFAULT_COLOR.to_owned(),
            font_family: DEFAULT_FONT.to_owned(),
            is_published: false,
            created_at: Utc::now(),
        };

        let stored = self.menus.create(&menu).await?;
        info!(menu_id = %stored.id, "Menu created");
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank name or a bad color,
    /// or `UseCaseError::Repository` if the write fails.
    pub async fn update(&self, menu: &Menu) -> Result<Menu, UseCaseError> {
        let mut menu = menu.clone();
        menu.name = validate::name("name", &menu.name)?;
        validate::hex_color("primary_color", &menu.primary_color)?;

        Ok(self.menus.update(&menu).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Repository` if the delete fails.
    pub async fn delete(&self, id: &MenuId) -> Result<(), UseCaseError> {
        Ok(self.menus.delete(id).await?)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank name, or
    /// `UseCaseError::Repository` if the write fails.
    pub async fn add_category(
        &self,
        menu_id: &MenuId,
        name: &str,
        sort_order: i32,
    ) -> Result<MenuCategory, UseCaseError> {
        let category = MenuCategory {
            id: MenuCategoryId::generate(),
            menu_id: menu_id.clone(),
            name: validate::name("name", name)?,
            sort_order,
            created_at: Utc::now(),
        };
        Ok(self.menus.create_category(&category).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank name, or
    /// `UseCaseError::Repository` if the write fails.
    pub async fn update_category(
        &self,
        category: &MenuCategory,
    ) -> Result<MenuCategory, UseCaseError> {
        let mut category = category.clone();
        category.name = validate::name("name", &category.name)?;
        Ok(self.menus.update_category(&category).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Repository` if the delete fails.
    pub async fn delete_category(&self, id: &MenuCategoryId) -> Result<(), UseCaseError> {
        Ok(self.menus.delete_category(id).await?)
    }

    // =========================================================================
    // Dishes
    // =========================================================================

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank name or a negative
    /// price, or `UseCaseError::Repository` if the write fails.
    pub async fn add_dish(&self, new: NewDish) -> Result<Dish, UseCaseError> {
        validate::price("price", new.price)?;

        let dish = Dish {
            id: DishId::generate(),
            menu_id: new.menu_id,
            category_id: new.category_id,
            name: validate::name("name", &new.name)?,
            description: new.description,
            price: new.price,
            image_url: new.image_url,
            is_available: true,
            sort_order: new.sort_order,
            created_at: Utc::now(),
        };
        Ok(self.menus.create_dish(&dish).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank name or a negative
    /// price, or `UseCaseError::Repository` if the write fails.
    pub async fn update_dish(&self, dish: &Dish) -> Result<Dish, UseCaseError> {
        let mut dish = dish.clone();
        dish.name = validate::name("name", &dish.name)?;
        validate::price("price", dish.price)?;
        Ok(self.menus.update_dish(&dish).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Repository` if the delete fails.
    pub async fn delete_dish(&self, id: &DishId) -> Result<(), UseCaseError> {
        Ok(self.menus.delete_dish(id).await?)
    }
}
