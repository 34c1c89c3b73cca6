use atomo_core::{Dish, Menu, MenuCategory};

use super::parse_decimal;
use crate::error::RepositoryError;
use crate::local::entities::{DishEntity, MenuCategoryEntity, MenuEntity};
use crate::remote::dto::{DishDto, MenuCategoryDto, MenuDto};

// =============================================================================
// Menu
// =============================================================================

impl From<MenuDto> for Menu {
    fn from(dto: MenuDto) -> Self {
        Self {
            id: dto.id,
            user_id: dto.user_id,
            name: dto.name,
            description: dto.description,
            logo_url: dto.logo_url,
            primary_color: dto.primary_color,
            font_family: dto.font_family,
            is_published: dto.is_published,
            created_at: dto.created_at,
        }
    }
}

impl From<&Menu> for MenuDto {
    fn from(menu: &Menu) -> Self {
        Self {
            id: menu.id.clone(),
            user_id: menu.user_id.clone(),
            name: menu.name.clone(),
            description: menu.description.clone(),
            logo_url: menu.logo_url.clone(),
            primary_color: menu.primary_color.clone(),
            font_family: menu.font_family.clone(),
            is_published: menu.is_published,
            created_at: menu.created_at,
        }
    }
}

impl From<&Menu> for MenuEntity {
    fn from(menu: &Menu) -> Self {
        Self {
            id: menu.id.clone(),
            user_id: menu.user_id.clone(),
            name: menu.name.clone(),
            description: menu.description.clone(),
            logo_url: menu.logo_url.clone(),
            primary_color: menu.primary_color.clone(),
            font_family: menu.font_family.clone(),
            is_published: menu.is_published,
            created_at: menu.created_at,
        }
    }
}

impl From<MenuEntity> for Menu {
    fn from(row: MenuEntity) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            logo_url: row.logo_url,
            primary_color: row.primary_color,
            font_family: row.font_family,
            is_published: row.is_published,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// MenuCategory
// =============================================================================

impl From<MenuCategoryDto> for MenuCategory {
    fn from(dto: MenuCategoryDto) -> Self {
        Self {
            id: dto.id,
            menu_id: dto.menu_id,
            name: dto.name,
            sort_order: dto.sort_order,
            created_at: dto.created_at,
        }
    }
}

impl From<&MenuCategory> for MenuCategoryDto {
    fn from(category: &MenuCategory) -> Self {
        Self {
            id: category.id.clone(),
            menu_id: category.menu_id.clone(),
            name: category.name.clone(),
            sort_order: category.sort_order,
            created_at: category.created_at,
        }
    }
}

impl From<&MenuCategory> for MenuCategoryEntity {
    fn from(category: &MenuCategory) -> Self {
        Self {
            id: category.id.clone(),
            menu_id: category.menu_id.clone(),
            name: category.name.clone(),
            sort_order: category.sort_order,
            created_at: category.created_at,
        }
    }
}

impl From<MenuCategoryEntity> for MenuCategory {
    fn from(row: MenuCategoryEntity) -> Self {
        Self {
            id: row.id,
            menu_id: row.menu_id,
            name: row.name,
            sort_order: row.sort_order,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Dish
// =============================================================================

impl From<DishDto> for Dish {
    fn from(dto: DishDto) -> Self {
        Self {
            id: dto.id,
            menu_id: dto.menu_id,
            category_id: dto.category_id,
            name: dto.name,
            description: dto.description,
            price: dto.price,
            image_url: dto.image_url,
            is_available: dto.is_available,
            sort_order: dto.sort_order,
            created_at: dto.created_at,
        }
    }
}

impl From<&Dish> for DishDto {
    fn from(dish: &Dish) -> Self {
        Self {
            id: dish.id.clone(),
            menu_id: dish.menu_id.clone(),
            category_id: dish.category_id.clone(),
            name: dish.name.clone(),
            description: dish.description.clone(),
            price: dish.price,
            image_url: dish.image_url.clone(),
            is_available: dish.is_available,
            sort_order: dish.sort_order,
            created_at: dish.created_at,
        }
    }
}

impl From<&Dish> for DishEntity {
    fn from(dish: &Dish) -> Self {
        Self {
            id: dish.id.clone(),
            menu_id: dish.menu_id.clone(),
            category_id: dish.category_id.clone(),
            name: dish.name.clone(),
            description: dish.description.clone(),
            price: dish.price.to_string(),
            image_url: dish.image_url.clone(),
            is_available: dish.is_available,
            sort_order: dish.sort_order,
            created_at: dish.created_at,
        }
    }
}

impl TryFrom<DishEntity> for Dish {
    type Error = RepositoryError;

    fn try_from(row: DishEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            price: parse_decimal("dish price", &row.price)?,
            id: row.id,
            menu_id: row.menu_id,
            category_id: row.category_id,
            name: row.name,
            description: row.description,
            image_url: row.image_url,
            is_available: row.is_available,
            sort_order: row.sort_order,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use atomo_core::{DishId, MenuCategoryId, MenuId};

    use super::*;

    fn dish() -> Dish {
        Dish {
            id: DishId::new("d1"),
            menu_id: MenuId::new("m1"),
            category_id: Some(MenuCategoryId::new("c1")),
            name: "Ceviche".to_string(),
            description: None,
            price: Decimal::new(1250, 2),
            image_url: None,
            is_available: true,
            sort_order: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_dish_price_is_stored_as_exact_text() {
        let original = dish();
        let row = DishEntity::from(&original);
        assert_eq!(row.price, "12.50");
        assert_eq!(Dish::try_from(row).unwrap(), original);
    }

    #[test]
    fn test_corrupt_dish_price_is_reported() {
        let mut row = DishEntity::from(&dish());
        row.price = "n/a".to_string();
        assert!(matches!(
            Dish::try_from(row),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
