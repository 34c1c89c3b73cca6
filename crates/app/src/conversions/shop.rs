use atomo_core::{Product, Shop, ShopCategory};

use super::parse_decimal;
use crate::error::RepositoryError;
use crate::local::entities::{ProductEntity, ShopCategoryEntity, ShopEntity};
use crate::remote::dto::{ProductDto, ShopCategoryDto, ShopDto};

// =============================================================================
// Shop
// =============================================================================

impl From<ShopDto> for Shop {
    fn from(dto: ShopDto) -> Self {
        Self {
            id: dto.id,
            user_id: dto.user_id,
            name: dto.name,
            description: dto.description,
            logo_url: dto.logo_url,
            primary_color: dto.primary_color,
            font_family: dto.font_family,
            currency: dto.currency,
            whatsapp_number: dto.whatsapp_number,
            is_published: dto.is_published,
            created_at: dto.created_at,
        }
    }
}

impl From<&Shop> for ShopDto {
    fn from(shop: &Shop) -> Self {
        Self {
            id: shop.id.clone(),
            user_id: shop.user_id.clone(),
            name: shop.name.clone(),
            description: shop.description.clone(),
            logo_url: shop.logo_url.clone(),
            primary_color: shop.primary_color.clone(),
            font_family: shop.font_family.clone(),
            currency: shop.currency.clone(),
            whatsapp_number: shop.whatsapp_number.clone(),
            is_published: shop.is_published,
            created_at: shop.created_at,
        }
    }
}

impl From<&Shop> for ShopEntity {
    fn from(shop: &Shop) -> Self {
        Self {
            id: shop.id.clone(),
            user_id: shop.user_id.clone(),
            name: shop.name.clone(),
            description: shop.description.clone(),
            logo_url: shop.logo_url.clone(),
            primary_color: shop.primary_color.clone(),
            font_family: shop.font_family.clone(),
            currency: shop.currency.clone(),
            whatsapp_number: shop.whatsapp_number.clone(),
            is_published: shop.is_published,
            created_at: shop.created_at,
        }
    }
}

impl From<ShopEntity> for Shop {
    fn from(row: ShopEntity) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            logo_url: row.logo_url,
            primary_color: row.primary_color,
            font_family: row.font_family,
            currency: row.currency,
            whatsapp_number: row.whatsapp_number,
            is_published: row.is_published,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// ShopCategory
// =============================================================================

impl From<ShopCategoryDto> for ShopCategory {
    fn from(dto: ShopCategoryDto) -> Self {
        Self {
            id: dto.id,
            shop_id: dto.shop_id,
            name: dto.name,
            sort_order: dto.sort_order,
            created_at: dto.created_at,
        }
    }
}

impl From<&ShopCategory> for ShopCategoryDto {
    fn from(category: &ShopCategory) -> Self {
        Self {
            id: category.id.clone(),
            shop_id: category.shop_id.clone(),
            name: category.name.clone(),
            sort_order: category.sort_order,
            created_at: category.created_at,
        }
    }
}

impl From<&ShopCategory> for ShopCategoryEntity {
    fn from(category: &ShopCategory) -> Self {
        Self {
            id: category.id.clone(),
            shop_id: category.shop_id.clone(),
            name: category.name.clone(),
            sort_order: category.sort_order,
            created_at: category.created_at,
        }
    }
}

impl From<ShopCategoryEntity> for ShopCategory {
    fn from(row: ShopCategoryEntity) -> Self {
        Self {
            id: row.id,
            shop_id: row.shop_id,
            name: row.name,
            sort_order: row.sort_order,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

impl From<ProductDto> for Product {
    fn from(dto: ProductDto) -> Self {
        Self {
            id: dto.id,
            shop_id: dto.shop_id,
            category_id: dto.category_id,
            name: dto.name,
            description: dto.description,
            price: dto.price,
            image_url: dto.image_url,
            in_stock: dto.in_stock,
            sort_order: dto.sort_order,
            created_at: dto.created_at,
        }
    }
}

impl From<&Product> for ProductDto {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            shop_id: product.shop_id.clone(),
            category_id: product.category_id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            in_stock: product.in_stock,
            sort_order: product.sort_order,
            created_at: product.created_at,
        }
    }
}

impl From<&Product> for ProductEntity {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            shop_id: product.shop_id.clone(),
            category_id: product.category_id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            image_url: product.image_url.clone(),
            in_stock: product.in_stock,
            sort_order: product.sort_order,
            created_at: product.created_at,
        }
    }
}

impl TryFrom<ProductEntity> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            price: parse_decimal("product price", &row.price)?,
            id: row.id,
            shop_id: row.shop_id,
            category_id: row.category_id,
            name: row.name,
            description: row.description,
            image_url: row.image_url,
            in_stock: row.in_stock,
            sort_order: row.sort_order,
            created_at: row.created_at,
        })
    }
}
