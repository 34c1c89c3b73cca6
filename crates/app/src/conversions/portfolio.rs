use atomo_core::{Portfolio, PortfolioItem};

use crate::local::entities::{PortfolioEntity, PortfolioItemEntity};
use crate::remote::dto::{PortfolioDto, PortfolioItemDto};

impl From<PortfolioDto> for Portfolio {
    fn from(dto: PortfolioDto) -> Self {
        Self {
            id: dto.id,
            user_id: dto.user_id,
            title: dto.title,
            description: dto.description,
            cover_image_url: dto.cover_image_url,
            primary_color: dto.primary_color,
            font_family: dto.font_family,
            created_at: dto.created_at,
        }
    }
}

impl From<&Portfolio> for PortfolioDto {
    fn from(portfolio: &Portfolio) -> Self {
        Self {
            id: portfolio.id.clone(),
            user_id: portfolio.user_id.clone(),
            title: portfolio.title.clone(),
            description: portfolio.description.clone(),
            cover_image_url: portfolio.cover_image_url.clone(),
            primary_color: portfolio.primary_color.clone(),
            font_family: portfolio.font_family.clone(),
            created_at: portfolio.created_at,
        }
    }
}

impl From<&Portfolio> for PortfolioEntity {
    fn from(portfolio: &Portfolio) -> Self {
        Self {
            id: portfolio.id.clone(),
            user_id: portfolio.user_id.clone(),
            title: portfolio.title.clone(),
            description: portfolio.description.clone(),
            cover_image_url: portfolio.cover_image_url.clone(),
            primary_color: portfolio.primary_color.clone(),
            font_family: portfolio.font_family.clone(),
            created_at: portfolio.created_at,
        }
    }
}

impl From<PortfolioEntity> for Portfolio {
    fn from(row: PortfolioEntity) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            cover_image_url: row.cover_image_url,
            primary_color: row.primary_color,
            font_family: row.font_family,
            created_at: row.created_at,
        }
    }
}

impl From<PortfolioItemDto> for PortfolioItem {
    fn from(dto: PortfolioItemDto) -> Self {
        Self {
            id: dto.id,
            portfolio_id: dto.portfolio_id,
            title: dto.title,
            description: dto.description,
            image_url: dto.image_url,
            link_url: dto.link_url,
            sort_order: dto.sort_order,
            created_at: dto.created_at,
        }
    }
}

impl From<&PortfolioItem> for PortfolioItemDto {
    fn from(item: &PortfolioItem) -> Self {
        Self {
            id: item.id.clone(),
            portfolio_id: item.portfolio_id.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            image_url: item.image_url.clone(),
            link_url: item.link_url.clone(),
            sort_order: item.sort_order,
            created_at: item.created_at,
        }
    }
}

impl From<&PortfolioItem> for PortfolioItemEntity {
    fn from(item: &PortfolioItem) -> Self {
        Self {
            id: item.id.clone(),
            portfolio_id: item.portfolio_id.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            image_url: item.image_url.clone(),
            link_url: item.link_url.clone(),
            sort_order: item.sort_order,
            created_at: item.created_at,
        }
    }
}

impl From<PortfolioItemEntity> for PortfolioItem {
    fn from(row: PortfolioItemEntity) -> Self {
        Self {
            id: row.id,
            portfolio_id: row.portfolio_id,
            title: row.title,
            description: row.description,
            image_url: row.image_url,
            link_url: row.link_url,
            sort_order: row.sort_order,
            created_at: row.created_at,
        }
    }
}
