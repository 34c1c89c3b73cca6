//! Portfolio editing.

use chrono::Utc;
use tracing::{info, instrument};

use atomo_core::{Portfolio, PortfolioId, PortfolioItem, PortfolioItemId, ProfileId, ServiceType};

use super::{DEFAULT_COLOR, DEFAULT_FONT};
use crate::error::UseCaseError;
use crate::remote::RemoteBackend;
use crate::repository::PortfolioRepository;
use crate::usecase::limits::CanCreateService;
use crate::usecase::validate;

#[derive(Debug, Clone)]
pub struct NewPortfolioItem {
    pub portfolio_id: PortfolioId,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub sort_order: i32,
}

#[derive(Clone)]
pub struct PortfolioService<R> {
    portfolios: PortfolioRepository<R>,
    gate: CanCreateService<R>,
}

impl<R: RemoteBackend + Clone> PortfolioService<R> {
    pub const fn new(portfolios: PortfolioRepository<R>, gate: CanCreateService<R>) -> Self {
        Self { portfolios, gate }
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank title,
    /// `UseCaseError::LimitReached` if the owner's plan is used up, or
    /// `UseCaseError::Repository` if the write fails.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn create(&self, owner: &ProfileId, title: &str) -> Result<Portfolio, UseCaseError> {
        let title = validate::name("title", title)?;
        self.gate.ensure(owner, ServiceType::Portfolio).await?;

        let portfolio = Portfolio {
            id: PortfolioId::generate(),
            user_id: owner.clone(),
            title,
            description: None,
            cover_image_url: None,
            primary_color: DEFAULT_COLOR.to_owned(),
            font_family: DEFAULT_FONT.to_owned(),
            created_at: Utc::now(),
        };

        let stored = self.portfolios.create(&portfolio).await?;
        info!(portfolio_id = %stored.id, "Portfolio created");
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank title or a bad color,
    /// or `UseCaseError::Repository` if the write fails.
    pub async fn update(&self, portfolio: &Portfolio) -> Result<Portfolio, UseCaseError> {
        let mut portfolio = portfolio.clone();
        portfolio.title = validate::name("title", &portfolio.title)?;
        validate::hex_color("primary_color", &portfolio.primary_color)?;
        Ok(self.portfolios.update(&portfolio).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Repository` if the delete fails.
    pub async fn delete(&self, id: &PortfolioId) -> Result<(), UseCaseError> {
        Ok(self.portfolios.delete(id).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank title, or
    /// `UseCaseError::Repository` if the write fails.
    pub async fn add_item(&self, new: NewPortfolioItem) -> Result<PortfolioItem, UseCaseError> {
        let item = PortfolioItem {
            id: PortfolioItemId::generate(),
            portfolio_id: new.portfolio_id,
            title: validate::name("title", &new.title)?,
            description: new.description,
            image_url: new.image_url,
            link_url: new.link_url,
            sort_order: new.sort_order,
            created_at: Utc::now(),
        };
        Ok(self.portfolios.create_item(&item).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank title, or
    /// `UseCaseError::Repository` if the write fails.
    pub async fn update_item(&self, item: &PortfolioItem) -> Result<PortfolioItem, UseCaseError> {
        let mut item = item.clone();
        item.title = validate::name("title", &item.title)?;
        Ok(self.portfolios.update_item(&item).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Repository` if the delete fails.
    pub async fn delete_item(&self, id: &PortfolioItemId) -> Result<(), UseCaseError> {
        Ok(self.portfolios.delete_item(id).await?)
    }
}
