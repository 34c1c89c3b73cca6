//! Portfolio repository: portfolios with their items.

use futures::Stream;
use tracing::{info, instrument, warn};

use atomo_core::{Portfolio, PortfolioDetails, PortfolioId, PortfolioItem, PortfolioItemId, ProfileId};

use super::watch_tables;
use crate::error::RepositoryError;
use crate::local::dao::PortfolioDao;
use crate::local::entities::{PortfolioEntity, PortfolioItemEntity};
use crate::local::{LocalStore, Table};
use crate::remote::dto::{PortfolioDto, PortfolioItemDto};
use crate::remote::{self, Filter, RemoteBackend};

const TABLES: &[Table] = &[Table::Portfolios, Table::PortfolioItems];

/// Local-first access to portfolios.
#[derive(Clone)]
pub struct PortfolioRepository<R> {
    local: LocalStore,
    remote: R,
}

impl<R: RemoteBackend + Clone> PortfolioRepository<R> {
    pub const fn new(local: LocalStore, remote: R) -> Self {
        Self { local, remote }
    }

    fn dao(&self) -> PortfolioDao<'_> {
        PortfolioDao::new(&self.local)
    }

    /// A cached portfolio with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Local` if a query fails.
    pub async fn get(&self, id: &PortfolioId) -> Result<Option<PortfolioDetails>, RepositoryError> {
        match self.dao().get(id).await? {
            Some(row) => Ok(Some(load_details(&self.local, row).await?)),
            None => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Local` if the query fails.
    pub async fn list(&self, owner: &ProfileId) -> Result<Vec<Portfolio>, RepositoryError> {
        let rows = self.dao().list_by_owner(owner).await?;
        Ok(rows.into_iter().map(Portfolio::from).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Local` if the query fails.
    pub async fn count(&self, owner: &ProfileId) -> Result<u32, RepositoryError> {
        Ok(self.dao().count_by_owner(owner).await?)
    }

    pub fn observe(
        &self,
        owner: &ProfileId,
    ) -> impl Stream<Item = Vec<PortfolioDetails>> + Send + 'static {
        let store = self.local.clone();
        let owner = owner.clone();

        watch_tables(&self.local, TABLES, move || {
            let store = store.clone();
            let owner = owner.clone();
            async move {
                load_all(&store, &owner).await.unwrap_or_else(|e| {
                    warn!(error = %e, owner = %owner, "Failed to load portfolios");
                    Vec::new()
                })
            }
        })
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, portfolio), fields(portfolio_id = %portfolio.id))]
    pub async fn create(&self, portfolio: &Portfolio) -> Result<Portfolio, RepositoryError> {
        let stored: Portfolio =
            remote::insert(&self.remote, Table::Portfolios, &PortfolioDto::from(portfolio))
                .await?
                .into();
        self.dao().upsert_all(&[PortfolioEntity::from(&stored)]).await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, portfolio), fields(portfolio_id = %portfolio.id))]
    pub async fn update(&self, portfolio: &Portfolio) -> Result<Portfolio, RepositoryError> {
        let stored: Portfolio = remote::update(
            &self.remote,
            Table::Portfolios,
            portfolio.id.as_str(),
            &PortfolioDto::from(portfolio),
        )
        .await?
        .into();
        self.dao().upsert_all(&[PortfolioEntity::from(&stored)]).await?;
        Ok(stored)
    }

    /// Delete a portfolio and its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &PortfolioId) -> Result<(), RepositoryError> {
        remote::delete(&self.remote, Table::Portfolios, id.as_str()).await?;
        self.dao().delete(id).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, item), fields(item_id = %item.id, portfolio_id = %item.portfolio_id))]
    pub async fn create_item(&self, item: &PortfolioItem) -> Result<PortfolioItem, RepositoryError> {
        let stored: PortfolioItem =
            remote::insert(&self.remote, Table::PortfolioItems, &PortfolioItemDto::from(item))
                .await?
                .into();
        self.dao()
            .upsert_items(&[PortfolioItemEntity::from(&stored)])
            .await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, item), fields(item_id = %item.id))]
    pub async fn update_item(&self, item: &PortfolioItem) -> Result<PortfolioItem, RepositoryError> {
        let stored: PortfolioItem = remote::update(
            &self.remote,
            Table::PortfolioItems,
            item.id.as_str(),
            &PortfolioItemDto::from(item),
        )
        .await?
        .into();
        self.dao()
            .upsert_items(&[PortfolioItemEntity::from(&stored)])
            .await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self))]
    pub async fn delete_item(&self, id: &PortfolioItemId) -> Result<(), RepositoryError> {
        remote::delete(&self.remote, Table::PortfolioItems, id.as_str()).await?;
        self.dao().delete_item(id).await?;
        Ok(())
    }

    /// Pull the owner's portfolios, then each portfolio's items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on the first failed pull or cache write.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn sync(&self, owner: &ProfileId) -> Result<Vec<Portfolio>, RepositoryError> {
        let dtos: Vec<PortfolioDto> =
            remote::fetch(&self.remote, Table::Portfolios, &[Filter::eq("user_id", owner)])
                .await?;
        let portfolios: Vec<Portfolio> = dtos.into_iter().map(Portfolio::from).collect();

        let rows: Vec<PortfolioEntity> = portfolios.iter().map(PortfolioEntity::from).collect();
        self.dao().upsert_all(&rows).await?;

        let mut item_count = 0usize;
        for portfolio in &portfolios {
            let items: Vec<PortfolioItemDto> = remote::fetch(
                &self.remote,
                Table::PortfolioItems,
                &[Filter::eq("portfolio_id", &portfolio.id)],
            )
            .await?;
            let rows: Vec<PortfolioItemEntity> = items
                .into_iter()
                .map(|dto| PortfolioItemEntity::from(&PortfolioItem::from(dto)))
                .collect();
            item_count += rows.len();
            self.dao().upsert_items(&rows).await?;
        }

        info!(portfolios = portfolios.len(), items = item_count, "Synced portfolios");
        Ok(portfolios)
    }
}

async fn load_details(
    store: &LocalStore,
    row: PortfolioEntity,
) -> Result<PortfolioDetails, RepositoryError> {
    let items = PortfolioDao::new(store).list_items(&row.id).await?;

    Ok(PortfolioDetails {
        portfolio: Portfolio::from(row),
        items: items.into_iter().map(PortfolioItem::from).collect(),
    })
}

async fn load_all(
    store: &LocalStore,
    owner: &ProfileId,
) -> Result<Vec<PortfolioDetails>, RepositoryError> {
    let rows = PortfolioDao::new(store).list_by_owner(owner).await?;

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

    use super::*;
    use crate::remote::MemoryBackend;

    fn portfolio() -> Portfolio {
        Portfolio {
            id: PortfolioId::generate(),
            user_id: ProfileId::new("user_1"),
            title: "Photography".to_string(),
            description: None,
            cover_image_url: None,
            primary_color: "#ABCDEF".to_string(),
            font_family: "Inter".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_update_failure_keeps_cached_title() {
        let store = LocalStore::in_memory().await.unwrap();
        let backend = MemoryBackend::new();
        let repo = PortfolioRepository::new(store, backend.clone());

        let original = portfolio();
        repo.create(&original).await.unwrap();

        backend.fail_writes(true);
        let mut renamed = original.clone();
        renamed.title = "Renamed".to_string();
        assert!(repo.update(&renamed).await.is_err());

        let cached = repo.get(&original.id).await.unwrap().unwrap();
        assert_eq!(cached.portfolio.title, "Photography");
    }

    #[tokio::test]
    async fn test_items_follow_sort_order() {
        let store = LocalStore::in_memory().await.unwrap();
        let repo = PortfolioRepository::new(store, MemoryBackend::new());
        let portfolio = portfolio();
        repo.create(&portfolio).await.unwrap();

        for (title, sort_order) in [("Second", 2), ("First", 1)] {
            repo.create_item(&PortfolioItem {
                id: PortfolioItemId::generate(),
                portfolio_id: portfolio.id.clone(),
                title: title.to_string(),
                description: None,
                image_url: None,
                link_url: None,
                sort_order,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        }

        let titles: Vec<String> = repo
            .get(&portfolio.id)
            .await
            .unwrap()
            .unwrap()
            .items
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, ["First", "Second"]);
    }
}
