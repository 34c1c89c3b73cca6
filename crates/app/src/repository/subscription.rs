//! Plans and the owner's subscription.
//!
//! Plans are global and read-only from the client. Each owner holds at
//! most one subscription; saving a new one replaces the existing row in
//! place, keeping its id.

use futures::Stream;
use tracing::{info, instrument, warn};

use atomo_core::{Plan, PlanId, ProfileId, Subscription};

use super::watch_tables;
use crate::conversions::try_convert_all;
use crate::error::RepositoryError;
use crate::local::dao::SubscriptionDao;
use crate::local::entities::{PlanEntity, SubscriptionEntity};
use crate::local::{LocalStore, Table};
use crate::remote::dto::{PlanDto, SubscriptionDto};
use crate::remote::{self, Filter, RemoteBackend};

/// Local-first access to plans and subscriptions.
#[derive(Clone)]
pub struct SubscriptionRepository<R> {
    local: LocalStore,
    remote: R,
}

impl<R: RemoteBackend + Clone> SubscriptionRepository<R> {
    pub const fn new(local: LocalStore, remote: R) -> Self {
        Self { local, remote }
    }

    fn dao(&self) -> SubscriptionDao<'_> {
        SubscriptionDao::new(&self.local)
    }

    // =========================================================================
    // Plans
    // =========================================================================

    /// Cached plans in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or a cached plan is
    /// corrupt.
    pub async fn list_plans(&self) -> Result<Vec<Plan>, RepositoryError> {
        try_convert_all(self.dao().list_plans().await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the cached plan is
    /// corrupt.
    pub async fn get_plan(&self, id: &PlanId) -> Result<Option<Plan>, RepositoryError> {
        self.dao().get_plan(id).await?.map(Plan::try_from).transpose()
    }

    pub fn observe_plans(&self) -> impl Stream<Item = Vec<Plan>> + Send + 'static {
        let store = self.local.clone();

        watch_tables(&self.local, &[Table::Plans], move || {
            let store = store.clone();
            async move {
                let rows = SubscriptionDao::new(&store).list_plans().await;
                match rows.map_err(RepositoryError::from).and_then(try_convert_all) {
                    Ok(plans) => plans,
                    Err(e) => {
                        warn!(error = %e, "Failed to load plans");
                        Vec::new()
                    }
                }
            }
        })
    }

    /// Pull every plan.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the pull or the cache write fails.
    #[instrument(skip(self))]
    pub async fn sync_plans(&self) -> Result<Vec<Plan>, RepositoryError> {
        let dtos: Vec<PlanDto> = remote::fetch(&self.remote, Table::Plans, &[]).await?;
        let plans: Vec<Plan> = dtos.into_iter().map(Plan::from).collect();

        let rows: Vec<PlanEntity> = plans.iter().map(PlanEntity::from).collect();
        self.dao().upsert_plans(&rows).await?;

        info!(plans = plans.len(), "Synced plans");
        Ok(plans)
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// The owner's cached subscription, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the row is corrupt.
    pub async fn get_for_owner(
        &self,
        owner: &ProfileId,
    ) -> Result<Option<Subscription>, RepositoryError> {
        self.dao()
            .get_by_owner(owner)
            .await?
            .map(Subscription::try_from)
            .transpose()
    }

    pub fn observe(&self, owner: &ProfileId) -> impl Stream<Item = Option<Subscription>> + Send + 'static {
        let store = self.local.clone();
        let owner = owner.clone();

        watch_tables(&self.local, &[Table::Subscriptions], move || {
            let store = store.clone();
            let owner = owner.clone();
            async move {
                let row = SubscriptionDao::new(&store).get_by_owner(&owner).await;
                match row
                    .map_err(RepositoryError::from)
                    .and_then(|row| row.map(Subscription::try_from).transpose())
                {
                    Ok(subscription) => subscription,
                    Err(e) => {
                        warn!(error = %e, owner = %owner, "Failed to load subscription");
                        None
                    }
                }
            }
        })
    }

    /// Create or replace the owner's subscription.
    ///
    /// When the backend already has a subscription for the owner, that row
    /// is updated under its existing id. Otherwise `subscription` is
    /// inserted as given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, subscription), fields(owner = %subscription.user_id, plan = %subscription.plan_id))]
    pub async fn save_for_owner(
        &self,
        subscription: &Subscription,
    ) -> Result<Subscription, RepositoryError> {
        let existing: Vec<SubscriptionDto> = remote::fetch(
            &self.remote,
            Table::Subscriptions,
            &[Filter::eq("user_id", &subscription.user_id)],
        )
        .await?;

        let echoed = match existing.into_iter().next() {
            Some(current) => {
                let mut replacement = SubscriptionDto::from(subscription);
                replacement.id = current.id;
                replacement.created_at = current.created_at;
                remote::update(
                    &self.remote,
                    Table::Subscriptions,
                    replacement.id.as_str(),
                    &replacement,
                )
                .await?
            }
            None => {
                remote::insert(
                    &self.remote,
                    Table::Subscriptions,
                    &SubscriptionDto::from(subscription),
                )
                .await?
            }
        };

        let stored = Subscription::try_from(echoed)?;
        self.dao()
            .upsert(&SubscriptionEntity::from(&stored))
            .await
            .inspect_err(|e| warn!(error = %e, "Backend accepted subscription but caching failed"))?;
        Ok(stored)
    }

    /// Pull the owner's subscription.
    ///
    /// A missing remote subscription leaves any cached row in place.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the pull, the status parse or the cache
    /// write fails.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn sync(&self, owner: &ProfileId) -> Result<Option<Subscription>, RepositoryError> {
        let dtos: Vec<SubscriptionDto> =
            remote::fetch(&self.remote, Table::Subscriptions, &[Filter::eq("user_id", owner)])
                .await?;

        let subscription = match dtos.into_iter().next() {
            Some(dto) => {
                let subscription = Subscription::try_from(dto)?;
                self.dao()
                    .upsert(&SubscriptionEntity::from(&subscription))
                    .await?;
                Some(subscription)
            }
            None => None,
        };

        info!(
            plan = ?subscription.as_ref().map(|s| s.plan_id.as_str()),
            "Synced subscription"
        );
        Ok(subscription)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use atomo_core::{PlanFeatures, SubscriptionId, SubscriptionStatus};

    use super::*;
    use crate::remote::MemoryBackend;

    fn subscription(owner: &str, plan: &str) -> Subscription {
        let now = Utc::now();
        Subscription {
            id: SubscriptionId::generate(),
            user_id: ProfileId::new(owner),
            plan_id: PlanId::new(plan),
            status: SubscriptionStatus::Active,
            started_at: now,
            expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_saving_twice_keeps_one_subscription() {
        let store = LocalStore::in_memory().await.unwrap();
        let backend = MemoryBackend::new();
        let repo = SubscriptionRepository::new(store, backend.clone());

        let first = repo.save_for_owner(&subscription("user_1", "free")).await.unwrap();
        let second = repo.save_for_owner(&subscription("user_1", "pro")).await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.plan_id, PlanId::new("pro"));
        assert_eq!(backend.rows(Table::Subscriptions).await.len(), 1);

        let cached = repo.get_for_owner(&ProfileId::new("user_1")).await.unwrap().unwrap();
        assert_eq!(cached, second);
    }

    #[tokio::test]
    async fn test_sync_plans_caches_features() {
        let store = LocalStore::in_memory().await.unwrap();
        let backend = MemoryBackend::new();
        let repo = SubscriptionRepository::new(store, backend.clone());

        let pro = Plan {
            id: PlanId::new("pro"),
            name: "Pro".to_string(),
            price_monthly: Decimal::new(1500, 2),
            features: PlanFeatures::default().with_limit("max_services", 10),
            sort_order: 1,
        };
        backend
            .seed(Table::Plans, serde_json::to_value(PlanDto::from(&pro)).unwrap())
            .await;
        backend
            .seed(
                Table::Plans,
                serde_json::to_value(PlanDto::from(&Plan::builtin_free())).unwrap(),
            )
            .await;

        repo.sync_plans().await.unwrap();

        let ids: Vec<PlanId> = repo.list_plans().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, [PlanId::new("free"), PlanId::new("pro")]);
        assert_eq!(repo.get_plan(&PlanId::new("pro")).await.unwrap(), Some(pro));
    }

    #[tokio::test]
    async fn test_sync_without_remote_subscription_returns_none() {
        let store = LocalStore::in_memory().await.unwrap();
        let repo = SubscriptionRepository::new(store, MemoryBackend::new());

        assert_eq!(repo.sync(&ProfileId::new("user_1")).await.unwrap(), None);
    }
}
