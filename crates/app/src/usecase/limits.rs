//! Resolving an owner's plan and checking it against their services.

use chrono::Utc;
use tracing::{debug, instrument};

use atomo_core::{
    CreateDecision, FREE_PLAN_ID, Plan, PlanId, ProfileId, ServiceCounts, ServiceType, can_create,
};

use crate::error::{RepositoryError, UseCaseError};
use crate::local::LocalStore;
use crate::local::dao::{CvDao, InvitationDao, MenuDao, PortfolioDao, ShopDao};
use crate::remote::RemoteBackend;
use crate::repository::SubscriptionRepository;

/// The subscription limit gate, fed from the local cache.
#[derive(Clone)]
pub struct CanCreateService<R> {
    local: LocalStore,
    subscriptions: SubscriptionRepository<R>,
}

impl<R: RemoteBackend + Clone> CanCreateService<R> {
    pub const fn new(local: LocalStore, subscriptions: SubscriptionRepository<R>) -> Self {
        Self {
            local,
            subscriptions,
        }
    }

    /// Decide whether `owner` may create one more `service`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the plan, subscription or counts cannot
    /// be read from the cache.
    #[instrument(skip(self), fields(owner = %owner, service = %service))]
    pub async fn check(
        &self,
        owner: &ProfileId,
        service: ServiceType,
    ) -> Result<CreateDecision, RepositoryError> {
        let plan = self.plan_for(owner).await?;
        let counts = self.counts(owner).await?;
        let decision = can_create(&plan.features, &counts, service);

        debug!(plan = %plan.id, total = counts.total(), ?decision, "Checked plan limits");
        Ok(decision)
    }

    /// Like [`check`](Self::check), but a blocked decision is an error.
    ///
    /// # Errors
    ///
    /// Returns `UseCaseError::LimitReached` when the plan does not allow
    /// another `service`, or `UseCaseError::Repository` if the cache read
    /// fails.
    pub async fn ensure(&self, owner: &ProfileId, service: ServiceType) -> Result<(), UseCaseError> {
        match self.check(owner, service).await? {
            CreateDecision::Allowed => Ok(()),
            blocked => Err(UseCaseError::LimitReached(blocked)),
        }
    }

    /// The plan in force for `owner`.
    ///
    /// A current subscription selects its plan. Anything else falls back to
    /// the free plan, and to the built-in free plan if that has not been
    /// synced. A subscription to a plan that is not cached also falls back
    /// to free.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the cache cannot be read.
    pub async fn plan_for(&self, owner: &ProfileId) -> Result<Plan, RepositoryError> {
        let subscribed = self
            .subscriptions
            .get_for_owner(owner)
            .await?
            .filter(|s| s.is_current(Utc::now()))
            .map(|s| s.plan_id);

        if let Some(plan_id) = subscribed {
            if let Some(plan) = self.subscriptions.get_plan(&plan_id).await? {
                return Ok(plan);
            }
            debug!(plan = %plan_id, "Subscribed plan is not cached, using free plan");
        }

        Ok(self
            .subscriptions
            .get_plan(&PlanId::new(FREE_PLAN_ID))
            .await?
            .unwrap_or_else(Plan::builtin_free))
    }

    /// How many services of each type `owner` has in the cache.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Local` if a count query fails.
    pub async fn counts(&self, owner: &ProfileId) -> Result<ServiceCounts, RepositoryError> {
        Ok(ServiceCounts::new()
            .with(ServiceType::Menu, MenuDao::new(&self.local).count_by_owner(owner).await?)
            .with(
                ServiceType::Portfolio,
                PortfolioDao::new(&self.local).count_by_owner(owner).await?,
            )
            .with(ServiceType::Cv, CvDao::new(&self.local).count_by_owner(owner).await?)
            .with(ServiceType::Shop, ShopDao::new(&self.local).count_by_owner(owner).await?)
            .with(
                ServiceType::Invitation,
                InvitationDao::new(&self.local).count_by_owner(owner).await?,
            ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use rust_decimal::Decimal;

    use atomo_core::{MAX_SERVICES, PlanFeatures, Subscription, SubscriptionId, SubscriptionStatus};

    use super::*;
    use crate::local::dao::SubscriptionDao;
    use crate::local::entities::{PlanEntity, ShopEntity, SubscriptionEntity};

    async fn gate() -> (CanCreateService<crate::remote::MemoryBackend>, LocalStore) {
        let store = LocalStore::in_memory().await.unwrap();
        let subscriptions =
            SubscriptionRepository::new(store.clone(), crate::remote::MemoryBackend::new());
        (CanCreateService::new(store.clone(), subscriptions), store)
    }

    async fn add_shop(store: &LocalStore, owner: &str) {
        ShopDao::new(store)
            .upsert_all(&[ShopEntity {
                id: atomo_core::ShopId::generate(),
                user_id: ProfileId::new(owner),
                name: "Shop".to_owned(),
                description: None,
                logo_url: None,
                primary_color: "#000000".to_owned(),
                font_family: "Inter".to_owned(),
                currency: "USD".to_owned(),
                whatsapp_number: None,
                is_published: false,
                created_at: Utc::now(),
            }])
            .await
            .unwrap();
    }

    async fn subscribe(store: &LocalStore, owner: &str, plan: Plan, expires_in: Option<Duration>) {
        let dao = SubscriptionDao::new(store);
        dao.upsert_plans(&[PlanEntity::from(&plan)]).await.unwrap();

        let now = Utc::now();
        let subscription = Subscription {
            id: SubscriptionId::generate(),
            user_id: ProfileId::new(owner),
            plan_id: plan.id,
            status: SubscriptionStatus::Active,
            started_at: now,
            expires_at: expires_in.map(|d| now + d),
            created_at: now,
            updated_at: now,
        };
        dao.upsert(&SubscriptionEntity::from(&subscription)).await.unwrap();
    }

    fn business_plan() -> Plan {
        Plan {
            id: PlanId::new("business"),
            name: "Business".to_owned(),
            price_monthly: Decimal::new(2900, 2),
            features: PlanFeatures::default().with_limit(MAX_SERVICES, -1),
            sort_order: 2,
        }
    }

    #[tokio::test]
    async fn test_owner_without_subscription_gets_builtin_free_plan() {
        let (gate, store) = gate().await;
        let owner = ProfileId::new("user_1");

        assert_eq!(gate.plan_for(&owner).await.unwrap(), Plan::builtin_free());
        assert!(gate.check(&owner, ServiceType::Shop).await.unwrap().is_allowed());

        add_shop(&store, "user_1").await;
        assert_eq!(
            gate.check(&owner, ServiceType::Shop).await.unwrap(),
            CreateDecision::ServiceTypeExists {
                service: ServiceType::Shop
            }
        );
    }

    #[tokio::test]
    async fn test_current_subscription_lifts_limits() {
        let (gate, store) = gate().await;
        add_shop(&store, "user_1").await;
        subscribe(&store, "user_1", business_plan(), None).await;

        let owner = ProfileId::new("user_1");
        assert!(gate.check(&owner, ServiceType::Shop).await.unwrap().is_allowed());
        assert!(gate.ensure(&owner, ServiceType::Menu).await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_subscription_falls_back_to_free() {
        let (gate, store) = gate().await;
        add_shop(&store, "user_1").await;
        subscribe(&store, "user_1", business_plan(), Some(Duration::days(-1))).await;

        let owner = ProfileId::new("user_1");
        assert!(matches!(
            gate.ensure(&owner, ServiceType::Menu).await,
            Err(UseCaseError::LimitReached(CreateDecision::TotalLimitReached { limit: 1 }))
        ));
    }

    #[tokio::test]
    async fn test_counts_are_per_owner() {
        let (gate, store) = gate().await;
        add_shop(&store, "user_1").await;
        add_shop(&store, "user_2").await;

        let counts = gate.counts(&ProfileId::new("user_1")).await.unwrap();
        assert_eq!(counts.get(ServiceType::Shop), 1);
        assert_eq!(counts.total(), 1);
    }
}
