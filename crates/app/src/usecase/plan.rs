//! Switching an owner to another plan.

use chrono::Utc;
use tracing::{info, instrument};

use atomo_core::{PlanId, ProfileId, Subscription, SubscriptionId, SubscriptionStatus};

use crate::error::UseCaseError;
use crate::remote::RemoteBackend;
use crate::repository::SubscriptionRepository;

#[derive(Clone)]
pub struct UpgradePlan<R> {
    subscriptions: SubscriptionRepository<R>,
}

impl<R: RemoteBackend + Clone> UpgradePlan<R> {
    pub const fn new(subscriptions: SubscriptionRepository<R>) -> Self {
        Self { subscriptions }
    }

    /// Give `owner` an active, open-ended subscription to `plan`.
    ///
    /// The plan must be in the local cache, so an owner can only pick a
    /// plan they have been shown. An existing subscription is replaced in
    /// place.
    ///
    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` if the plan is unknown, or
    /// `UseCaseError::Repository` if the lookup or the write fails.
    #[instrument(skip(self), fields(owner = %owner, plan = %plan))]
    pub async fn run(&self, owner: &ProfileId, plan: &PlanId) -> Result<Subscription, UseCaseError> {
        if self.subscriptions.get_plan(plan).await?.is_none() {
            return Err(UseCaseError::invalid("plan", format!("unknown plan {plan}")));
        }

        let now = Utc::now();
        let subscription = Subscription {
            id: SubscriptionId::generate(),
            user_id: owner.clone(),
            plan_id: plan.clone(),
            status: SubscriptionStatus::Active,
            started_at: now,
            expires_at: None,
            created_at: now,
            updated_at: now,
        };

        let stored = self.subscriptions.save_for_owner(&subscription).await?;
        info!(subscription_id = %stored.id, "Plan changed");
        Ok(stored)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use atomo_core::Plan;

    use super::*;
    use crate::local::entities::PlanEntity;
    use crate::local::{LocalStore, dao::SubscriptionDao};
    use crate::remote::MemoryBackend;

    #[tokio::test]
    async fn test_upgrade_requires_a_known_plan() {
        let store = LocalStore::in_memory().await.unwrap();
        let upgrade = UpgradePlan::new(SubscriptionRepository::new(store, MemoryBackend::new()));

        let result = upgrade.run(&ProfileId::new("user_1"), &PlanId::new("gold")).await;
        assert!(matches!(result, Err(UseCaseError::Validation { field: "plan", .. })));
    }

    #[tokio::test]
    async fn test_upgrade_activates_plan() {
        let store = LocalStore::in_memory().await.unwrap();
        SubscriptionDao::new(&store)
            .upsert_plans(&[PlanEntity::from(&Plan::builtin_free())])
            .await
            .unwrap();
        let repo = SubscriptionRepository::new(store, MemoryBackend::new());
        let upgrade = UpgradePlan::new(repo.clone());

        let owner = ProfileId::new("user_1");
        let stored = upgrade.run(&owner, &PlanId::new("free")).await.unwrap();

        assert_eq!(stored.status, SubscriptionStatus::Active);
        assert_eq!(repo.get_for_owner(&owner).await.unwrap(), Some(stored));
    }
}
