//! Plans and subscriptions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{PlanFeatures, PlanId, ProfileId, SubscriptionId, SubscriptionStatus};

/// Id of the plan assumed for owners without a usable subscription.
pub const FREE_PLAN_ID: &str = "free";

/// A global subscription plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    pub price_monthly: Decimal,
    pub features: PlanFeatures,
    pub sort_order: i32,
}

impl Plan {
    /// The plan used when the free plan has not been synced yet.
    #[must_use]
    pub fn builtin_free() -> Self {
        Self {
            id: PlanId::new(FREE_PLAN_ID),
            name: "Free".to_owned(),
            price_monthly: Decimal::ZERO,
            features: PlanFeatures::free(),
            sort_order: 0,
        }
    }
}

/// An owner's subscription. At most one per owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: ProfileId,
    pub plan_id: PlanId,
    pub status: SubscriptionStatus,
    pub started_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Active and not past its expiry at `now`.
    #[must_use]
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.expires_at.is_none_or(|at| at > now)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn subscription(status: SubscriptionStatus, expires_at: Option<DateTime<Utc>>) -> Subscription {
        let now = Utc::now();
        Subscription {
            id: SubscriptionId::new("sub_1"),
            user_id: ProfileId::new("user_1"),
            plan_id: PlanId::new("pro"),
            status,
            started_at: now,
            expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_active_without_expiry_is_current() {
        assert!(subscription(SubscriptionStatus::Active, None).is_current(Utc::now()));
    }

    #[test]
    fn test_expired_date_is_not_current() {
        let past = Utc::now() - Duration::days(1);
        assert!(!subscription(SubscriptionStatus::Active, Some(past)).is_current(Utc::now()));
    }

    #[test]
    fn test_canceled_is_not_current() {
        assert!(!subscription(SubscriptionStatus::Canceled, None).is_current(Utc::now()));
    }
}
