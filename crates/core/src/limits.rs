//! Subscription limit gate.
//!
//! Decides whether an owner may create one more service of a given type,
//! from the plan's features and the owner's current counts. Pure: loading
//! the plan and counting rows is the caller's job.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Limit, PlanFeatures, ServiceType};

/// Number of services an owner currently has, per type.
///
/// Zero counts are not stored, so two values are equal exactly when every
/// type has the same count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceCounts(BTreeMap<ServiceType, u32>);

impl ServiceCounts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the count for one type, replacing any previous value.
    #[must_use]
    pub fn with(mut self, service: ServiceType, count: u32) -> Self {
        self.set(service, count);
        self
    }

    pub fn set(&mut self, service: ServiceType, count: u32) {
        if count == 0 {
            self.0.remove(&service);
        } else {
            self.0.insert(service, count);
        }
    }

    #[must_use]
    pub fn get(&self, service: ServiceType) -> u32 {
        self.0.get(&service).copied().unwrap_or(0)
    }

    /// Sum across all types.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.0.values().fold(0u32, |acc, n| acc.saturating_add(*n))
    }
}

/// Outcome of the limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum CreateDecision {
    Allowed,
    /// The plan's cross-service total is used up.
    TotalLimitReached { limit: u32 },
    /// This type already has as many instances as the plan allows.
    ServiceTypeExists { service: ServiceType },
}

impl CreateDecision {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Check whether one more `service` may be created.
///
/// The per-type cap is checked before the total, so an owner who already
/// has the single allowed shop is told so even when the total is also used.
#[must_use]
pub fn can_create(
    features: &PlanFeatures,
    counts: &ServiceCounts,
    service: ServiceType,
) -> CreateDecision {
    if features.service_limit(service).is_reached(counts.get(service)) {
        return CreateDecision::ServiceTypeExists { service };
    }

    if let Limit::AtMost(limit) = features.total_limit()
        && counts.total() >= limit
    {
        return CreateDecision::TotalLimitReached { limit };
    }

    CreateDecision::Allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MAX_SERVICES;

    #[test]
    fn test_zero_counts_equal_missing_counts() {
        assert_eq!(ServiceCounts::new(), ServiceCounts::new().with(ServiceType::Menu, 0));

        let mut counts = ServiceCounts::new().with(ServiceType::Shop, 1);
        assert_ne!(counts, ServiceCounts::new());
        counts.set(ServiceType::Shop, 0);
        assert_eq!(counts, ServiceCounts::new());
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_empty_account_on_free_plan_is_allowed() {
        let decision = can_create(&PlanFeatures::free(), &ServiceCounts::new(), ServiceType::Menu);
        assert_eq!(decision, CreateDecision::Allowed);
    }

    #[test]
    fn test_second_shop_on_free_plan_is_blocked_by_type() {
        let counts = ServiceCounts::new().with(ServiceType::Shop, 1);
        let decision = can_create(&PlanFeatures::free(), &counts, ServiceType::Shop);
        assert_eq!(
            decision,
            CreateDecision::ServiceTypeExists {
                service: ServiceType::Shop
            }
        );
    }

    #[test]
    fn test_type_cap_wins_regardless_of_total() {
        // Total has room, but the type is capped at one.
        let features = PlanFeatures::default()
            .with_limit(MAX_SERVICES, 10)
            .with_limit("max_cvs", 1);
        let counts = ServiceCounts::new().with(ServiceType::Cv, 1);
        assert_eq!(
            can_create(&features, &counts, ServiceType::Cv),
            CreateDecision::ServiceTypeExists {
                service: ServiceType::Cv
            }
        );
    }

    #[test]
    fn test_total_limit_blocks_other_types() {
        let counts = ServiceCounts::new().with(ServiceType::Menu, 1);
        let decision = can_create(&PlanFeatures::free(), &counts, ServiceType::Cv);
        assert_eq!(decision, CreateDecision::TotalLimitReached { limit: 1 });
    }

    #[test]
    fn test_unlimited_plan_allows_everything() {
        let features = PlanFeatures::default().with_limit(MAX_SERVICES, -1);
        let counts = ServiceCounts::new()
            .with(ServiceType::Menu, 40)
            .with(ServiceType::Shop, 12);
        assert!(can_create(&features, &counts, ServiceType::Shop).is_allowed());
    }

    #[test]
    fn test_counts_total_saturates() {
        let counts = ServiceCounts::new()
            .with(ServiceType::Menu, u32::MAX)
            .with(ServiceType::Shop, 5);
        assert_eq!(counts.total(), u32::MAX);
    }
}
