use atomo_core::{Plan, PlanFeatures, Subscription};

use super::{parse_decimal, parse_text};
use crate::error::RepositoryError;
use crate::local::entities::{PlanEntity, SubscriptionEntity};
use crate::remote::dto::{PlanDto, SubscriptionDto};

// =============================================================================
// Plan
// =============================================================================

impl From<PlanDto> for Plan {
    fn from(dto: PlanDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            price_monthly: dto.price_monthly,
            features: PlanFeatures::from_json(dto.features),
            sort_order: dto.sort_order,
        }
    }
}

impl From<&Plan> for PlanDto {
    fn from(plan: &Plan) -> Self {
        Self {
            id: plan.id.clone(),
            name: plan.name.clone(),
            price_monthly: plan.price_monthly,
            features: plan.features.to_json(),
            sort_order: plan.sort_order,
        }
    }
}

impl From<&Plan> for PlanEntity {
    fn from(plan: &Plan) -> Self {
        Self {
            id: plan.id.clone(),
            name: plan.name.clone(),
            price_monthly: plan.price_monthly.to_string(),
            features: plan.features.to_json().to_string(),
            sort_order: plan.sort_order,
        }
    }
}

impl TryFrom<PlanEntity> for Plan {
    type Error = RepositoryError;

    fn try_from(row: PlanEntity) -> Result<Self, Self::Error> {
        let features = serde_json::from_str(&row.features).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid plan features in database: {e}"))
        })?;

        Ok(Self {
            price_monthly: parse_decimal("plan price", &row.price_monthly)?,
            features: PlanFeatures::from_json(features),
            id: row.id,
            name: row.name,
            sort_order: row.sort_order,
        })
    }
}

// =============================================================================
// Subscription
// =============================================================================

impl TryFrom<SubscriptionDto> for Subscription {
    type Error = RepositoryError;

    fn try_from(dto: SubscriptionDto) -> Result<Self, Self::Error> {
        Ok(Self {
            status: parse_text(&dto.status)?,
            id: dto.id,
            user_id: dto.user_id,
            plan_id: dto.plan_id,
            started_at: dto.started_at,
            expires_at: dto.expires_at,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
        })
    }
}

impl From<&Subscription> for SubscriptionDto {
    fn from(subscription: &Subscription) -> Self {
        Self {
            id: subscription.id.clone(),
            user_id: subscription.user_id.clone(),
            plan_id: subscription.plan_id.clone(),
            status: subscription.status.as_str().to_string(),
            started_at: subscription.started_at,
            expires_at: subscription.expires_at,
            created_at: subscription.created_at,
            updated_at: subscription.updated_at,
        }
    }
}

impl From<&Subscription> for SubscriptionEntity {
    fn from(subscription: &Subscription) -> Self {
        Self {
            id: subscription.id.clone(),
            user_id: subscription.user_id.clone(),
            plan_id: subscription.plan_id.clone(),
            status: subscription.status.as_str().to_string(),
            started_at: subscription.started_at,
            expires_at: subscription.expires_at,
            created_at: subscription.created_at,
            updated_at: subscription.updated_at,
        }
    }
}

impl TryFrom<SubscriptionEntity> for Subscription {
    type Error = RepositoryError;

    fn try_from(row: SubscriptionEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            status: parse_text(&row.status)?,
            id: row.id,
            user_id: row.user_id,
            plan_id: row.plan_id,
            started_at: row.started_at,
            expires_at: row.expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use atomo_core::{Limit, PlanId, ServiceType};

    use super::*;

    #[test]
    fn test_plan_row_keeps_features_and_price() {
        let plan = Plan {
            id: PlanId::new("pro"),
            name: "Pro".to_string(),
            price_monthly: Decimal::new(999, 2),
            features: PlanFeatures::default().with_limit("max_shops", 5),
            sort_order: 2,
        };

        let row = PlanEntity::from(&plan);
        assert_eq!(row.price_monthly, "9.99");

        let back = Plan::try_from(row).unwrap();
        assert_eq!(back, plan);
        assert_eq!(back.features.service_limit(ServiceType::Shop), Limit::AtMost(5));
    }

    #[test]
    fn test_plan_row_with_bad_json_is_corrupt() {
        let row = PlanEntity {
            id: PlanId::new("pro"),
            name: "Pro".to_string(),
            price_monthly: "9.99".to_string(),
            features: "{not json".to_string(),
            sort_order: 0,
        };
        assert!(matches!(
            Plan::try_from(row),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_plan_dto_with_non_object_features_has_no_limits() {
        let dto = PlanDto {
            id: PlanId::new("odd"),
            name: "Odd".to_string(),
            price_monthly: Decimal::ZERO,
            features: json!([1, 2]),
            sort_order: 0,
        };
        let plan = Plan::from(dto);
        assert_eq!(plan.features.total_limit(), Limit::Unlimited);
    }
}
