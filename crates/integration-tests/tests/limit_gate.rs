//! Plan limits, evaluated against the local cache through the use cases.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use atomo_app::error::UseCaseError;
use atomo_app::local::Table;
use atomo_app::remote::dto::{PlanDto, SubscriptionDto};
use atomo_core::{
    CreateDecision, Plan, PlanFeatures, PlanId, ServiceType, Subscription, SubscriptionId,
    SubscriptionStatus,
};
use atomo_integration_tests::{TestContext, at, owner, shop};

/// Unlimited services overall, but one shop at most.
fn studio() -> Plan {
    Plan {
        id: PlanId::new("studio"),
        name: "Studio".to_owned(),
        price_monthly: Decimal::new(1900, 2),
        features: PlanFeatures::free()
            .with_limit("max_services", -1)
            .with_limit("max_menus", -1)
            .with_limit("max_portfolios", -1)
            .with_limit("max_cvs", -1)
            .with_limit("max_invitations", -1)
            .with_limit("max_shops", 1),
        sort_order: 1,
    }
}

fn subscription(plan: &Plan, status: SubscriptionStatus) -> Subscription {
    Subscription {
        id: SubscriptionId::new("sub1"),
        user_id: owner(),
        plan_id: plan.id.clone(),
        status,
        started_at: at(1),
        expires_at: None,
        created_at: at(1),
        updated_at: at(1),
    }
}

async fn subscribe(ctx: &TestContext, plan: &Plan, status: SubscriptionStatus) {
    ctx.seed_remote(Table::Plans, serde_json::to_value(PlanDto::from(plan)).unwrap())
        .await;
    ctx.seed_remote(
        Table::Subscriptions,
        serde_json::to_value(SubscriptionDto::from(&subscription(plan, status))).unwrap(),
    )
    .await;
    ctx.state.subscriptions().sync_plans().await.unwrap();
    ctx.state.subscriptions().sync(&owner()).await.unwrap();
}

#[tokio::test]
async fn test_free_owner_cannot_open_a_second_shop() {
    let ctx = TestContext::new().await.unwrap();
    let gate = ctx.state.gate();

    assert_eq!(
        gate.check(&owner(), ServiceType::Shop).await.unwrap(),
        CreateDecision::Allowed
    );

    ctx.state.shops().create(&shop("s1", "Corner store")).await.unwrap();

    assert_eq!(
        gate.check(&owner(), ServiceType::Shop).await.unwrap(),
        CreateDecision::ServiceTypeExists {
            service: ServiceType::Shop
        }
    );

    let second = ctx
        .state
        .services()
        .create_named(&owner(), ServiceType::Shop, "Second store")
        .await;
    assert!(matches!(
        second,
        Err(UseCaseError::LimitReached(CreateDecision::ServiceTypeExists { .. }))
    ));
    assert_eq!(ctx.state.shops().count(&owner()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_type_cap_wins_even_when_total_is_unlimited() {
    let ctx = TestContext::new().await.unwrap();
    subscribe(&ctx, &studio(), SubscriptionStatus::Active).await;

    let services = ctx.state.services();
    services
        .create_named(&owner(), ServiceType::Shop, "Corner store")
        .await
        .unwrap();
    services
        .create_named(&owner(), ServiceType::Menu, "Lunch")
        .await
        .unwrap();
    services
        .create_named(&owner(), ServiceType::Menu, "Dinner")
        .await
        .unwrap();

    let gate = ctx.state.gate();
    assert_eq!(
        gate.check(&owner(), ServiceType::Shop).await.unwrap(),
        CreateDecision::ServiceTypeExists {
            service: ServiceType::Shop
        }
    );
    assert_eq!(
        gate.check(&owner(), ServiceType::Portfolio).await.unwrap(),
        CreateDecision::Allowed
    );
}

#[tokio::test]
async fn test_lapsed_subscription_falls_back_to_free() {
    let ctx = TestContext::new().await.unwrap();
    subscribe(&ctx, &studio(), SubscriptionStatus::Expired).await;

    ctx.state
        .services()
        .create_named(&owner(), ServiceType::Menu, "Lunch")
        .await
        .unwrap();

    let decision = ctx
        .state
        .gate()
        .check(&owner(), ServiceType::Portfolio)
        .await
        .unwrap();
    assert_eq!(decision, CreateDecision::TotalLimitReached { limit: 1 });
}

#[tokio::test]
async fn test_upgrade_lifts_the_total_limit() {
    let ctx = TestContext::new().await.unwrap();
    ctx.seed_remote(
        Table::Plans,
        serde_json::to_value(PlanDto::from(&studio())).unwrap(),
    )
    .await;
    ctx.state.subscriptions().sync_plans().await.unwrap();

    let services = ctx.state.services();
    services
        .create_named(&owner(), ServiceType::Cv, "Ada Lovelace")
        .await
        .unwrap();
    assert!(
        services
            .create_named(&owner(), ServiceType::Invitation, "Wedding")
            .await
            .is_err()
    );

    ctx.state
        .upgrade()
        .run(&owner(), &PlanId::new("studio"))
        .await
        .unwrap();

    services
        .create_named(&owner(), ServiceType::Invitation, "Wedding")
        .await
        .unwrap();
    assert_eq!(
        ctx.state.gate().counts(&owner()).await.unwrap().total(),
        2
    );
}
