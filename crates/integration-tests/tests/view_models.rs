//! Dashboard and plan picker driven through `AppState`.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use tokio::sync::watch;

use atomo_app::local::Table;
use atomo_app::remote::dto::PlanDto;
use atomo_app::viewmodel::dashboard::{Destination, Dialog};
use atomo_app::viewmodel::{DashboardAction, SubscriptionAction};
use atomo_core::{CreateDecision, Plan, PlanFeatures, PlanId, ServiceRef, ServiceType};
use atomo_integration_tests::{TestContext, owner};

async fn wait_for<S: Clone>(rx: &mut watch::Receiver<S>, check: impl FnMut(&S) -> bool) -> S {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(check))
        .await
        .unwrap()
        .unwrap()
        .clone()
}

#[tokio::test]
async fn test_limit_dialog_then_upgrade_navigation() {
    let ctx = TestContext::new().await.unwrap();
    let vm = ctx.state.dashboard_view_model(owner());
    let mut rx = vm.subscribe();

    vm.send(DashboardAction::Create {
        service: ServiceType::Menu,
        name: "Lunch".to_owned(),
    });
    let state = wait_for(&mut rx, |s| s.summary.services.len() == 1).await;
    let created = state.destination.clone().unwrap();
    assert!(matches!(created, Destination::Service(ServiceRef::Menu(_))));

    vm.send(DashboardAction::Create {
        service: ServiceType::Cv,
        name: "Ada Lovelace".to_owned(),
    });
    let state = wait_for(&mut rx, |s| s.dialog.is_some()).await;
    assert_eq!(
        state.dialog,
        Some(Dialog::LimitReached(CreateDecision::TotalLimitReached { limit: 1 }))
    );

    vm.send(DashboardAction::DismissDialog);
    vm.send(DashboardAction::UpgradePlan);
    let state = wait_for(&mut rx, |s| s.destination == Some(Destination::Plans)).await;
    assert_eq!(state.dialog, None);
}

#[tokio::test]
async fn test_plan_picker_switches_plan() {
    let ctx = TestContext::new().await.unwrap();
    let pro = Plan {
        id: PlanId::new("pro"),
        name: "Pro".to_owned(),
        price_monthly: rust_decimal::Decimal::new(999, 2),
        features: PlanFeatures::free().with_limit("max_services", 10),
        sort_order: 1,
    };
    for plan in [Plan::builtin_free(), pro.clone()] {
        ctx.seed_remote(Table::Plans, serde_json::to_value(PlanDto::from(&plan)).unwrap())
            .await;
    }

    let vm = ctx.state.subscription_view_model(owner());
    let mut rx = vm.subscribe();

    vm.send(SubscriptionAction::Refresh);
    let state = wait_for(&mut rx, |s| !s.refreshing && s.plans.len() == 2).await;
    assert_eq!(state.active_plan(), Some(&Plan::builtin_free()));

    vm.send(SubscriptionAction::SelectPlan(pro.id.clone()));
    let state = wait_for(&mut rx, |s| s.active_plan_id() == pro.id && s.selecting.is_none()).await;
    assert_eq!(state.active_plan(), Some(&pro));

    let current = ctx.state.subscriptions().get_for_owner(&owner()).await.unwrap();
    assert_eq!(current.map(|s| s.plan_id), Some(pro.id));
}

#[tokio::test]
async fn test_plan_picker_reports_unknown_plan() {
    let ctx = TestContext::new().await.unwrap();
    let vm = ctx.state.subscription_view_model(owner());
    let mut rx = vm.subscribe();

    vm.send(SubscriptionAction::SelectPlan(PlanId::new("gold")));
    let state = wait_for(&mut rx, |s| s.error.is_some()).await;
    assert_eq!(state.selecting, None);

    vm.send(SubscriptionAction::DismissError);
    wait_for(&mut rx, |s| s.error.is_none()).await;
}
