//! Plan picker screen.

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::warn;

use atomo_core::{FREE_PLAN_ID, Plan, PlanId, ProfileId, Subscription};

use crate::remote::RemoteBackend;
use crate::repository::SubscriptionRepository;
use crate::usecase::UpgradePlan;
use crate::viewmodel::{ViewModel, apply, forward};

pub type SubscriptionViewModel = ViewModel<SubscriptionState, SubscriptionAction>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionAction {
    SelectPlan(PlanId),
    Refresh,
    DismissError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionState {
    /// Cached plans, cheapest first.
    pub plans: Vec<Plan>,
    pub subscription: Option<Subscription>,
    /// Plan whose selection is in flight.
    pub selecting: Option<PlanId>,
    pub refreshing: bool,
    pub error: Option<String>,
}

impl SubscriptionState {
    /// Id of the plan whose limits apply right now.
    #[must_use]
    pub fn active_plan_id(&self) -> PlanId {
        self.subscription
            .as_ref()
            .filter(|s| s.is_current(Utc::now()))
            .map_or_else(|| PlanId::new(FREE_PLAN_ID), |s| s.plan_id.clone())
    }

    #[must_use]
    pub fn active_plan(&self) -> Option<&Plan> {
        let id = self.active_plan_id();
        self.plans.iter().find(|p| p.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionEvent {
    PlansLoaded(Vec<Plan>),
    SubscriptionLoaded(Option<Subscription>),
    SelectionStarted(PlanId),
    Selected(Subscription),
    RefreshStarted,
    RefreshFinished { error: Option<String> },
    Failed(String),
    ErrorDismissed,
}

#[must_use]
pub fn reduce(state: SubscriptionState, event: SubscriptionEvent) -> SubscriptionState {
    match event {
        SubscriptionEvent::PlansLoaded(plans) => SubscriptionState { plans, ..state },
        SubscriptionEvent::SubscriptionLoaded(subscription) => SubscriptionState {
            subscription,
            ..state
        },
        SubscriptionEvent::SelectionStarted(plan) => SubscriptionState {
            selecting: Some(plan),
            error: None,
            ..state
        },
        SubscriptionEvent::Selected(subscription) => SubscriptionState {
            subscription: Some(subscription),
            selecting: None,
            ..state
        },
        SubscriptionEvent::RefreshStarted => SubscriptionState {
            refreshing: true,
            ..state
        },
        SubscriptionEvent::RefreshFinished { error } => SubscriptionState {
            refreshing: false,
            error: error.or(state.error),
            ..state
        },
        SubscriptionEvent::Failed(message) => SubscriptionState {
            selecting: None,
            error: Some(message),
            ..state
        },
        SubscriptionEvent::ErrorDismissed => SubscriptionState {
            error: None,
            ..state
        },
    }
}

/// Start the plan picker for `owner`.
pub fn start<R>(
    owner: ProfileId,
    subscriptions: SubscriptionRepository<R>,
    upgrade: UpgradePlan<R>,
) -> SubscriptionViewModel
where
    R: RemoteBackend + Clone + Send + Sync + 'static,
{
    ViewModel::spawn(SubscriptionState::default(), move |state, actions| async move {
        run(owner, subscriptions, upgrade, state, actions).await;
    })
}

async fn run<R: RemoteBackend + Clone>(
    owner: ProfileId,
    subscriptions: SubscriptionRepository<R>,
    upgrade: UpgradePlan<R>,
    state: watch::Sender<SubscriptionState>,
    mut actions: mpsc::UnboundedReceiver<SubscriptionAction>,
) {
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let mut feeds = JoinSet::new();
    forward(
        &mut feeds,
        subscriptions.observe_plans(),
        SubscriptionEvent::PlansLoaded,
        events_tx.clone(),
    );
    forward(
        &mut feeds,
        subscriptions.observe(&owner),
        SubscriptionEvent::SubscriptionLoaded,
        events_tx,
    );

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                apply(&state, reduce, event);
            }
            action = actions.recv() => {
                let Some(action) = action else { break };
                handle(&owner, &subscriptions, &upgrade, &state, action).await;
            }
        }
    }
}

async fn handle<R: RemoteBackend + Clone>(
    owner: &ProfileId,
    subscriptions: &SubscriptionRepository<R>,
    upgrade: &UpgradePlan<R>,
    state: &watch::Sender<SubscriptionState>,
    action: SubscriptionAction,
) {
    match action {
        SubscriptionAction::SelectPlan(plan) => {
            if state.borrow().active_plan_id() == plan {
                return;
            }
            apply(state, reduce, SubscriptionEvent::SelectionStarted(plan.clone()));
            let event = match upgrade.run(owner, &plan).await {
                Ok(subscription) => SubscriptionEvent::Selected(subscription),
                Err(e) => {
                    warn!(error = %e, %plan, "Plan change failed");
                    SubscriptionEvent::Failed(e.to_string())
                }
            };
            apply(state, reduce, event);
        }
        SubscriptionAction::Refresh => {
            apply(state, reduce, SubscriptionEvent::RefreshStarted);
            let plans = subscriptions.sync_plans().await.err();
            let subscription = subscriptions.sync(owner).await.err();
            let error = plans.or(subscription).map(|e| {
                warn!(error = %e, "Subscription refresh failed");
                e.to_string()
            });
            apply(state, reduce, SubscriptionEvent::RefreshFinished { error });
        }
        SubscriptionAction::DismissError => {
            apply(state, reduce, SubscriptionEvent::ErrorDismissed);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use atomo_core::{PlanFeatures, SubscriptionId, SubscriptionStatus};
    use rust_decimal::Decimal;

    use super::*;
    use crate::local::{LocalStore, Table};
    use crate::remote::MemoryBackend;
    use crate::remote::dto::PlanDto;

    fn pro() -> Plan {
        Plan {
            id: PlanId::new("pro"),
            name: "Pro".to_owned(),
            price_monthly: Decimal::new(999, 2),
            features: PlanFeatures::free().with_limit("max_services", -1),
            sort_order: 1,
        }
    }

    fn subscription(status: SubscriptionStatus) -> Subscription {
        let now = Utc::now();
        Subscription {
            id: SubscriptionId::new("sub1"),
            user_id: ProfileId::new("user_1"),
            plan_id: PlanId::new("pro"),
            status,
            started_at: now,
            expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_active_plan_falls_back_to_free() {
        let state = reduce(
            SubscriptionState::default(),
            SubscriptionEvent::PlansLoaded(vec![Plan::builtin_free(), pro()]),
        );
        assert_eq!(state.active_plan(), Some(&Plan::builtin_free()));

        let state = reduce(
            state,
            SubscriptionEvent::SubscriptionLoaded(Some(subscription(SubscriptionStatus::Canceled))),
        );
        assert_eq!(state.active_plan_id(), PlanId::new(FREE_PLAN_ID));

        let state = reduce(
            state,
            SubscriptionEvent::Selected(subscription(SubscriptionStatus::Active)),
        );
        assert_eq!(state.active_plan(), Some(&pro()));
    }

    #[test]
    fn test_failure_clears_selection() {
        let state = reduce(
            SubscriptionState::default(),
            SubscriptionEvent::SelectionStarted(PlanId::new("pro")),
        );
        assert_eq!(state.selecting, Some(PlanId::new("pro")));

        let state = reduce(state, SubscriptionEvent::Failed("offline".to_owned()));
        assert_eq!(state.selecting, None);
        assert_eq!(state.error.as_deref(), Some("offline"));

        let state = reduce(state, SubscriptionEvent::ErrorDismissed);
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_clean_refresh_keeps_earlier_error() {
        let state = SubscriptionState {
            error: Some("offline".to_owned()),
            ..SubscriptionState::default()
        };
        let state = reduce(state, SubscriptionEvent::RefreshStarted);
        let state = reduce(state, SubscriptionEvent::RefreshFinished { error: None });
        assert!(!state.refreshing);
        assert_eq!(state.error.as_deref(), Some("offline"));
    }

    #[tokio::test]
    async fn test_refresh_then_select_plan() {
        let store = LocalStore::in_memory().await.unwrap();
        let backend = MemoryBackend::new();
        for plan in [Plan::builtin_free(), pro()] {
            backend
                .seed(Table::Plans, serde_json::to_value(PlanDto::from(&plan)).unwrap())
                .await;
        }
        let repo = SubscriptionRepository::new(store, backend);
        let vm = start(ProfileId::new("user_1"), repo.clone(), UpgradePlan::new(repo));
        let mut rx = vm.subscribe();

        vm.send(SubscriptionAction::Refresh);
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.plans.len() == 2))
            .await
            .unwrap()
            .unwrap();

        vm.send(SubscriptionAction::SelectPlan(PlanId::new("pro")));
        let state = tokio::time::timeout(
            Duration::from_secs(5),
            rx.wait_for(|s| s.subscription.is_some() && s.selecting.is_none()),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();

        assert_eq!(state.active_plan_id(), PlanId::new("pro"));
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn test_refresh_sent_at_start_does_not_wait_on_subscriptions() {
        let store = LocalStore::in_memory().await.unwrap();
        let backend = MemoryBackend::new();
        for plan in [Plan::builtin_free(), pro()] {
            backend
                .seed(Table::Plans, serde_json::to_value(PlanDto::from(&plan)).unwrap())
                .await;
        }
        let repo = SubscriptionRepository::new(store, backend);
        let vm = start(ProfileId::new("user_1"), repo.clone(), UpgradePlan::new(repo.clone()));
        let mut rx = vm.subscribe();

        vm.send(SubscriptionAction::Refresh);
        let state = tokio::time::timeout(
            Duration::from_secs(1),
            rx.wait_for(|s| !s.refreshing && s.plans.len() == 2),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();
        assert_eq!(state.error, None);

        let direct = tokio::time::timeout(Duration::from_secs(1), repo.list_plans())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(direct.len(), 2);
    }
}
