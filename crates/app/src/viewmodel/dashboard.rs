//! Dashboard screen: the owner's services, plan usage and the create and
//! delete flows.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::warn;

use atomo_core::{CreateDecision, ProfileId, ServiceRef, ServiceType};

use crate::error::UseCaseError;
use crate::remote::RemoteBackend;
use crate::usecase::{DashboardSummary, ObserveServices, Services, SyncAll};
use crate::viewmodel::{ViewModel, apply, forward};

pub type DashboardViewModel = ViewModel<DashboardState, DashboardAction>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardAction {
    /// Pull everything from the backend.
    Refresh,
    Create { service: ServiceType, name: String },
    /// Ask for confirmation before deleting.
    RequestDelete(ServiceRef),
    /// Delete the service named by the open confirmation dialog.
    ConfirmDelete,
    Open(ServiceRef),
    UpgradePlan,
    DismissDialog,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    ConfirmDelete(ServiceRef),
    LimitReached(CreateDecision),
    Error(String),
}

/// Where the screen should go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Service(ServiceRef),
    Plans,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    pub summary: DashboardSummary,
    /// False until the first summary has been read from the cache.
    pub loaded: bool,
    pub refreshing: bool,
    /// A create or delete is in flight.
    pub busy: bool,
    pub dialog: Option<Dialog>,
    pub destination: Option<Destination>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            summary: DashboardSummary::empty(),
            loaded: false,
            refreshing: false,
            busy: false,
            dialog: None,
            destination: None,
        }
    }
}

impl DashboardState {
    /// The service awaiting delete confirmation, if any.
    #[must_use]
    pub const fn pending_delete(&self) -> Option<&ServiceRef> {
        match &self.dialog {
            Some(Dialog::ConfirmDelete(service)) => Some(service),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    Loaded(DashboardSummary),
    RefreshStarted,
    RefreshFinished { failed_steps: usize },
    Working,
    Created(ServiceRef),
    CreateRejected(CreateDecision),
    DeleteRequested(ServiceRef),
    Deleted,
    Failed(String),
    Navigate(Destination),
    DialogDismissed,
}

#[must_use]
pub fn reduce(state: DashboardState, event: DashboardEvent) -> DashboardState {
    match event {
        DashboardEvent::Loaded(summary) => DashboardState {
            summary,
            loaded: true,
            ..state
        },
        DashboardEvent::RefreshStarted => DashboardState {
            refreshing: true,
            ..state
        },
        DashboardEvent::RefreshFinished { failed_steps } => DashboardState {
            refreshing: false,
            dialog: if failed_steps == 0 {
                state.dialog
            } else {
                Some(Dialog::Error(format!(
                    "Sync incomplete: {failed_steps} step(s) failed"
                )))
            },
            ..state
        },
        DashboardEvent::Working => DashboardState {
            busy: true,
            ..state
        },
        DashboardEvent::Created(service) => DashboardState {
            busy: false,
            destination: Some(Destination::Service(service)),
            ..state
        },
        DashboardEvent::CreateRejected(decision) => DashboardState {
            busy: false,
            dialog: Some(Dialog::LimitReached(decision)),
            ..state
        },
        DashboardEvent::DeleteRequested(service) => DashboardState {
            dialog: Some(Dialog::ConfirmDelete(service)),
            ..state
        },
        DashboardEvent::Deleted => DashboardState {
            busy: false,
            dialog: None,
            ..state
        },
        DashboardEvent::Failed(message) => DashboardState {
            busy: false,
            dialog: Some(Dialog::Error(message)),
            ..state
        },
        DashboardEvent::Navigate(destination) => DashboardState {
            destination: Some(destination),
            ..state
        },
        DashboardEvent::DialogDismissed => DashboardState {
            dialog: None,
            ..state
        },
    }
}

/// Start the dashboard for `owner`.
pub fn start<R>(
    owner: ProfileId,
    observe: ObserveServices<R>,
    services: Services<R>,
    sync: SyncAll<R>,
) -> DashboardViewModel
where
    R: RemoteBackend + Clone + Send + Sync + 'static,
{
    ViewModel::spawn(DashboardState::default(), move |state, actions| async move {
        run(owner, observe, services, sync, state, actions).await;
    })
}

async fn run<R: RemoteBackend + Clone>(
    owner: ProfileId,
    observe: ObserveServices<R>,
    services: Services<R>,
    sync: SyncAll<R>,
    state: watch::Sender<DashboardState>,
    mut actions: mpsc::UnboundedReceiver<DashboardAction>,
) {
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let mut feeds = JoinSet::new();
    forward(&mut feeds, observe.observe(&owner), DashboardEvent::Loaded, events_tx);

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                apply(&state, reduce, event);
            }
            action = actions.recv() => {
                let Some(action) = action else { break };
                handle(&owner, &services, &sync, &state, action).await;
            }
        }
    }
}

async fn handle<R: RemoteBackend + Clone>(
    owner: &ProfileId,
    services: &Services<R>,
    sync: &SyncAll<R>,
    state: &watch::Sender<DashboardState>,
    action: DashboardAction,
) {
    match action {
        DashboardAction::Refresh => {
            apply(state, reduce, DashboardEvent::RefreshStarted);
            let report = sync.run(owner).await;
            apply(
                state,
                reduce,
                DashboardEvent::RefreshFinished {
                    failed_steps: report.failures().count(),
                },
            );
        }
        DashboardAction::Create { service, name } => {
            apply(state, reduce, DashboardEvent::Working);
            let event = match services.create_named(owner, service, &name).await {
                Ok(created) => DashboardEvent::Created(created),
                Err(UseCaseError::LimitReached(decision)) => DashboardEvent::CreateRejected(decision),
                Err(e) => {
                    warn!(error = %e, %service, "Create failed");
                    DashboardEvent::Failed(e.to_string())
                }
            };
            apply(state, reduce, event);
        }
        DashboardAction::RequestDelete(service) => {
            apply(state, reduce, DashboardEvent::DeleteRequested(service));
        }
        DashboardAction::ConfirmDelete => {
            let Some(service) = state.borrow().pending_delete().cloned() else {
                return;
            };
            apply(state, reduce, DashboardEvent::Working);
            let event = match services.delete(&service).await {
                Ok(()) => DashboardEvent::Deleted,
                Err(e) => {
                    warn!(error = %e, %service, "Delete failed");
                    DashboardEvent::Failed(e.to_string())
                }
            };
            apply(state, reduce, event);
        }
        DashboardAction::Open(service) => {
            apply(state, reduce, DashboardEvent::Navigate(Destination::Service(service)));
        }
        DashboardAction::UpgradePlan => {
            apply(state, reduce, DashboardEvent::Navigate(Destination::Plans));
        }
        DashboardAction::DismissDialog => {
            apply(state, reduce, DashboardEvent::DialogDismissed);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use atomo_core::{MenuId, ShopId};

    use super::*;
    use crate::local::LocalStore;
    use crate::remote::MemoryBackend;
    use crate::repository::SubscriptionRepository;
    use crate::usecase::CanCreateService;

    #[test]
    fn test_confirm_dialog_holds_the_service() {
        let shop = ServiceRef::Shop(ShopId::new("s1"));
        let state = reduce(
            DashboardState::default(),
            DashboardEvent::DeleteRequested(shop.clone()),
        );
        assert_eq!(state.pending_delete(), Some(&shop));

        let state = reduce(state, DashboardEvent::DialogDismissed);
        assert_eq!(state.pending_delete(), None);
    }

    #[test]
    fn test_rejected_create_opens_limit_dialog() {
        let decision = CreateDecision::TotalLimitReached { limit: 1 };
        let state = reduce(DashboardState::default(), DashboardEvent::Working);
        assert!(state.busy);

        let state = reduce(state, DashboardEvent::CreateRejected(decision));
        assert!(!state.busy);
        assert_eq!(state.dialog, Some(Dialog::LimitReached(decision)));
    }

    #[test]
    fn test_refresh_reports_failed_steps() {
        let state = reduce(DashboardState::default(), DashboardEvent::RefreshStarted);
        assert!(state.refreshing);

        let clean = reduce(state.clone(), DashboardEvent::RefreshFinished { failed_steps: 0 });
        assert!(!clean.refreshing);
        assert_eq!(clean.dialog, None);

        let partial = reduce(state, DashboardEvent::RefreshFinished { failed_steps: 2 });
        assert!(matches!(partial.dialog, Some(Dialog::Error(_))));
    }

    #[test]
    fn test_loading_keeps_open_dialog() {
        let menu = ServiceRef::Menu(MenuId::new("m1"));
        let state = reduce(
            DashboardState::default(),
            DashboardEvent::DeleteRequested(menu.clone()),
        );
        let state = reduce(state, DashboardEvent::Loaded(DashboardSummary::empty()));
        assert!(state.loaded);
        assert_eq!(state.pending_delete(), Some(&menu));
    }

    async fn wait_until(
        rx: &mut watch::Receiver<DashboardState>,
        check: impl FnMut(&DashboardState) -> bool,
    ) -> DashboardState {
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(check))
            .await
            .unwrap()
            .unwrap()
            .clone()
    }

    #[tokio::test]
    async fn test_create_then_delete_round_trip() {
        let store = LocalStore::in_memory().await.unwrap();
        let backend = MemoryBackend::new();
        let gate = CanCreateService::new(
            store.clone(),
            SubscriptionRepository::new(store.clone(), backend.clone()),
        );
        let vm = start(
            ProfileId::new("user_1"),
            ObserveServices::new(store.clone(), &backend),
            Services::new(&store, &backend, &gate),
            SyncAll::new(&store, &backend),
        );
        let mut rx = vm.subscribe();

        vm.send(DashboardAction::Create {
            service: ServiceType::Shop,
            name: "Corner store".to_owned(),
        });
        let state = wait_until(&mut rx, |s| s.summary.services.len() == 1).await;
        let created = state.summary.services.first().unwrap().reference.clone();
        assert_eq!(created.service_type(), ServiceType::Shop);

        vm.send(DashboardAction::Create {
            service: ServiceType::Shop,
            name: "Second".to_owned(),
        });
        let state = wait_until(&mut rx, |s| s.dialog.is_some()).await;
        assert_eq!(
            state.dialog,
            Some(Dialog::LimitReached(CreateDecision::ServiceTypeExists {
                service: ServiceType::Shop
            }))
        );

        vm.send(DashboardAction::RequestDelete(created));
        vm.send(DashboardAction::ConfirmDelete);
        let state = wait_until(&mut rx, |s| s.summary.services.is_empty() && s.dialog.is_none()).await;
        assert_eq!(state.summary.counts.get(ServiceType::Shop), 0);
    }

    #[tokio::test]
    async fn test_create_sent_at_start_finishes_promptly() {
        let store = LocalStore::in_memory().await.unwrap();
        let backend = MemoryBackend::new();
        let gate = CanCreateService::new(
            store.clone(),
            SubscriptionRepository::new(store.clone(), backend.clone()),
        );
        let vm = start(
            ProfileId::new("user_1"),
            ObserveServices::new(store.clone(), &backend),
            Services::new(&store, &backend, &gate),
            SyncAll::new(&store, &backend),
        );
        let mut rx = vm.subscribe();

        vm.send(DashboardAction::Create {
            service: ServiceType::Cv,
            name: "Ada Lovelace".to_owned(),
        });
        let state = tokio::time::timeout(
            Duration::from_secs(1),
            rx.wait_for(|s| s.destination.is_some() && s.summary.services.len() == 1),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();
        assert!(!state.busy);
        assert_eq!(state.dialog, None);
    }
}
