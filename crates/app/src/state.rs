//! Application state shared by screens and commands.

use std::sync::Arc;

use atomo_core::ProfileId;

use crate::config::AtomoConfig;
use crate::local::{LocalError, LocalStore};
use crate::remote::{BlobStorage, RemoteBackend, RemoteError, SupabaseClient, SupabaseStorage};
use crate::repository::{
    CvRepository, InvitationRepository, MenuRepository, PortfolioRepository, ProfileRepository,
    ShopRepository, SubscriptionRepository,
};
use crate::usecase::{
    CanCreateService, ObserveServices, Services, SyncAll, UpgradePlan, UploadImage,
};
use crate::viewmodel::{DashboardViewModel, SubscriptionViewModel, dashboard, subscription};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("local store: {0}")]
    Local(#[from] LocalError),
    #[error("backend client: {0}")]
    Remote(#[from] RemoteError),
}

/// Every repository and use case wired to one local store and one backend.
///
/// Cheaply cloneable via `Arc`.
pub struct AppState<R = SupabaseClient, S = SupabaseStorage> {
    inner: Arc<AppStateInner<R, S>>,
}

impl<R, S> Clone for AppState<R, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct AppStateInner<R, S> {
    local: LocalStore,
    profiles: ProfileRepository<R>,
    subscriptions: SubscriptionRepository<R>,
    menus: MenuRepository<R>,
    portfolios: PortfolioRepository<R>,
    cvs: CvRepository<R>,
    shops: ShopRepository<R>,
    invitations: InvitationRepository<R>,
    gate: CanCreateService<R>,
    services: Services<R>,
    sync: SyncAll<R>,
    upgrade: UpgradePlan<R>,
    upload: UploadImage<S>,
    dashboard: ObserveServices<R>,
}

impl AppState {
    /// Open the local database, apply the schema and build the backend
    /// clients from `config`.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Local` if the database cannot be opened or
    /// migrated, or `StateError::Remote` if an HTTP client cannot be built.
    pub async fn connect(config: &AtomoConfig) -> Result<Self, StateError> {
        let local = LocalStore::open(&config.database_url).await?;
        local.migrate().await?;

        let remote = SupabaseClient::new(&config.supabase)?;
        let storage = SupabaseStorage::new(&config.supabase)?;

        Ok(Self::new(local, remote, storage))
    }
}

impl<R, S> AppState<R, S>
where
    R: RemoteBackend + Clone + Send + Sync + 'static,
    S: BlobStorage,
{
    pub fn new(local: LocalStore, remote: R, storage: S) -> Self {
        let subscriptions = SubscriptionRepository::new(local.clone(), remote.clone());
        let gate = CanCreateService::new(local.clone(), subscriptions.clone());

        Self {
            inner: Arc::new(AppStateInner {
                profiles: ProfileRepository::new(local.clone(), remote.clone()),
                menus: MenuRepository::new(local.clone(), remote.clone()),
                portfolios: PortfolioRepository::new(local.clone(), remote.clone()),
                cvs: CvRepository::new(local.clone(), remote.clone()),
                shops: ShopRepository::new(local.clone(), remote.clone()),
                invitations: InvitationRepository::new(local.clone(), remote.clone()),
                services: Services::new(&local, &remote, &gate),
                sync: SyncAll::new(&local, &remote),
                upgrade: UpgradePlan::new(subscriptions.clone()),
                upload: UploadImage::new(storage),
                dashboard: ObserveServices::new(local.clone(), &remote),
                gate,
                subscriptions,
                local,
            }),
        }
    }

    #[must_use]
    pub fn local(&self) -> &LocalStore {
        &self.inner.local
    }

    #[must_use]
    pub fn profiles(&self) -> &ProfileRepository<R> {
        &self.inner.profiles
    }

    #[must_use]
    pub fn subscriptions(&self) -> &SubscriptionRepository<R> {
        &self.inner.subscriptions
    }

    #[must_use]
    pub fn menus(&self) -> &MenuRepository<R> {
        &self.inner.menus
    }

    #[must_use]
    pub fn portfolios(&self) -> &PortfolioRepository<R> {
        &self.inner.portfolios
    }

    #[must_use]
    pub fn cvs(&self) -> &CvRepository<R> {
        &self.inner.cvs
    }

    #[must_use]
    pub fn shops(&self) -> &ShopRepository<R> {
        &self.inner.shops
    }

    #[must_use]
    pub fn invitations(&self) -> &InvitationRepository<R> {
        &self.inner.invitations
    }

    /// The plan limit gate.
    #[must_use]
    pub fn gate(&self) -> &CanCreateService<R> {
        &self.inner.gate
    }

    /// Validated create, edit and delete for every service type.
    #[must_use]
    pub fn services(&self) -> &Services<R> {
        &self.inner.services
    }

    #[must_use]
    pub fn sync(&self) -> &SyncAll<R> {
        &self.inner.sync
    }

    #[must_use]
    pub fn upgrade(&self) -> &UpgradePlan<R> {
        &self.inner.upgrade
    }

    #[must_use]
    pub fn upload(&self) -> &UploadImage<S> {
        &self.inner.upload
    }

    #[must_use]
    pub fn dashboard(&self) -> &ObserveServices<R> {
        &self.inner.dashboard
    }

    /// Start the dashboard view-model for `owner`. Must be called inside a
    /// tokio runtime.
    #[must_use]
    pub fn dashboard_view_model(&self, owner: ProfileId) -> DashboardViewModel {
        dashboard::start(
            owner,
            self.inner.dashboard.clone(),
            self.inner.services.clone(),
            self.inner.sync.clone(),
        )
    }

    /// Start the plan picker view-model for `owner`. Must be called inside
    /// a tokio runtime.
    #[must_use]
    pub fn subscription_view_model(&self, owner: ProfileId) -> SubscriptionViewModel {
        subscription::start(
            owner,
            self.inner.subscriptions.clone(),
            self.inner.upgrade.clone(),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use atomo_core::ServiceType;

    use super::*;
    use crate::remote::{MemoryBackend, MemoryStorage};

    #[tokio::test]
    async fn test_view_model_sees_writes_through_state() {
        let local = LocalStore::in_memory().await.unwrap();
        let state = AppState::new(local, MemoryBackend::new(), MemoryStorage::default());
        let owner = ProfileId::new("user_1");

        let vm = state.dashboard_view_model(owner.clone());
        let mut rx = vm.subscribe();

        state
            .services()
            .create_named(&owner, ServiceType::Cv, "Ada Lovelace")
            .await
            .unwrap();

        let summary = tokio::time::timeout(
            Duration::from_secs(5),
            rx.wait_for(|s| s.summary.counts.get(ServiceType::Cv) == 1),
        )
        .await
        .unwrap()
        .unwrap()
        .summary
        .clone();
        assert_eq!(summary.services.len(), 1);
        assert_eq!(state.gate().counts(&owner).await.unwrap(), summary.counts);
    }
}
