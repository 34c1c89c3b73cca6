//! The owner's dashboard: every service, the plan in force and how much of
//! it is used.

use chrono::{DateTime, Utc};
use futures::Stream;
use tracing::warn;

use atomo_core::{Plan, ProfileId, ServiceCounts, ServiceRef, ServiceType, Subscription};

use crate::error::RepositoryError;
use crate::local::{LocalStore, Table};
use crate::remote::RemoteBackend;
use crate::repository::{
    CvRepository, InvitationRepository, MenuRepository, PortfolioRepository, ShopRepository,
    SubscriptionRepository, watch_tables,
};
use crate::usecase::limits::CanCreateService;

const TABLES: &[Table] = &[
    Table::Menus,
    Table::Portfolios,
    Table::Cvs,
    Table::Shops,
    Table::Invitations,
    Table::Plans,
    Table::Subscriptions,
];

/// One row on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSummary {
    pub reference: ServiceRef,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    /// Grouped by service type, oldest first within a type.
    pub services: Vec<ServiceSummary>,
    pub counts: ServiceCounts,
    pub plan: Plan,
    pub subscription: Option<Subscription>,
}

impl DashboardSummary {
    /// What an owner with no cached data sees.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            services: Vec::new(),
            counts: ServiceCounts::new(),
            plan: Plan::builtin_free(),
            subscription: None,
        }
    }
}

#[derive(Clone)]
pub struct ObserveServices<R> {
    local: LocalStore,
    menus: MenuRepository<R>,
    portfolios: PortfolioRepository<R>,
    cvs: CvRepository<R>,
    shops: ShopRepository<R>,
    invitations: InvitationRepository<R>,
    subscriptions: SubscriptionRepository<R>,
    gate: CanCreateService<R>,
}

impl<R: RemoteBackend + Clone> ObserveServices<R> {
    pub fn new(local: LocalStore, remote: &R) -> Self {
        let subscriptions = SubscriptionRepository::new(local.clone(), remote.clone());
        Self {
            menus: MenuRepository::new(local.clone(), remote.clone()),
            portfolios: PortfolioRepository::new(local.clone(), remote.clone()),
            cvs: CvRepository::new(local.clone(), remote.clone()),
            shops: ShopRepository::new(local.clone(), remote.clone()),
            invitations: InvitationRepository::new(local.clone(), remote.clone()),
            gate: CanCreateService::new(local.clone(), subscriptions.clone()),
            subscriptions,
            local,
        }
    }

    /// The current summary.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if any part of the cache cannot be read.
    pub async fn load(&self, owner: &ProfileId) -> Result<DashboardSummary, RepositoryError> {
        let mut services = Vec::new();

        services.extend(self.menus.list(owner).await?.into_iter().map(|m| ServiceSummary {
            reference: ServiceRef::Menu(m.id),
            title: m.name,
            created_at: m.created_at,
        }));
        services.extend(self.portfolios.list(owner).await?.into_iter().map(|p| ServiceSummary {
            reference: ServiceRef::Portfolio(p.id),
            title: p.title,
            created_at: p.created_at,
        }));
        services.extend(self.cvs.list(owner).await?.into_iter().map(|c| ServiceSummary {
            reference: ServiceRef::Cv(c.id),
            title: c.full_name,
            created_at: c.created_at,
        }));
        services.extend(self.shops.list(owner).await?.into_iter().map(|s| ServiceSummary {
            reference: ServiceRef::Shop(s.id),
            title: s.name,
            created_at: s.created_at,
        }));
        services.extend(self.invitations.list(owner).await?.into_iter().map(|i| ServiceSummary {
            reference: ServiceRef::Invitation(i.id),
            title: i.title,
            created_at: i.created_at,
        }));

        let mut counts = ServiceCounts::new();
        for service in ServiceType::ALL {
            let n = services
                .iter()
                .filter(|s| s.reference.service_type() == service)
                .count();
            counts.set(service, u32::try_from(n).unwrap_or(u32::MAX));
        }

        Ok(DashboardSummary {
            services,
            counts,
            plan: self.gate.plan_for(owner).await?,
            subscription: self.subscriptions.get_for_owner(owner).await?,
        })
    }

    /// The summary, re-emitted whenever a service, plan or subscription
    /// changes. Read failures emit [`DashboardSummary::empty`].
    pub fn observe(&self, owner: &ProfileId) -> impl Stream<Item = DashboardSummary> + Send + 'static {
        let this = self.clone();
        let owner = owner.clone();

        watch_tables(&self.local, TABLES, move || {
            let this = this.clone();
            let owner = owner.clone();
            async move {
                this.load(&owner).await.unwrap_or_else(|e| {
                    warn!(error = %e, owner = %owner, "Failed to load dashboard");
                    DashboardSummary::empty()
                })
            }
        })
    }
}
