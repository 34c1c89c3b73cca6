//! Pull everything an owner has from the backend.

use serde::Serialize;
use tracing::{error, info, instrument};

use atomo_core::ProfileId;

use crate::error::RepositoryError;
use crate::local::LocalStore;
use crate::remote::RemoteBackend;
use crate::repository::{
    CvRepository, InvitationRepository, MenuRepository, PortfolioRepository, ProfileRepository,
    ShopRepository, SubscriptionRepository,
};

/// What a sync step covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStep {
    Profile,
    Plans,
    Subscription,
    Menus,
    Portfolios,
    Cvs,
    Shops,
    Invitations,
}

impl SyncStep {
    pub const ALL: [Self; 8] = [
        Self::Profile,
        Self::Plans,
        Self::Subscription,
        Self::Menus,
        Self::Portfolios,
        Self::Cvs,
        Self::Shops,
        Self::Invitations,
    ];
}

/// Result of one step: rows pulled, or why it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    Synced { rows: usize },
    Failed { error: String },
}

/// Per-step outcome of [`SyncAll::run`], in the order the steps ran.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub steps: Vec<(SyncStep, StepOutcome)>,
}

impl SyncReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.steps
            .iter()
            .all(|(_, outcome)| matches!(outcome, StepOutcome::Synced { .. }))
    }

    pub fn failures(&self) -> impl Iterator<Item = (SyncStep, &str)> {
        self.steps.iter().filter_map(|(step, outcome)| match outcome {
            StepOutcome::Failed { error } => Some((*step, error.as_str())),
            StepOutcome::Synced { .. } => None,
        })
    }

    fn record(&mut self, step: SyncStep, result: Result<usize, RepositoryError>) {
        let outcome = match result {
            Ok(rows) => StepOutcome::Synced { rows },
            Err(e) => {
                error!(?step, error = %e, "Sync step failed");
                StepOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        self.steps.push((step, outcome));
    }
}

/// Sync profile, plans, subscription and all five service types.
///
/// A failing step does not stop the others.
#[derive(Clone)]
pub struct SyncAll<R> {
    pub profiles: ProfileRepository<R>,
    pub subscriptions: SubscriptionRepository<R>,
    pub menus: MenuRepository<R>,
    pub portfolios: PortfolioRepository<R>,
    pub cvs: CvRepository<R>,
    pub shops: ShopRepository<R>,
    pub invitations: InvitationRepository<R>,
}

impl<R: RemoteBackend + Clone> SyncAll<R> {
    pub fn new(local: &LocalStore, remote: &R) -> Self {
        Self {
            profiles: ProfileRepository::new(local.clone(), remote.clone()),
            subscriptions: SubscriptionRepository::new(local.clone(), remote.clone()),
            menus: MenuRepository::new(local.clone(), remote.clone()),
            portfolios: PortfolioRepository::new(local.clone(), remote.clone()),
            cvs: CvRepository::new(local.clone(), remote.clone()),
            shops: ShopRepository::new(local.clone(), remote.clone()),
            invitations: InvitationRepository::new(local.clone(), remote.clone()),
        }
    }

    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn run(&self, owner: &ProfileId) -> SyncReport {
        let mut report = SyncReport::default();

        for step in SyncStep::ALL {
            let result = match step {
                SyncStep::Profile => self.profiles.sync(owner).await.map(|p| usize::from(p.is_some())),
                SyncStep::Plans => self.subscriptions.sync_plans().await.map(|p| p.len()),
                SyncStep::Subscription => self
                    .subscriptions
                    .sync(owner)
                    .await
                    .map(|s| usize::from(s.is_some())),
                SyncStep::Menus => self.menus.sync(owner).await.map(|m| m.len()),
                SyncStep::Portfolios => self.portfolios.sync(owner).await.map(|p| p.len()),
                SyncStep::Cvs => self.cvs.sync(owner).await.map(|c| c.len()),
                SyncStep::Shops => self.shops.sync(owner).await.map(|s| s.len()),
                SyncStep::Invitations => self.invitations.sync(owner).await.map(|i| i.len()),
            };
            report.record(step, result);
        }

        info!(
            complete = report.is_complete(),
            failed = report.failures().count(),
            "Sync finished"
        );
        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use atomo_core::{Menu, MenuId, Plan};

    use super::*;
    use crate::local::Table;
    use crate::remote::MemoryBackend;
    use crate::remote::dto::{MenuDto, PlanDto};

    #[tokio::test]
    async fn test_sync_reports_every_step() {
        let store = LocalStore::in_memory().await.unwrap();
        let backend = MemoryBackend::new();
        backend
            .seed(
                Table::Plans,
                serde_json::to_value(PlanDto::from(&Plan::builtin_free())).unwrap(),
            )
            .await;
        backend
            .seed(
                Table::Menus,
                serde_json::to_value(MenuDto::from(&Menu {
                    id: MenuId::new("m1"),
                    user_id: ProfileId::new("user_1"),
                    name: "Lunch".to_owned(),
                    description: None,
                    logo_url: None,
                    primary_color: "#000000".to_owned(),
                    font_family: "Inter".to_owned(),
                    is_published: true,
                    created_at: Utc::now(),
                }))
                .unwrap(),
            )
            .await;

        let report = SyncAll::new(&store, &backend).run(&ProfileId::new("user_1")).await;

        assert!(report.is_complete());
        assert_eq!(report.steps.len(), SyncStep::ALL.len());
        assert!(report.steps.contains(&(SyncStep::Menus, StepOutcome::Synced { rows: 1 })));
        assert!(report.steps.contains(&(SyncStep::Plans, StepOutcome::Synced { rows: 1 })));
    }

    #[tokio::test]
    async fn test_unreachable_backend_fails_each_step() {
        let store = LocalStore::in_memory().await.unwrap();
        let backend = MemoryBackend::new();
        backend.fail_reads(true);

        let report = SyncAll::new(&store, &backend).run(&ProfileId::new("user_1")).await;

        assert!(!report.is_complete());
        assert_eq!(report.failures().count(), SyncStep::ALL.len());
    }
}
