//! Create, edit and delete services and their child rows.
//!
//! Every entry point validates its input before touching a repository.
//! Creating a parent service consults
//! [`CanCreateService`](crate::usecase::limits::CanCreateService) first; child rows
//! are not gated.

pub mod cv;
pub mod invitation;
pub mod menu;
pub mod portfolio;
pub mod shop;

use chrono::{Duration, Utc};

use atomo_core::{ProfileId, ServiceRef, ServiceType};

use crate::error::UseCaseError;
use crate::local::LocalStore;
use crate::remote::RemoteBackend;
use crate::repository::{
    CvRepository, InvitationRepository, MenuRepository, PortfolioRepository, ShopRepository,
};
use crate::usecase::limits::CanCreateService;

pub use cv::{CvService, NewEducation, NewExperience};
pub use invitation::{InvitationService, NewResponse};
pub use menu::{MenuService, NewDish};
pub use portfolio::{NewPortfolioItem, PortfolioService};
pub use shop::{NewProduct, ShopService};

pub(crate) const DEFAULT_COLOR: &str = "#1E293B";
pub(crate) const DEFAULT_FONT: &str = "Inter";
pub(crate) const DEFAULT_CURRENCY: &str = "USD";

/// Days ahead of today for invitations created from a name alone.
const DEFAULT_EVENT_LEAD_DAYS: i64 = 30;

/// All five service editors behind one handle.
#[derive(Clone)]
pub struct Services<R> {
    pub menus: MenuService<R>,
    pub shops: ShopService<R>,
    pub portfolios: PortfolioService<R>,
    pub cvs: CvService<R>,
    pub invitations: InvitationService<R>,
}

impl<R: RemoteBackend + Clone> Services<R> {
    /// Editors for every service type, all gated by `gate`.
    pub fn new(local: &LocalStore, remote: &R, gate: &CanCreateService<R>) -> Self {
        Self {
            menus: MenuService::new(MenuRepository::new(local.clone(), remote.clone()), gate.clone()),
            shops: ShopService::new(ShopRepository::new(local.clone(), remote.clone()), gate.clone()),
            portfolios: PortfolioService::new(
                PortfolioRepository::new(local.clone(), remote.clone()),
                gate.clone(),
            ),
            cvs: CvService::new(CvRepository::new(local.clone(), remote.clone()), gate.clone()),
            invitations: InvitationService::new(
                InvitationRepository::new(local.clone(), remote.clone()),
                gate.clone(),
            ),
        }
    }

    /// Create a service of any type from just its display name.
    ///
    /// # Errors
    ///
    /// Returns whatever the type's own `create` returns.
    pub async fn create_named(
        &self,
        owner: &ProfileId,
        service: ServiceType,
        name: &str,
    ) -> Result<ServiceRef, UseCaseError> {
        Ok(match service {
            ServiceType::Menu => ServiceRef::Menu(self.menus.create(owner, name).await?.id),
            ServiceType::Shop => ServiceRef::Shop(self.shops.create(owner, name).await?.id),
            ServiceType::Portfolio => {
                ServiceRef::Portfolio(self.portfolios.create(owner, name).await?.id)
            }
            ServiceType::Cv => ServiceRef::Cv(self.cvs.create(owner, name).await?.id),
            ServiceType::Invitation => {
                let event_date = Utc::now() + Duration::days(DEFAULT_EVENT_LEAD_DAYS);
                ServiceRef::Invitation(
                    self.invitations.create(owner, name, event_date).await?.id,
                )
            }
        })
    }

    /// Delete any service and everything under it.
    ///
    /// # Errors
    ///
    /// Returns `UseCaseError::Repository` if the delete fails.
    pub async fn delete(&self, service: &ServiceRef) -> Result<(), UseCaseError> {
        match service {
            ServiceRef::Menu(id) => self.menus.delete(id).await,
            ServiceRef::Shop(id) => self.shops.delete(id).await,
            ServiceRef::Portfolio(id) => self.portfolios.delete(id).await,
            ServiceRef::Cv(id) => self.cvs.delete(id).await,
            ServiceRef::Invitation(id) => self.invitations.delete(id).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use atomo_core::CreateDecision;

    use super::*;
    use crate::remote::MemoryBackend;
    use crate::repository::SubscriptionRepository;

    async fn services() -> Services<MemoryBackend> {
        let store = LocalStore::in_memory().await.unwrap();
        let backend = MemoryBackend::new();
        let gate = CanCreateService::new(
            store.clone(),
            SubscriptionRepository::new(store.clone(), backend.clone()),
        );
        Services::new(&store, &backend, &gate)
    }

    #[tokio::test]
    async fn test_free_plan_blocks_second_service() {
        let services = services().await;
        let owner = ProfileId::new("user_1");

        let first = services
            .create_named(&owner, ServiceType::Shop, "Corner store")
            .await
            .unwrap();
        assert_eq!(first.service_type(), ServiceType::Shop);

        let second = services.create_named(&owner, ServiceType::Shop, "Another").await;
        assert!(matches!(
            second,
            Err(UseCaseError::LimitReached(CreateDecision::ServiceTypeExists {
                service: ServiceType::Shop
            }))
        ));

        let other_type = services.create_named(&owner, ServiceType::Menu, "Lunch").await;
        assert!(matches!(
            other_type,
            Err(UseCaseError::LimitReached(CreateDecision::TotalLimitReached { limit: 1 }))
        ));
    }

    #[tokio::test]
    async fn test_deleting_frees_the_slot() {
        let services = services().await;
        let owner = ProfileId::new("user_1");

        let cv = services.create_named(&owner, ServiceType::Cv, "Ana").await.unwrap();
        services.delete(&cv).await.unwrap();

        assert!(services.create_named(&owner, ServiceType::Cv, "Ana").await.is_ok());
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected_before_any_write() {
        let services = services().await;
        let result = services
            .create_named(&ProfileId::new("user_1"), ServiceType::Menu, "  ")
            .await;
        assert!(matches!(
            result,
            Err(UseCaseError::Validation { field: "name", .. })
        ));
    }

    #[tokio::test]
    async fn test_child_rows_are_validated() {
        let services = services().await;
        let owner = ProfileId::new("user_1");
        let menu = services.menus.create(&owner, "Dinner").await.unwrap();

        let negative = services
            .menus
            .add_dish(NewDish {
                menu_id: menu.id.clone(),
                category_id: None,
                name: "Soup".to_owned(),
                description: None,
                price: Decimal::new(-100, 2),
                image_url: None,
                sort_order: 0,
            })
            .await;
        assert!(matches!(
            negative,
            Err(UseCaseError::Validation { field: "price", .. })
        ));

        let mut recolored = menu.clone();
        recolored.primary_color = "red".to_owned();
        assert!(services.menus.update(&recolored).await.is_err());
    }

    #[tokio::test]
    async fn test_skill_level_is_checked() {
        let services = services().await;
        let owner = ProfileId::new("user_1");
        let cv = services.cvs.create(&owner, "Ana").await.unwrap();

        assert!(services.cvs.add_skill(&cv.id, "Rust", 6, 0).await.is_err());
        assert!(services.cvs.add_skill(&cv.id, "Rust", 5, 0).await.is_ok());
    }

    #[tokio::test]
    async fn test_guest_count_is_checked() {
        let services = services().await;
        let owner = ProfileId::new("user_1");
        let invitation = services
            .invitations
            .create(&owner, "Party", Utc::now())
            .await
            .unwrap();
        let rsvp = services
            .invitations
            .respond(NewResponse {
                invitation_id: invitation.id,
                guest_name: "Luis".to_owned(),
                status: atomo_core::RsvpStatus::Attending,
                guest_count: 0,
                message: None,
            })
            .await;
        assert!(matches!(
            rsvp,
            Err(UseCaseError::Validation {
                field: "guest_count",
                ..
            })
        ));
    }
}
