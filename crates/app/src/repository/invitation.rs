//! Invitation repository: invitations with their RSVPs.

use futures::Stream;
use tracing::{info, instrument, warn};

use atomo_core::{
    Invitation, InvitationDetails, InvitationId, InvitationResponse, InvitationResponseId,
    ProfileId,
};

use super::watch_tables;
use crate::conversions::try_convert_all;
use crate::error::RepositoryError;
use crate::local::dao::InvitationDao;
use crate::local::entities::{InvitationEntity, InvitationResponseEntity};
use crate::local::{LocalStore, Table};
use crate::remote::dto::{InvitationDto, InvitationResponseDto};
use crate::remote::{self, Filter, RemoteBackend};

const TABLES: &[Table] = &[Table::Invitations, Table::InvitationResponses];

/// Local-first access to invitations.
#[derive(Clone)]
pub struct InvitationRepository<R> {
    local: LocalStore,
    remote: R,
}

impl<R: RemoteBackend + Clone> InvitationRepository<R> {
    pub const fn new(local: LocalStore, remote: R) -> Self {
        Self { local, remote }
    }

    fn dao(&self) -> InvitationDao<'_> {
        InvitationDao::new(&self.local)
    }

    /// A cached invitation with its responses in arrival order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Local` if a query fails, or
    /// `RepositoryError::DataCorruption` if a cached RSVP status is unknown.
    pub async fn get(&self, id: &InvitationId) -> Result<Option<InvitationDetails>, RepositoryError> {
        match self.dao().get(id).await? {
            Some(row) => Ok(Some(load_details(&self.local, row).await?)),
            None => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Local` if the query fails.
    pub async fn list(&self, owner: &ProfileId) -> Result<Vec<Invitation>, RepositoryError> {
        let rows = self.dao().list_by_owner(owner).await?;
        Ok(rows.into_iter().map(Invitation::from).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Local` if the query fails.
    pub async fn count(&self, owner: &ProfileId) -> Result<u32, RepositoryError> {
        Ok(self.dao().count_by_owner(owner).await?)
    }

    pub fn observe(
        &self,
        owner: &ProfileId,
    ) -> impl Stream<Item = Vec<InvitationDetails>> + Send + 'static {
        let store = self.local.clone();
        let owner = owner.clone();

        watch_tables(&self.local, TABLES, move || {
            let store = store.clone();
            let owner = owner.clone();
            async move {
                load_all(&store, &owner).await.unwrap_or_else(|e| {
                    warn!(error = %e, owner = %owner, "Failed to load invitations");
                    Vec::new()
                })
            }
        })
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, invitation), fields(invitation_id = %invitation.id))]
    pub async fn create(&self, invitation: &Invitation) -> Result<Invitation, RepositoryError> {
        let stored: Invitation =
            remote::insert(&self.remote, Table::Invitations, &InvitationDto::from(invitation))
                .await?
                .into();
        self.dao().upsert_all(&[InvitationEntity::from(&stored)]).await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, invitation), fields(invitation_id = %invitation.id))]
    pub async fn update(&self, invitation: &Invitation) -> Result<Invitation, RepositoryError> {
        let stored: Invitation = remote::update(
            &self.remote,
            Table::Invitations,
            invitation.id.as_str(),
            &InvitationDto::from(invitation),
        )
        .await?
        .into();
        self.dao().upsert_all(&[InvitationEntity::from(&stored)]).await?;
        Ok(stored)
    }

    /// Delete an invitation and every response to it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &InvitationId) -> Result<(), RepositoryError> {
        remote::delete(&self.remote, Table::Invitations, id.as_str()).await?;
        self.dao().delete(id).await?;
        Ok(())
    }

    /// Record an RSVP.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails, or
    /// if the backend echoes a status this client does not know.
    #[instrument(skip(self, response), fields(response_id = %response.id, invitation_id = %response.invitation_id))]
    pub async fn create_response(
        &self,
        response: &InvitationResponse,
    ) -> Result<InvitationResponse, RepositoryError> {
        let echoed: InvitationResponseDto = remote::insert(
            &self.remote,
            Table::InvitationResponses,
            &InvitationResponseDto::from(response),
        )
        .await?;
        let stored = InvitationResponse::try_from(echoed)?;
        self.dao()
            .upsert_responses(&[InvitationResponseEntity::from(&stored)])
            .await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, response), fields(response_id = %response.id))]
    pub async fn update_response(
        &self,
        response: &InvitationResponse,
    ) -> Result<InvitationResponse, RepositoryError> {
        let echoed: InvitationResponseDto = remote::update(
            &self.remote,
            Table::InvitationResponses,
            response.id.as_str(),
            &InvitationResponseDto::from(response),
        )
        .await?;
        let stored = InvitationResponse::try_from(echoed)?;
        self.dao()
            .upsert_responses(&[InvitationResponseEntity::from(&stored)])
            .await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self))]
    pub async fn delete_response(&self, id: &InvitationResponseId) -> Result<(), RepositoryError> {
        remote::delete(&self.remote, Table::InvitationResponses, id.as_str()).await?;
        self.dao().delete_response(id).await?;
        Ok(())
    }

    /// Pull the owner's invitations, then the responses to each.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on the first failed pull, unknown RSVP
    /// status or cache write.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn sync(&self, owner: &ProfileId) -> Result<Vec<Invitation>, RepositoryError> {
        let dtos: Vec<InvitationDto> =
            remote::fetch(&self.remote, Table::Invitations, &[Filter::eq("user_id", owner)])
                .await?;
        let invitations: Vec<Invitation> = dtos.into_iter().map(Invitation::from).collect();

        let rows: Vec<InvitationEntity> = invitations.iter().map(InvitationEntity::from).collect();
        self.dao().upsert_all(&rows).await?;

        let mut response_count = 0usize;
        for invitation in &invitations {
            let dtos: Vec<InvitationResponseDto> = remote::fetch(
                &self.remote,
                Table::InvitationResponses,
                &[Filter::eq("invitation_id", &invitation.id)],
            )
            .await?;
            let responses: Vec<InvitationResponse> = try_convert_all(dtos)?;
            let rows: Vec<InvitationResponseEntity> =
                responses.iter().map(InvitationResponseEntity::from).collect();
            response_count += rows.len();
            self.dao().upsert_responses(&rows).await?;
        }

        info!(
            invitations = invitations.len(),
            responses = response_count,
            "Synced invitations"
        );
        Ok(invitations)
    }
}

async fn load_details(
    store: &LocalStore,
    row: InvitationEntity,
) -> Result<InvitationDetails, RepositoryError> {
    let responses = try_convert_all(InvitationDao::new(store).list_responses(&row.id).await?)?;

    Ok(InvitationDetails {
        invitation: Invitation::from(row),
        responses,
    })
}

async fn load_all(
    store: &LocalStore,
    owner: &ProfileId,
) -> Result<Vec<InvitationDetails>, RepositoryError> {
    let rows = InvitationDao::new(store).list_by_owner(owner).await?;

    let mut all = Vec::with_capacity(rows.len());
    for row in rows {
        all.push(load_details(store, row).await?);
    }
    Ok(all)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};
    use serde_json::json;

    use atomo_core::RsvpStatus;

    use super::*;
    use crate::remote::MemoryBackend;

    fn invitation() -> Invitation {
        Invitation {
            id: InvitationId::generate(),
            user_id: ProfileId::new("user_1"),
            title: "Birthday".to_string(),
            description: None,
            event_date: Utc::now() + Duration::days(30),
            location: Some("Rooftop".to_string()),
            host_name: None,
            cover_image_url: None,
            primary_color: "#FF00AA".to_string(),
            created_at: Utc::now(),
        }
    }

    fn rsvp(invitation: &Invitation, guest: &str, status: RsvpStatus, guests: i32) -> InvitationResponse {
        InvitationResponse {
            id: InvitationResponseId::generate(),
            invitation_id: invitation.id.clone(),
            guest_name: guest.to_string(),
            status,
            guest_count: guests,
            message: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_responses_are_counted_per_status() {
        let store = LocalStore::in_memory().await.unwrap();
        let repo = InvitationRepository::new(store, MemoryBackend::new());
        let invitation = invitation();
        repo.create(&invitation).await.unwrap();

        repo.create_response(&rsvp(&invitation, "Ana", RsvpStatus::Attending, 2))
            .await
            .unwrap();
        repo.create_response(&rsvp(&invitation, "Luis", RsvpStatus::Declined, 1))
            .await
            .unwrap();

        let details = repo.get(&invitation.id).await.unwrap().unwrap();
        assert_eq!(details.responses.len(), 2);
        assert_eq!(details.attending_guests(), 2);
    }

    #[tokio::test]
    async fn test_sync_rejects_unknown_rsvp_status() {
        let store = LocalStore::in_memory().await.unwrap();
        let backend = MemoryBackend::new();
        let repo = InvitationRepository::new(store, backend.clone());
        let invitation = invitation();

        backend
            .seed(
                Table::Invitations,
                serde_json::to_value(InvitationDto::from(&invitation)).unwrap(),
            )
            .await;
        backend
            .seed(
                Table::InvitationResponses,
                json!({
                    "id": "r1",
                    "invitation_id": invitation.id,
                    "guest_name": "Ana",
                    "status": "perhaps",
                    "guest_count": 1,
                    "created_at": Utc::now(),
                }),
            )
            .await;

        assert!(matches!(
            repo.sync(&invitation.user_id).await,
            Err(RepositoryError::DataCorruption(_))
        ));
        // The parent row was committed before the bad child was seen.
        assert!(repo.get(&invitation.id).await.unwrap().is_some());
    }
}
