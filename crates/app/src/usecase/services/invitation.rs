//! Invitation editing and RSVPs.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use atomo_core::{
    Invitation, InvitationId, InvitationResponse, InvitationResponseId, ProfileId, RsvpStatus,
    ServiceType,
};

use super::DEFAULT_COLOR;
use crate::error::UseCaseError;
use crate::remote::RemoteBackend;
use crate::repository::InvitationRepository;
use crate::usecase::limits::CanCreateService;
use crate::usecase::validate;

/// A guest's answer as submitted.
#[derive(Debug, Clone)]
pub struct NewResponse {
    pub invitation_id: InvitationId,
    pub guest_name: String,
    pub status: RsvpStatus,
    pub guest_count: i32,
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct InvitationService<R> {
    invitations: InvitationRepository<R>,
    gate: CanCreateService<R>,
}

impl<R: RemoteBackend + Clone> InvitationService<R> {
    pub const fn new(invitations: InvitationRepository<R>, gate: CanCreateService<R>) -> Self {
        Self { invitations, gate }
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank title,
    /// `UseCaseError::LimitReached` if the owner's plan is used up, or
    /// `UseCaseError::Repository` if the write fails.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn create(
        &self,
        owner: &ProfileId,
        title: &str,
        event_date: DateTime<Utc>,
    ) -> Result<Invitation, UseCaseError> {
        let title = validate::name("title", title)?;
        self.gate.ensure(owner, ServiceType::Invitation).await?;

        let invitation = Invitation {
            id: InvitationId::generate(),
            user_id: owner.clone(),
            title,
            description: None,
            event_date,
            location: None,
            host_name: None,
            cover_image_url: None,
            primary_color: DEFAULT_COLOR.to_owned(),
            created_at: Utc::now(),
        };

        let stored = self.invitations.create(&invitation).await?;
        info!(invitation_id = %stored.id, "Invitation created");
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank title or a bad color,
    /// or `UseCaseError::Repository` if the write fails.
    pub async fn update(&self, invitation: &Invitation) -> Result<Invitation, UseCaseError> {
        let mut invitation = invitation.clone();
        invitation.title = validate::name("title", &invitation.title)?;
        validate::hex_color("primary_color", &invitation.primary_color)?;
        Ok(self.invitations.update(&invitation).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Repository` if the delete fails.
    pub async fn delete(&self, id: &InvitationId) -> Result<(), UseCaseError> {
        Ok(self.invitations.delete(id).await?)
    }

    /// Record a guest's RSVP.
    ///
    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank guest name or a guest
    /// count below one, or `UseCaseError::Repository` if the write fails.
    pub async fn respond(&self, new: NewResponse) -> Result<InvitationResponse, UseCaseError> {
        validate::guest_count(new.guest_count)?;

        let response = InvitationResponse {
            id: InvitationResponseId::generate(),
            invitation_id: new.invitation_id,
            guest_name: validate::name("guest_name", &new.guest_name)?,
            status: new.status,
            guest_count: new.guest_count,
            message: new.message.filter(|m| !m.trim().is_empty()),
            created_at: Utc::now(),
        };
        Ok(self.invitations.create_response(&response).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for a blank guest name or a guest
    /// count below one, or `UseCaseError::Repository` if the write fails.
    pub async fn update_response(
        &self,
        response: &InvitationResponse,
    ) -> Result<InvitationResponse, UseCaseError> {
        let mut response = response.clone();
        response.guest_name = validate::name("guest_name", &response.guest_name)?;
        validate::guest_count(response.guest_count)?;
        Ok(self.invitations.update_response(&response).await?)
    }

    /// # Errors
    ///
    /// Returns `UseCaseError::Repository` if the delete fails.
    pub async fn delete_response(&self, id: &InvitationResponseId) -> Result<(), UseCaseError> {
        Ok(self.invitations.delete_response(id).await?)
    }
}
