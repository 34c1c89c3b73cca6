use atomo_core::{Invitation, InvitationResponse};

use super::parse_text;
use crate::error::RepositoryError;
use crate::local::entities::{InvitationEntity, InvitationResponseEntity};
use crate::remote::dto::{InvitationDto, InvitationResponseDto};

impl From<InvitationDto> for Invitation {
    fn from(dto: InvitationDto) -> Self {
        Self {
            id: dto.id,
            user_id: dto.user_id,
            title: dto.title,
            description: dto.description,
            event_date: dto.event_date,
            location: dto.location,
            host_name: dto.host_name,
            cover_image_url: dto.cover_image_url,
            primary_color: dto.primary_color,
            created_at: dto.created_at,
        }
    }
}

impl From<&Invitation> for InvitationDto {
    fn from(invitation: &Invitation) -> Self {
        Self {
            id: invitation.id.clone(),
            user_id: invitation.user_id.clone(),
            title: invitation.title.clone(),
            description: invitation.description.clone(),
            event_date: invitation.event_date,
            location: invitation.location.clone(),
            host_name: invitation.host_name.clone(),
            cover_image_url: invitation.cover_image_url.clone(),
            primary_color: invitation.primary_color.clone(),
            created_at: invitation.created_at,
        }
    }
}

impl From<&Invitation> for InvitationEntity {
    fn from(invitation: &Invitation) -> Self {
        Self {
            id: invitation.id.clone(),
            user_id: invitation.user_id.clone(),
            title: invitation.title.clone(),
            description: invitation.description.clone(),
            event_date: invitation.event_date,
            location: invitation.location.clone(),
            host_name: invitation.host_name.clone(),
            cover_image_url: invitation.cover_image_url.clone(),
            primary_color: invitation.primary_color.clone(),
            created_at: invitation.created_at,
        }
    }
}

impl From<InvitationEntity> for Invitation {
    fn from(row: InvitationEntity) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            event_date: row.event_date,
            location: row.location,
            host_name: row.host_name,
            cover_image_url: row.cover_image_url,
            primary_color: row.primary_color,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Responses
// =============================================================================

impl TryFrom<InvitationResponseDto> for InvitationResponse {
    type Error = RepositoryError;

    fn try_from(dto: InvitationResponseDto) -> Result<Self, Self::Error> {
        Ok(Self {
            status: parse_text(&dto.status)?,
            id: dto.id,
            invitation_id: dto.invitation_id,
            guest_name: dto.guest_name,
            guest_count: dto.guest_count,
            message: dto.message,
            created_at: dto.created_at,
        })
    }
}

impl From<&InvitationResponse> for InvitationResponseDto {
    fn from(response: &InvitationResponse) -> Self {
        Self {
            id: response.id.clone(),
            invitation_id: response.invitation_id.clone(),
            guest_name: response.guest_name.clone(),
            status: response.status.as_str().to_string(),
            guest_count: response.guest_count,
            message: response.message.clone(),
            created_at: response.created_at,
        }
    }
}

impl From<&InvitationResponse> for InvitationResponseEntity {
    fn from(response: &InvitationResponse) -> Self {
        Self {
            id: response.id.clone(),
            invitation_id: response.invitation_id.clone(),
            guest_name: response.guest_name.clone(),
            status: response.status.as_str().to_string(),
            guest_count: response.guest_count,
            message: response.message.clone(),
            created_at: response.created_at,
        }
    }
}

impl TryFrom<InvitationResponseEntity> for InvitationResponse {
    type Error = RepositoryError;

    fn try_from(row: InvitationResponseEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            status: parse_text(&row.status)?,
            id: row.id,
            invitation_id: row.invitation_id,
            guest_name: row.guest_name,
            guest_count: row.guest_count,
            message: row.message,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use atomo_core::{InvitationId, InvitationResponseId, RsvpStatus};

    use super::*;

    fn response_dto(status: &str) -> InvitationResponseDto {
        InvitationResponseDto {
            id: InvitationResponseId::new("r1"),
            invitation_id: InvitationId::new("i1"),
            guest_name: "Ana".to_string(),
            status: status.to_string(),
            guest_count: 2,
            message: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_response_status_is_parsed() {
        let response = InvitationResponse::try_from(response_dto("attending")).unwrap();
        assert_eq!(response.status, RsvpStatus::Attending);
        assert_eq!(InvitationResponseEntity::from(&response).status, "attending");
    }

    #[test]
    fn test_unknown_response_status_is_rejected() {
        assert!(matches!(
            InvitationResponse::try_from(response_dto("yes")),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
