//! Invitation aggregate: Invitation → InvitationResponse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{InvitationId, InvitationResponseId, ProfileId, RsvpStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: InvitationId,
    pub user_id: ProfileId,
    pub title: String,
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub location: Option<String>,
    pub host_name: Option<String>,
    pub cover_image_url: Option<String>,
    pub primary_color: String,
    pub created_at: DateTime<Utc>,
}

/// A guest RSVP. Responses are listed in arrival order (`created_at`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationResponse {
    pub id: InvitationResponseId,
    pub invitation_id: InvitationId,
    pub guest_name: String,
    pub status: RsvpStatus,
    pub guest_count: i32,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationDetails {
    pub invitation: Invitation,
    pub responses: Vec<InvitationResponse>,
}

impl InvitationDetails {
    /// Total headcount of guests who said yes.
    #[must_use]
    pub fn attending_guests(&self) -> i32 {
        self.responses
            .iter()
            .filter(|r| r.status == RsvpStatus::Attending)
            .map(|r| r.guest_count)
            .sum()
    }
}
