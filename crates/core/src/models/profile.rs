//! User profile shared by every service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ProfileId;

/// The owner of every service. One per account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
