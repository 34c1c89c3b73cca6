//! Portfolio aggregate: Portfolio → PortfolioItem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{PortfolioId, PortfolioItemId, ProfileId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: PortfolioId,
    pub user_id: ProfileId,
    pub title: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub primary_color: String,
    pub font_family: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub id: PortfolioItemId,
    pub portfolio_id: PortfolioId,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioDetails {
    pub portfolio: Portfolio,
    pub items: Vec<PortfolioItem>,
}
