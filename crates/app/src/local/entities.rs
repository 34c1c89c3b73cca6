//! Row types for the local SQLite cache.
//!
//! One struct per table, field-for-field with the schema in
//! `migrations/`. Decimals and enums are kept as text here and parsed when
//! converting to domain models.

use chrono::{DateTime, NaiveDate, Utc};

use atomo_core::{
    CvEducationId, CvExperienceId, CvId, CvSkillId, DishId, InvitationId, InvitationResponseId,
    MenuCategoryId, MenuId, PlanId, PortfolioId, PortfolioItemId, ProductId, ProfileId,
    ShopCategoryId, ShopId, SubscriptionId,
};

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProfileEntity {
    pub id: ProfileId,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MenuEntity {
    pub id: MenuId,
    pub user_id: ProfileId,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub font_family: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MenuCategoryEntity {
    pub id: MenuCategoryId,
    pub menu_id: MenuId,
    pub name: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DishEntity {
    pub id: DishId,
    pub menu_id: MenuId,
    pub category_id: Option<MenuCategoryId>,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ShopEntity {
    pub id: ShopId,
    pub user_id: ProfileId,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub font_family: String,
    pub currency: String,
    pub whatsapp_number: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ShopCategoryEntity {
    pub id: ShopCategoryId,
    pub shop_id: ShopId,
    pub name: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProductEntity {
    pub id: ProductId,
    pub shop_id: ShopId,
    pub category_id: Option<ShopCategoryId>,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub image_url: Option<String>,
    pub in_stock: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PortfolioEntity {
    pub id: PortfolioId,
    pub user_id: ProfileId,
    pub title: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub primary_color: String,
    pub font_family: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PortfolioItemEntity {
    pub id: PortfolioItemId,
    pub portfolio_id: PortfolioId,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CvEntity {
    pub id: CvId,
    pub user_id: ProfileId,
    pub full_name: String,
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub photo_url: Option<String>,
    pub primary_color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CvEducationEntity {
    pub id: CvEducationId,
    pub cv_id: CvId,
    pub institution: String,
    pub degree: String,
    pub field_of_study: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CvExperienceEntity {
    pub id: CvExperienceId,
    pub cv_id: CvId,
    pub company: String,
    pub position: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CvSkillEntity {
    pub id: CvSkillId,
    pub cv_id: CvId,
    pub name: String,
    pub level: i32,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct InvitationEntity {
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

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct InvitationResponseEntity {
    pub id: InvitationResponseId,
    pub invitation_id: InvitationId,
    pub guest_name: String,
    pub status: String,
    pub guest_count: i32,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PlanEntity {
    pub id: PlanId,
    pub name: String,
    pub price_monthly: String,
    /// JSON object text.
    pub features: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SubscriptionEntity {
    pub id: SubscriptionId,
    pub user_id: ProfileId,
    pub plan_id: PlanId,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
