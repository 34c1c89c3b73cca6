//! Wire shapes for backend rows.
//!
//! Field names are the backend's snake_case column names. Enum-like columns
//! (statuses) and the plan feature map travel as raw strings / JSON and are
//! parsed in `conversions`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use atomo_core::{
    CvEducationId, CvExperienceId, CvId, CvSkillId, DishId, InvitationId, InvitationResponseId,
    MenuCategoryId, MenuId, PlanId, PortfolioId, PortfolioItemId, ProductId, ProfileId,
    ShopCategoryId, ShopId, SubscriptionId,
};

const fn default_true() -> bool {
    true
}

const fn default_one() -> i32 {
    1
}

const fn default_skill_level() -> i32 {
    3
}

fn default_features() -> JsonValue {
    JsonValue::Object(serde_json::Map::new())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDto {
    pub id: ProfileId,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Menus
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuDto {
    pub id: MenuId,
    pub user_id: ProfileId,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub font_family: String,
    #[serde(default)]
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuCategoryDto {
    pub id: MenuCategoryId,
    pub menu_id: MenuId,
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DishDto {
    pub id: DishId,
    pub menu_id: MenuId,
    pub category_id: Option<MenuCategoryId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Shops
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopDto {
    pub id: ShopId,
    pub user_id: ProfileId,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub font_family: String,
    pub currency: String,
    pub whatsapp_number: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopCategoryDto {
    pub id: ShopCategoryId,
    pub shop_id: ShopId,
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDto {
    pub id: ProductId,
    pub shop_id: ShopId,
    pub category_id: Option<ShopCategoryId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    #[serde(default)]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Portfolios
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioDto {
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
pub struct PortfolioItemDto {
    pub id: PortfolioItemId,
    pub portfolio_id: PortfolioId,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// CVs
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvDto {
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvEducationDto {
    pub id: CvEducationId,
    pub cv_id: CvId,
    pub institution: String,
    pub degree: String,
    pub field_of_study: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvExperienceDto {
    pub id: CvExperienceId,
    pub cv_id: CvId,
    pub company: String,
    pub position: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvSkillDto {
    pub id: CvSkillId,
    pub cv_id: CvId,
    pub name: String,
    #[serde(default = "default_skill_level")]
    pub level: i32,
    #[serde(default)]
    pub sort_order: i32,
}

// =============================================================================
// Invitations
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationDto {
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationResponseDto {
    pub id: InvitationResponseId,
    pub invitation_id: InvitationId,
    pub guest_name: String,
    pub status: String,
    #[serde(default = "default_one")]
    pub guest_count: i32,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Plans & subscriptions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDto {
    pub id: PlanId,
    pub name: String,
    pub price_monthly: Decimal,
    #[serde(default = "default_features")]
    pub features: JsonValue,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionDto {
    pub id: SubscriptionId,
    pub user_id: ProfileId,
    pub plan_id: PlanId,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_dish_defaults_for_omitted_columns() {
        let dish: DishDto = serde_json::from_value(json!({
            "id": "d1",
            "menu_id": "m1",
            "name": "Soup",
            "price": 4.5,
            "created_at": "2026-01-01T10:00:00+00:00"
        }))
        .unwrap();

        assert!(dish.is_available);
        assert_eq!(dish.sort_order, 0);
        assert!(dish.category_id.is_none());
        assert_eq!(dish.price.to_string(), "4.5");
    }

    #[test]
    fn test_plan_features_default_to_empty_object() {
        let plan: PlanDto = serde_json::from_value(json!({
            "id": "free",
            "name": "Free",
            "price_monthly": "0"
        }))
        .unwrap();

        assert_eq!(plan.features, json!({}));
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let now = Utc::now();
        let category = MenuCategoryDto {
            id: MenuCategoryId::new("c1"),
            menu_id: MenuId::new("m1"),
            name: "Starters".to_owned(),
            sort_order: 2,
            created_at: now,
        };

        let value = serde_json::to_value(&category).unwrap();
        assert_eq!(value["id"], "c1");
        assert_eq!(value["menu_id"], "m1");
        assert_eq!(value["sort_order"], 2);
    }
}
