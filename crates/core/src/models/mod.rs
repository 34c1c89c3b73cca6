//! Domain models.
//!
//! These are the in-memory shapes handed to use cases and view-models. The
//! wire (DTO) and persisted (row) shapes live in the app crate together with
//! the conversions between them.

pub mod cv;
pub mod invitation;
pub mod menu;
pub mod portfolio;
pub mod profile;
pub mod shop;
pub mod subscription;

pub use cv::{Cv, CvDetails, CvEducation, CvExperience, CvSkill};
pub use invitation::{Invitation, InvitationDetails, InvitationResponse};
pub use menu::{Dish, Menu, MenuCategory, MenuDetails};
pub use portfolio::{Portfolio, PortfolioDetails, PortfolioItem};
pub use profile::Profile;
pub use shop::{Product, Shop, ShopCategory, ShopDetails};
pub use subscription::{FREE_PLAN_ID, Plan, Subscription};
