//! Typed query objects over the local cache, one per aggregate.
//!
//! All writes are upserts keyed by id (`INSERT ... ON CONFLICT(id) DO
//! UPDATE`), never `INSERT OR REPLACE`: a replace deletes the old row first,
//! which would fire `ON DELETE CASCADE` on its children.

pub mod cv;
pub mod invitation;
pub mod menu;
pub mod portfolio;
pub mod profile;
pub mod shop;
pub mod subscription;

pub use cv::CvDao;
pub use invitation::InvitationDao;
pub use menu::MenuDao;
pub use portfolio::PortfolioDao;
pub use profile::ProfileDao;
pub use shop::ShopDao;
pub use subscription::SubscriptionDao;

/// Convert a `COUNT(*)` result to `u32`.
pub(crate) fn count_to_u32(count: i64) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
