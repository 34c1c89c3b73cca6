//! Use cases: the operations view-models and the CLI call.
//!
//! Use cases validate input, apply the plan limits and then delegate to the
//! repositories. They never touch SQL or HTTP directly.

pub mod dashboard;
pub mod images;
pub mod limits;
pub mod plan;
pub mod services;
pub mod sync;

pub(crate) mod validate;

pub use dashboard::{DashboardSummary, ObserveServices, ServiceSummary};
pub use images::UploadImage;
pub use limits::CanCreateService;
pub use plan::UpgradePlan;
pub use services::Services;
pub use sync::{StepOutcome, SyncAll, SyncReport, SyncStep};
