//! Core types for Atomo.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod plan;
pub mod service;
pub mod status;

pub use id::*;
pub use plan::{Limit, MAX_SERVICES, PlanFeatures};
pub use service::{ServiceRef, ServiceType};
pub use status::*;
