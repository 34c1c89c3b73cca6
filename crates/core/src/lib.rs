//! Atomo Core - Shared types library.
//!
//! This crate provides the types used across all Atomo components:
//! - `app` - Local-first data layer (SQLite cache, backend client, use cases)
//! - `cli` - Command-line tools for migrations, sync and inspection
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, service types, statuses and plan features
//! - [`models`] - Domain models for every aggregate
//! - [`limits`] - The subscription limit gate

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod limits;
pub mod models;
pub mod types;

pub use limits::{CreateDecision, ServiceCounts, can_create};
pub use models::*;
pub use types::*;
