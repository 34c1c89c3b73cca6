//! Atomo data layer.
//!
//! Local-first repositories for the five service types (menus, portfolios,
//! CVs, shops, invitations) plus profiles and subscriptions, backed by a
//! `SQLite` cache and a Supabase-style REST backend. Use cases add
//! validation and the plan limit gate; view-models turn them into reactive
//! per-screen state.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod conversions;
pub mod error;
pub mod local;
pub mod remote;
pub mod repository;
pub mod state;
pub mod usecase;
pub mod viewmodel;

pub use state::{AppState, StateError};
