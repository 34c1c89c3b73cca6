//! Remote backend: a PostgREST-style REST API plus blob storage.
//!
//! Repositories talk to the backend through [`RemoteBackend`], which works
//! on untyped JSON rows. The typed helpers in this module (de)serialize the
//! snake_case DTOs in [`dto`] on top of it.
//!
//! Two implementations ship with the crate:
//!
//! - [`SupabaseClient`]: the real HTTP client.
//! - [`MemoryBackend`] / [`MemoryStorage`]: in-process fakes for tests and
//!   offline demos.

pub mod dto;
pub mod memory;
pub mod storage;
pub mod supabase;

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::local::Table;

pub use memory::{MemoryBackend, MemoryStorage};
pub use storage::{BlobStorage, object_path};
pub use supabase::{SupabaseClient, SupabaseStorage};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Backend returned no row where one was expected.
    #[error("No row returned from {0}")]
    NotFound(String),

    /// Failed to encode a request or parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// An equality filter, sent as `column=eq.value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: &'static str,
    pub value: String,
}

impl Filter {
    /// `column = value`.
    pub fn eq(column: &'static str, value: impl ToString) -> Self {
        Self {
            column,
            value: value.to_string(),
        }
    }

    /// Whether a JSON row satisfies this filter.
    #[must_use]
    pub fn matches(&self, row: &JsonValue) -> bool {
        match row.get(self.column) {
            Some(JsonValue::String(s)) => *s == self.value,
            Some(JsonValue::Null) | None => false,
            Some(other) => other.to_string() == self.value,
        }
    }
}

/// Table-level operations on the backend.
///
/// Rows are JSON objects with snake_case keys. Inserts and updates return
/// the row as stored by the backend.
pub trait RemoteBackend: Send + Sync + 'static {
    /// All rows of `table` matching every filter.
    fn select(
        &self,
        table: Table,
        filters: &[Filter],
    ) -> impl Future<Output = Result<Vec<JsonValue>, RemoteError>> + Send;

    /// Insert one row.
    fn insert(
        &self,
        table: Table,
        row: JsonValue,
    ) -> impl Future<Output = Result<JsonValue, RemoteError>> + Send;

    /// Replace the fields of the rows matching `filters`.
    fn update(
        &self,
        table: Table,
        filters: &[Filter],
        row: JsonValue,
    ) -> impl Future<Output = Result<JsonValue, RemoteError>> + Send;

    /// Delete the rows matching `filters`.
    fn delete(
        &self,
        table: Table,
        filters: &[Filter],
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

// =============================================================================
// Typed helpers
// =============================================================================

fn to_row<T: Serialize>(dto: &T) -> Result<JsonValue, RemoteError> {
    serde_json::to_value(dto).map_err(|e| RemoteError::Parse(e.to_string()))
}

fn from_row<T: DeserializeOwned>(row: JsonValue) -> Result<T, RemoteError> {
    serde_json::from_value(row).map_err(|e| RemoteError::Parse(e.to_string()))
}

/// Select and deserialize rows.
///
/// # Errors
///
/// Returns `RemoteError` if the request fails or a row does not parse.
pub async fn fetch<R, T>(
    backend: &R,
    table: Table,
    filters: &[Filter],
) -> Result<Vec<T>, RemoteError>
where
    R: RemoteBackend,
    T: DeserializeOwned,
{
    backend
        .select(table, filters)
        .await?
        .into_iter()
        .map(from_row)
        .collect()
}

/// Insert a DTO and return the stored representation.
///
/// # Errors
///
/// Returns `RemoteError` if the request fails or the echoed row does not
/// parse.
pub async fn insert<R, T>(backend: &R, table: Table, dto: &T) -> Result<T, RemoteError>
where
    R: RemoteBackend,
    T: Serialize + DeserializeOwned,
{
    let stored = backend.insert(table, to_row(dto)?).await?;
    from_row(stored)
}

/// Replace the row with `id` and return the stored representation.
///
/// # Errors
///
/// Returns `RemoteError` if the request fails, no row matched, or the
/// echoed row does not parse.
pub async fn update<R, T>(backend: &R, table: Table, id: &str, dto: &T) -> Result<T, RemoteError>
where
    R: RemoteBackend,
    T: Serialize + DeserializeOwned,
{
    let stored = backend
        .update(table, &[Filter::eq("id", id)], to_row(dto)?)
        .await?;
    from_row(stored)
}

/// Delete the row with `id`.
///
/// # Errors
///
/// Returns `RemoteError` if the request fails.
pub async fn delete<R: RemoteBackend>(backend: &R, table: Table, id: &str) -> Result<(), RemoteError> {
    backend.delete(table, &[Filter::eq("id", id)]).await
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_filter_matches_string_column() {
        let row = json!({ "id": "m1", "user_id": "user_1" });
        assert!(Filter::eq("user_id", "user_1").matches(&row));
        assert!(!Filter::eq("user_id", "user_2").matches(&row));
    }

    #[test]
    fn test_filter_matches_non_string_column() {
        let row = json!({ "sort_order": 3, "is_published": true });
        assert!(Filter::eq("sort_order", 3).matches(&row));
        assert!(Filter::eq("is_published", true).matches(&row));
    }

    #[test]
    fn test_filter_never_matches_null_or_missing() {
        let row = json!({ "category_id": null });
        assert!(!Filter::eq("category_id", "null").matches(&row));
        assert!(!Filter::eq("missing", "x").matches(&row));
    }
}
