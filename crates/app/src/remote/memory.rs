//! In-process backend and storage.
//!
//! Behaves like the REST backend for the operations the repositories use:
//! equality filters, insert echoing the stored row, update replacing the
//! given fields, delete by filter. Writes can be switched to fail so tests
//! can check that nothing reaches the local cache.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value as JsonValue;
use tokio::sync::Mutex;

use super::storage::BlobStorage;
use super::{Filter, RemoteBackend, RemoteError};
use crate::local::Table;

/// Status code reported by forced failures.
const UNAVAILABLE: u16 = 503;

fn unavailable() -> RemoteError {
    RemoteError::Api {
        status: UNAVAILABLE,
        message: "backend unavailable".to_string(),
    }
}

// =============================================================================
// MemoryBackend
// =============================================================================

/// In-memory [`RemoteBackend`].
///
/// Clones share the same tables.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    tables: Arc<Mutex<HashMap<Table, Vec<JsonValue>>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every insert, update and delete fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every select fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Put a row straight into a table, bypassing the failure switches.
    pub async fn seed(&self, table: Table, row: JsonValue) {
        let mut tables = self.tables.lock().await;
        let rows = tables.entry(table).or_default();
        let id = row.get("id").cloned();
        rows.retain(|existing| id.is_none() || existing.get("id") != id.as_ref());
        rows.push(row);
    }

    /// Every row of `table`.
    pub async fn rows(&self, table: Table) -> Vec<JsonValue> {
        self.tables
            .lock()
            .await
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    fn check(&self, flag: &AtomicBool) -> Result<(), RemoteError> {
        if flag.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

impl RemoteBackend for MemoryBackend {
    async fn select(&self, table: Table, filters: &[Filter]) -> Result<Vec<JsonValue>, RemoteError> {
        self.check(&self.fail_reads)?;

        let tables = self.tables.lock().await;
        Ok(tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| filters.iter().all(|f| f.matches(row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, table: Table, row: JsonValue) -> Result<JsonValue, RemoteError> {
        self.check(&self.fail_writes)?;

        let id = row.get("id").cloned();
        let mut tables = self.tables.lock().await;
        let rows = tables.entry(table).or_default();
        if id.is_some() && rows.iter().any(|existing| existing.get("id") == id.as_ref()) {
            return Err(RemoteError::Api {
                status: 409,
                message: format!("duplicate key in {table}"),
            });
        }
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        table: Table,
        filters: &[Filter],
        row: JsonValue,
    ) -> Result<JsonValue, RemoteError> {
        self.check(&self.fail_writes)?;

        let mut tables = self.tables.lock().await;
        let mut updated = None;
        for existing in tables.entry(table).or_default().iter_mut() {
            if !filters.iter().all(|f| f.matches(existing)) {
                continue;
            }
            if let (Some(target), Some(fields)) = (existing.as_object_mut(), row.as_object()) {
                for (key, value) in fields {
                    target.insert(key.clone(), value.clone());
                }
            }
            updated.get_or_insert_with(|| existing.clone());
        }

        updated.ok_or_else(|| RemoteError::NotFound(table.name().to_string()))
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<(), RemoteError> {
        self.check(&self.fail_writes)?;

        let mut tables = self.tables.lock().await;
        if let Some(rows) = tables.get_mut(&table) {
            rows.retain(|row| !filters.iter().all(|f| f.matches(row)));
        }
        Ok(())
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-memory [`BlobStorage`].
#[derive(Clone, Debug)]
pub struct MemoryStorage {
    base_url: String,
    objects: Arc<Mutex<BTreeMap<String, (String, Vec<u8>)>>>,
    fail_uploads: Arc<AtomicBool>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new("memory://atomo")
    }
}

impl MemoryStorage {
    /// Storage whose public URLs start with `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: Arc::default(),
            fail_uploads: Arc::default(),
        }
    }

    /// Make every upload fail.
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Content type and bytes stored at `path`.
    pub async fn object(&self, path: &str) -> Option<(String, Vec<u8>)> {
        self.objects.lock().await.get(path).cloned()
    }
}

impl BlobStorage for MemoryStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, RemoteError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }

        self.objects
            .lock()
            .await
            .insert(path.to_string(), (content_type.to_string(), bytes));
        Ok(self.public_url(path))
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_select_applies_every_filter() {
        let backend = MemoryBackend::new();
        backend
            .seed(Table::Menus, json!({ "id": "m1", "user_id": "user_1" }))
            .await;
        backend
            .seed(Table::Menus, json!({ "id": "m2", "user_id": "user_2" }))
            .await;

        let rows = backend
            .select(Table::Menus, &[Filter::eq("user_id", "user_1")])
            .await
            .unwrap();
        assert_eq!(rows, vec![json!({ "id": "m1", "user_id": "user_1" })]);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id() {
        let backend = MemoryBackend::new();
        backend.insert(Table::Menus, json!({ "id": "m1" })).await.unwrap();

        let err = backend
            .insert(Table::Menus, json!({ "id": "m1" }))
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Api { status: 409, .. }));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let backend = MemoryBackend::new();
        backend
            .seed(Table::Menus, json!({ "id": "m1", "name": "Old", "user_id": "u" }))
            .await;

        let stored = backend
            .update(Table::Menus, &[Filter::eq("id", "m1")], json!({ "name": "New" }))
            .await
            .unwrap();
        assert_eq!(stored, json!({ "id": "m1", "name": "New", "user_id": "u" }));
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let backend = MemoryBackend::new();
        let err = backend
            .update(Table::Menus, &[Filter::eq("id", "nope")], json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_failing_writes_leave_tables_untouched() {
        let backend = MemoryBackend::new();
        backend.fail_writes(true);

        assert!(backend.insert(Table::Menus, json!({ "id": "m1" })).await.is_err());
        assert!(backend.rows(Table::Menus).await.is_empty());
    }

    #[tokio::test]
    async fn test_storage_upload_returns_public_url() {
        let storage = MemoryStorage::new("https://cdn.test");
        let url = storage
            .upload("user_1/menu/logo.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();

        assert_eq!(url, "https://cdn.test/user_1/menu/logo.png");
        let (content_type, bytes) = storage.object("user_1/menu/logo.png").await.unwrap();
        assert_eq!(content_type, "image/png");
        assert_eq!(bytes, vec![1, 2, 3]);
    }
}
