//! Supabase client: PostgREST tables and the storage API.
//!
//! Tables are served under `{url}/rest/v1/{table}` and filtered with
//! `column=eq.value`. Every request carries the anon key both as `apikey`
//! and as a bearer token.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::Value as JsonValue;
use tracing::{debug, instrument};

use super::storage::BlobStorage;
use super::{Filter, RemoteBackend, RemoteError};
use crate::config::SupabaseConfig;
use crate::local::Table;

/// Ask PostgREST to echo written rows back.
const RETURN_REPRESENTATION: &str = "return=representation";

/// Longest slice of an error body kept in logs and errors.
const MAX_ERROR_BODY: usize = 500;

// =============================================================================
// SupabaseClient
// =============================================================================

/// Client for the Supabase REST (PostgREST) API.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    rest_url: String,
}

impl SupabaseClient {
    /// Create a new REST client.
    ///
    /// # Errors
    ///
    /// Returns error if the anon key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, RemoteError> {
        Ok(Self {
            inner: Arc::new(SupabaseClientInner {
                client: build_client(config)?,
                rest_url: format!("{}/rest/v1", config.base_url()),
            }),
        })
    }

    /// URL for `table` with the equality filters applied.
    fn table_url(&self, table: Table, filters: &[Filter]) -> String {
        let mut url = format!("{}/{}?select=*", self.inner.rest_url, table.name());
        for filter in filters {
            url.push('&');
            url.push_str(filter.column);
            url.push_str("=eq.");
            url.push_str(&urlencoding::encode(&filter.value));
        }
        url
    }

    /// First row of a `return=representation` response.
    async fn single_row(
        response: reqwest::Response,
        table: Table,
    ) -> Result<JsonValue, RemoteError> {
        let rows: Vec<JsonValue> = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))?;

        rows.into_iter()
            .next()
            .ok_or_else(|| RemoteError::NotFound(table.name().to_string()))
    }
}

impl RemoteBackend for SupabaseClient {
    #[instrument(skip(self, filters), fields(table = %table))]
    async fn select(&self, table: Table, filters: &[Filter]) -> Result<Vec<JsonValue>, RemoteError> {
        let url = self.table_url(table, filters);
        let response = self.inner.client.get(&url).send().await?;

        let rows: Vec<JsonValue> = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))?;

        debug!(rows = rows.len(), "Fetched rows");
        Ok(rows)
    }

    #[instrument(skip(self, row), fields(table = %table))]
    async fn insert(&self, table: Table, row: JsonValue) -> Result<JsonValue, RemoteError> {
        let url = format!("{}/{}", self.inner.rest_url, table.name());
        let response = self
            .inner
            .client
            .post(&url)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&row)
            .send()
            .await?;

        Self::single_row(response, table).await
    }

    #[instrument(skip(self, filters, row), fields(table = %table))]
    async fn update(
        &self,
        table: Table,
        filters: &[Filter],
        row: JsonValue,
    ) -> Result<JsonValue, RemoteError> {
        let url = self.table_url(table, filters);
        let response = self
            .inner
            .client
            .patch(&url)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&row)
            .send()
            .await?;

        Self::single_row(response, table).await
    }

    #[instrument(skip(self, filters), fields(table = %table))]
    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<(), RemoteError> {
        let url = self.table_url(table, filters);
        let response = self.inner.client.delete(&url).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

// =============================================================================
// SupabaseStorage
// =============================================================================

/// Client for the Supabase storage API, bound to one bucket.
#[derive(Clone)]
pub struct SupabaseStorage {
    inner: Arc<SupabaseStorageInner>,
}

struct SupabaseStorageInner {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
}

impl SupabaseStorage {
    /// Create a new storage client.
    ///
    /// # Errors
    ///
    /// Returns error if the anon key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, RemoteError> {
        Ok(Self {
            inner: Arc::new(SupabaseStorageInner {
                client: build_client(config)?,
                base_url: config.base_url().to_string(),
                bucket: config.storage_bucket.clone(),
            }),
        })
    }
}

impl BlobStorage for SupabaseStorage {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, RemoteError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.inner.base_url,
            self.inner.bucket,
            encode_path(path)
        );

        let response = self
            .inner
            .client
            .post(&url)
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;
        check_status(response).await?;

        debug!("Uploaded object");
        Ok(self.public_url(path))
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.inner.base_url,
            self.inner.bucket,
            encode_path(path)
        )
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// HTTP client with the Supabase auth headers set.
fn build_client(config: &SupabaseConfig) -> Result<reqwest::Client, RemoteError> {
    let key = config.anon_key.expose_secret();
    let mut headers = HeaderMap::new();

    let mut apikey = HeaderValue::from_str(key)
        .map_err(|e| RemoteError::Parse(format!("Invalid anon key format: {e}")))?;
    apikey.set_sensitive(true);
    headers.insert("apikey", apikey);

    let mut bearer = HeaderValue::from_str(&format!("Bearer {key}"))
        .map_err(|e| RemoteError::Parse(format!("Invalid anon key format: {e}")))?;
    bearer.set_sensitive(true);
    headers.insert(AUTHORIZATION, bearer);

    Ok(reqwest::Client::builder().default_headers(headers).build()?)
}

/// Turn a non-success response into `RemoteError::Api`.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message: String = body.chars().take(MAX_ERROR_BODY).collect();
    tracing::error!(status = %status, body = %message, "Supabase returned non-success status");

    Err(RemoteError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Percent-encode each segment of an object path, keeping the slashes.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use url::Url;

    use super::*;

    fn config() -> SupabaseConfig {
        SupabaseConfig {
            url: Url::parse("https://abc.supabase.co/").unwrap(),
            anon_key: SecretString::from("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.k3y"),
            storage_bucket: "atomo".to_string(),
        }
    }

    #[test]
    fn test_table_url_with_filters() {
        let client = SupabaseClient::new(&config()).unwrap();
        let url = client.table_url(
            Table::Menus,
            &[Filter::eq("user_id", "user 1"), Filter::eq("id", "m1")],
        );
        assert_eq!(
            url,
            "https://abc.supabase.co/rest/v1/menus?select=*&user_id=eq.user%201&id=eq.m1"
        );
    }

    #[test]
    fn test_table_url_without_filters() {
        let client = SupabaseClient::new(&config()).unwrap();
        assert_eq!(
            client.table_url(Table::Plans, &[]),
            "https://abc.supabase.co/rest/v1/plans?select=*"
        );
    }

    #[test]
    fn test_public_url() {
        let storage = SupabaseStorage::new(&config()).unwrap();
        assert_eq!(
            storage.public_url("user_1/menu/my logo.png"),
            "https://abc.supabase.co/storage/v1/object/public/atomo/user_1/menu/my%20logo.png"
        );
    }

    #[test]
    fn test_encode_path_keeps_separators() {
        assert_eq!(encode_path("a/b c/d"), "a/b%20c/d");
    }
}
