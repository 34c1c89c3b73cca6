//! Blob storage for uploaded images.
//!
//! Every object lives in one bucket under `{owner_id}/{service}/{file_name}`.

use std::future::Future;

use atomo_core::{ProfileId, ServiceType};

use super::RemoteError;

/// Object storage with public read URLs.
pub trait BlobStorage: Send + Sync + 'static {
    /// Store `bytes` at `path`, replacing any existing object, and return
    /// its public URL.
    fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<String, RemoteError>> + Send;

    /// Public URL of the object at `path`.
    fn public_url(&self, path: &str) -> String;
}

/// Object path for an owner's service asset.
#[must_use]
pub fn object_path(owner: &ProfileId, service: ServiceType, file_name: &str) -> String {
    format!("{owner}/{service}/{file_name}")
}

/// Content type guessed from the file extension.
#[must_use]
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path_layout() {
        let owner = ProfileId::new("user_1");
        assert_eq!(
            object_path(&owner, ServiceType::Menu, "logo.png"),
            "user_1/menu/logo.png"
        );
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.PNG"), "image/png");
        assert_eq!(content_type_for("photo.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
