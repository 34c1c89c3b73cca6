//! Uploading service images.

use tracing::{info, instrument};

use atomo_core::{ProfileId, ServiceType};

use crate::error::UseCaseError;
use crate::remote::storage::content_type_for;
use crate::remote::{BlobStorage, object_path};
use crate::usecase::validate;

/// Largest accepted upload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone)]
pub struct UploadImage<S> {
    storage: S,
}

impl<S: BlobStorage> UploadImage<S> {
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Store an image under the owner's folder for `service` and return its
    /// public URL. Re-uploading the same file name replaces the object.
    ///
    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for an empty or oversized file or a
    /// file name that is not a single path segment, or
    /// `UseCaseError::Repository` if the upload fails.
    #[instrument(skip(self, bytes), fields(owner = %owner, service = %service, size = bytes.len()))]
    pub async fn run(
        &self,
        owner: &ProfileId,
        service: ServiceType,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, UseCaseError> {
        validate::file_name(file_name)?;
        if bytes.is_empty() {
            return Err(UseCaseError::invalid("file", "must not be empty"));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(UseCaseError::invalid(
                "file",
                format!("must be at most {MAX_IMAGE_BYTES} bytes"),
            ));
        }

        let path = object_path(owner, service, file_name);
        let url = self
            .storage
            .upload(&path, bytes, content_type_for(file_name))
            .await?;

        info!(%path, "Image uploaded");
        Ok(url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::remote::MemoryStorage;

    #[tokio::test]
    async fn test_upload_lands_in_owner_service_folder() {
        let storage = MemoryStorage::default();
        let upload = UploadImage::new(storage.clone());

        let url = upload
            .run(&ProfileId::new("user_1"), ServiceType::Shop, "logo.png", vec![1, 2, 3])
            .await
            .unwrap();

        assert_eq!(url, "memory://atomo/user_1/shop/logo.png");
        let (content_type, bytes) = storage.object("user_1/shop/logo.png").await.unwrap();
        assert_eq!(content_type, "image/png");
        assert_eq!(bytes, [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_path_traversal_is_rejected() {
        let upload = UploadImage::new(MemoryStorage::default());
        let result = upload
            .run(&ProfileId::new("user_1"), ServiceType::Cv, "../avatar.png", vec![1])
            .await;
        assert!(matches!(result, Err(UseCaseError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_failed_upload_is_reported() {
        let storage = MemoryStorage::default();
        storage.fail_uploads(true);
        let upload = UploadImage::new(storage);

        let result = upload
            .run(&ProfileId::new("user_1"), ServiceType::Menu, "dish.jpg", vec![1])
            .await;
        assert!(matches!(result, Err(UseCaseError::Repository(_))));
    }
}
