//! Profile image upload storage.
//!
//! Uploads land under `<uploads_dir>/users/<user_id>/` with a
//! `<unix_millis>-<uuid>` filename, so re-uploads never collide and never
//! overwrite. Size and content-type are checked before anything is written.

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use marigold_core::UserId;

/// Maximum accepted upload size.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Content types accepted for profile images, with their file extensions.
const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

/// Errors that can occur storing an upload.
///
/// The first two have user-facing Display strings; `Io` gets a generic
/// message at the response boundary.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Upload exceeds [`MAX_UPLOAD_BYTES`].
    #[error("The image must be smaller than 5 MB.")]
    TooLarge,

    /// Content type is not in the allowlist.
    #[error("Only JPEG, PNG, GIF, and WebP images are allowed.")]
    UnsupportedType,

    /// Filesystem error while writing.
    #[error("could not store the upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Stores uploaded profile images on the local filesystem.
pub struct UploadService<'a> {
    uploads_dir: &'a Path,
}

impl<'a> UploadService<'a> {
    /// Create an upload service rooted at `uploads_dir`.
    #[must_use]
    pub const fn new(uploads_dir: &'a Path) -> Self {
        Self { uploads_dir }
    }

    /// Store a profile image and return its path relative to the uploads
    /// root (this is what goes in the database and under `/uploads/` in
    /// templates).
    ///
    /// # Errors
    ///
    /// Returns `UploadError::TooLarge` / `UnsupportedType` before touching
    /// the filesystem, `UploadError::Io` if the write fails.
    pub async fn store_profile_image(
        &self,
        user_id: UserId,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, UploadError> {
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge);
        }

        let extension = extension_for(content_type).ok_or(UploadError::UnsupportedType)?;

        let relative = format!(
            "users/{}/{}-{}.{}",
            user_id.as_i32(),
            Utc::now().timestamp_millis(),
            Uuid::new_v4(),
            extension
        );

        let full_path: PathBuf = self.uploads_dir.join(&relative);
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full_path, bytes).await?;

        tracing::info!(user_id = %user_id, path = %relative, "Profile image stored");
        Ok(relative)
    }
}

/// Map an allowed content type to its file extension.
fn extension_for(content_type: &str) -> Option<&'static str> {
    ALLOWED_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_allowed_types() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("image/gif"), Some("gif"));
        assert_eq!(extension_for("image/webp"), Some("webp"));
    }

    #[test]
    fn test_extension_for_rejects_others() {
        assert_eq!(extension_for("image/svg+xml"), None);
        assert_eq!(extension_for("application/pdf"), None);
        assert_eq!(extension_for("text/html"), None);
    }

    #[tokio::test]
    async fn test_store_rejects_oversized_upload() {
        let dir = std::env::temp_dir();
        let service = UploadService::new(&dir);
        let oversized = vec![0u8; MAX_UPLOAD_BYTES + 1];

        let result = service
            .store_profile_image(UserId::new(1), "image/png", &oversized)
            .await;
        assert!(matches!(result, Err(UploadError::TooLarge)));
    }

    #[tokio::test]
    async fn test_store_rejects_unsupported_type() {
        let dir = std::env::temp_dir();
        let service = UploadService::new(&dir);

        let result = service
            .store_profile_image(UserId::new(1), "application/zip", b"PK")
            .await;
        assert!(matches!(result, Err(UploadError::UnsupportedType)));
    }

    #[tokio::test]
    async fn test_store_writes_under_user_directory() {
        let dir = std::env::temp_dir().join(format!("marigold-uploads-{}", Uuid::new_v4()));
        let service = UploadService::new(&dir);

        let relative = service
            .store_profile_image(UserId::new(42), "image/jpeg", b"\xFF\xD8\xFF")
            .await
            .expect("store succeeds");

        assert!(relative.starts_with("users/42/"));
        assert!(relative.ends_with(".jpg"));
        assert!(dir.join(&relative).exists());

        tokio::fs::remove_dir_all(&dir).await.expect("cleanup");
    }
}
