//! Resume object storage
//!
//! Resumes live at `{email}/resume/{filename}` inside a single bucket.
//! [`upload_resume`] applies the intake rules (filename required, 10 MiB
//! ceiling) before handing bytes to a [`ResumeStorage`] backend.

mod memory;
mod s3;

pub use memory::InMemoryResumeStorage;
pub use s3::S3ResumeStorage;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::models::ResumeUpload;

/// Largest accepted resume, in bytes
pub const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No file provided")]
    MissingFilename,

    #[error("File too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResumeStorage: Send + Sync {
    async fn put(&self, path: &str, data: Bytes, content_type: &str) -> Result<(), StorageError>;

    async fn get(&self, path: &str) -> Result<Bytes, StorageError>;

    async fn health_check(&self) -> Result<(), StorageError>;

    /// Browser link to `path` in the storage console
    fn browser_url(&self, path: &str) -> String;
}

/// Object path for a lead's resume
pub fn resume_path(email: &str, filename: &str) -> String {
    format!("{}/resume/{}", email, filename)
}

/// `{console}/browser/{bucket}/{path}` with every reserved character in
/// `path` percent-encoded, slashes included
pub fn browser_url(console_url: &str, bucket: &str, path: &str) -> String {
    format!(
        "{}/browser/{}/{}",
        console_url.trim_end_matches('/'),
        bucket,
        urlencoding::encode(path)
    )
}

/// Validate and store a resume under `email`, returning its object path.
///
/// The upload keeps its bytes: the stored copy is a cheap `Bytes` clone.
pub async fn upload_resume<S: ResumeStorage + ?Sized>(
    storage: &S,
    email: &str,
    upload: &ResumeUpload,
) -> Result<String, StorageError> {
    let filename = upload
        .filename
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or(StorageError::MissingFilename)?;

    if upload.len() > MAX_RESUME_BYTES {
        return Err(StorageError::TooLarge {
            size: upload.len(),
            limit: MAX_RESUME_BYTES,
        });
    }

    let path = resume_path(email, filename);
    let content_type = upload.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE);

    storage.put(&path, upload.data.clone(), content_type).await?;

    tracing::info!(path = %path, size = upload.len(), "Uploaded resume");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[test]
    fn test_resume_path_layout() {
        assert_eq!(resume_path("john@test.com", "cv.pdf"), "john@test.com/resume/cv.pdf");
    }

    #[test]
    fn test_browser_url_encodes_every_reserved_char() {
        let url = browser_url(
            "http://localhost:9001/",
            "leads",
            "john@test.com/resume/my cv.pdf",
        );
        assert_eq!(
            url,
            "http://localhost:9001/browser/leads/john%40test.com%2Fresume%2Fmy%20cv.pdf"
        );
    }

    #[tokio::test]
    async fn test_upload_uses_content_type_and_keeps_bytes() {
        let mut storage = MockResumeStorage::new();
        storage
            .expect_put()
            .with(
                eq("john@test.com/resume/cv.pdf"),
                eq(Bytes::from_static(b"%PDF")),
                eq("application/pdf"),
            )
            .times(1)
            .returning(|_, _, _| Ok(()));

        let upload = ResumeUpload::new("cv.pdf", &b"%PDF"[..]).with_content_type("application/pdf");
        let path = upload_resume(&storage, "john@test.com", &upload).await.unwrap();

        assert_eq!(path, "john@test.com/resume/cv.pdf");
        assert_eq!(&upload.data[..], b"%PDF");
    }

    #[tokio::test]
    async fn test_upload_rejects_missing_filename() {
        let storage = MockResumeStorage::new();
        let upload = ResumeUpload {
            filename: Some("  ".into()),
            ..Default::default()
        };

        let err = upload_resume(&storage, "john@test.com", &upload).await.unwrap_err();
        assert!(matches!(err, StorageError::MissingFilename));
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_file() {
        let storage = MockResumeStorage::new();
        let upload = ResumeUpload::new("cv.pdf", vec![0u8; MAX_RESUME_BYTES + 1]);

        let err = upload_resume(&storage, "john@test.com", &upload).await.unwrap_err();
        assert!(matches!(err, StorageError::TooLarge { .. }));
    }

    #[tokio::test]
    async fn test_upload_at_limit_is_accepted() {
        let mut storage = MockResumeStorage::new();
        storage.expect_put().returning(|_, _, _| Ok(()));

        let upload = ResumeUpload::new("cv.pdf", vec![0u8; MAX_RESUME_BYTES]);
        assert!(upload_resume(&storage, "a@b.com", &upload).await.is_ok());
    }
}
