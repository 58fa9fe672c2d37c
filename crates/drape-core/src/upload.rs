//! Request-scoped staging of uploaded images.
//!
//! Every upload is written to its own uniquely named file before analysis
//! and removed through the same store once the request is done.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

use crate::format::ImageFormat;

/// An uploaded image staged on local disk.
///
/// Owned by exactly one request. Not `Clone`: handing it to
/// [`UploadStore::remove`] is the end of its life.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    file_name: String,
    content_type: Option<String>,
}

impl StagedUpload {
    pub fn new(path: PathBuf, file_name: impl Into<String>, content_type: Option<String>) -> Self {
        Self {
            path,
            file_name: file_name.into(),
            content_type,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Declared MIME type, or one sniffed from the bytes if none was given.
    pub fn mime_type(&self, bytes: &[u8]) -> String {
        self.content_type
            .clone()
            .or_else(|| ImageFormat::sniff(bytes).map(|f| f.mime_type().to_string()))
            .unwrap_or_else(|| "application/octet-stream".to_string())
    }
}

/// Where uploads live between arrival and cleanup.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Persist `bytes` under a fresh, request-unique path.
    async fn stage(
        &self,
        file_name: &str,
        content_type: Option<String>,
        bytes: &[u8],
    ) -> io::Result<StagedUpload>;

    /// Remove a staged upload.
    async fn remove(&self, upload: StagedUpload) -> io::Result<()>;
}

/// Stages uploads as temp files in a local directory.
#[derive(Debug, Clone)]
pub struct LocalUploadStore {
    dir: PathBuf,
}

impl LocalUploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl UploadStore for LocalUploadStore {
    async fn stage(
        &self,
        file_name: &str,
        content_type: Option<String>,
        bytes: &[u8],
    ) -> io::Result<StagedUpload> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let dir = self.dir.clone();
        let path = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix("drape-upload-")
                .tempfile_in(dir)?
                .into_temp_path()
                .keep()
                .map_err(|e| e.error)
        })
        .await
        .map_err(io::Error::other)??;

        if let Err(e) = tokio::fs::write(&path, bytes).await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e);
        }

        tracing::debug!("Staged {} ({} bytes) at {:?}", file_name, bytes.len(), path);
        Ok(StagedUpload::new(path, file_name, content_type))
    }

    async fn remove(&self, upload: StagedUpload) -> io::Result<()> {
        tokio::fs::remove_file(&upload.path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stage_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalUploadStore::new(dir.path());

        let upload = store
            .stage("look.jpg", Some("image/jpeg".to_string()), b"\xFF\xD8\xFFdata")
            .await
            .unwrap();
        let path = upload.path().to_path_buf();
        assert!(path.starts_with(dir.path()));
        assert_eq!(std::fs::read(&path).unwrap(), b"\xFF\xD8\xFFdata");
        assert_eq!(upload.file_name(), "look.jpg");

        store.remove(upload).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_stage_paths_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalUploadStore::new(dir.path());
        let a = store.stage("a.jpg", None, b"a").await.unwrap();
        let b = store.stage("a.jpg", None, b"b").await.unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn test_stage_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalUploadStore::new(dir.path().join("nested").join("uploads"));
        let upload = store.stage("x.png", None, b"x").await.unwrap();
        assert!(upload.path().exists());
    }

    #[tokio::test]
    async fn test_remove_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalUploadStore::new(dir.path());
        let upload = StagedUpload::new(dir.path().join("gone"), "gone.jpg", None);
        assert!(store.remove(upload).await.is_err());
    }

    #[test]
    fn test_mime_type_prefers_declared() {
        let upload = StagedUpload::new(PathBuf::from("x"), "x", Some("image/png".to_string()));
        assert_eq!(upload.mime_type(b"\xFF\xD8\xFF\xE0"), "image/png");
    }

    #[test]
    fn test_mime_type_sniffed() {
        let upload = StagedUpload::new(PathBuf::from("x"), "x", None);
        assert_eq!(upload.mime_type(b"\xFF\xD8\xFF\xE0"), "image/jpeg");
        assert_eq!(upload.mime_type(b"????"), "application/octet-stream");
    }
}
