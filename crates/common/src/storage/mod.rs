//! Chapter image storage
//!
//! Abstraction over the backend that holds page images, plus the local
//! filesystem implementation.
//!
//! Storage organization:
//! - chapters/{manga_id}/{chapter_id}/001.jpg
//! - chapters/{manga_id}/{chapter_id}/002.png
//!
//! Numeric zero-padded filenames keep directory listings order-stable on
//! backends without ordering metadata, and the per-chapter directory makes
//! full teardown a single recursive delete.

use crate::errors::{AppError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An uploaded file as received from the API layer
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Original client filename, used only to derive the extension
    pub filename: Option<String>,

    /// Raw file bytes
    pub data: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: Option<String>, data: Vec<u8>) -> Self {
        Self { filename, data }
    }

    /// An upload with no bytes is not a valid file and is skipped
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty()
    }

    /// Lowercased extension of the original filename, falling back to "jpg"
    pub fn extension(&self) -> String {
        self.filename
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "jpg".to_string())
    }
}

/// A stored image, keyed by the original input index.
///
/// The caller derives the page order from the index (`order = index + 1`),
/// which preserves the upload order even when invalid entries were skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub index: usize,
    pub path: String,
}

/// Storage backend for chapter page images
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store multiple images with auto-ordering.
    ///
    /// Files are numbered by their position in the input slice (001, 002,
    /// ...), zero-padded to 3 digits. Invalid uploads are skipped - not
    /// stored, not counted. On error, files written so far by this call
    /// are removed before the error is returned.
    async fn store_many(
        &self,
        files: &[UploadFile],
        manga_id: i64,
        chapter_id: i64,
    ) -> Result<Vec<StoredImage>>;

    /// Delete specific image files. Empty input is trivially successful.
    async fn delete_many(&self, paths: &[String]) -> Result<bool>;

    /// Delete the entire directory of a chapter in one operation.
    async fn delete_chapter_dir(&self, manga_id: i64, chapter_id: i64) -> Result<bool>;

    /// Public URL for a stored path.
    fn url(&self, path: &str) -> String;

    /// Identifier of the active backend, for diagnostics.
    fn disk_name(&self) -> &str;
}

/// Relative storage path for a chapter's directory
fn chapter_path(manga_id: i64, chapter_id: i64) -> String {
    format!("chapters/{}/{}", manga_id, chapter_id)
}

/// Local filesystem image store
pub struct LocalImageStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let mut public_base_url: String = public_base_url.into();
        while public_base_url.ends_with('/') {
            public_base_url.pop();
        }

        Self {
            root: root.into(),
            public_base_url,
        }
    }

    fn absolute(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store_many(
        &self,
        files: &[UploadFile],
        manga_id: i64,
        chapter_id: i64,
    ) -> Result<Vec<StoredImage>> {
        let base = chapter_path(manga_id, chapter_id);
        let dir = self.absolute(&base);

        tokio::fs::create_dir_all(&dir).await?;

        let mut stored: Vec<StoredImage> = Vec::new();

        for (index, file) in files.iter().enumerate() {
            if !file.is_valid() {
                debug!(index, "Skipping invalid upload");
                continue;
            }

            // Ordered filename: 001.jpg, 002.png, ... (supports up to 999 pages)
            let filename = format!("{:03}.{}", index + 1, file.extension());
            let relative = format!("{}/{}", base, filename);

            if let Err(e) = tokio::fs::write(self.absolute(&relative), &file.data).await {
                // Partial writes from this call must not leak
                let written: Vec<String> = stored.iter().map(|s| s.path.clone()).collect();
                let _ = self.delete_many(&written).await;

                return Err(AppError::Storage {
                    message: format!("Failed to store '{}': {}", relative, e),
                });
            }

            stored.push(StoredImage {
                index,
                path: relative,
            });
        }

        debug!(
            manga_id,
            chapter_id,
            count = stored.len(),
            "Stored chapter images"
        );

        Ok(stored)
    }

    async fn delete_many(&self, paths: &[String]) -> Result<bool> {
        if paths.is_empty() {
            return Ok(true);
        }

        let mut all_deleted = true;

        for path in paths {
            match tokio::fs::remove_file(self.absolute(path)).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path, error = %e, "Failed to delete stored image");
                    all_deleted = false;
                }
            }
        }

        Ok(all_deleted)
    }

    async fn delete_chapter_dir(&self, manga_id: i64, chapter_id: i64) -> Result<bool> {
        let dir = self.absolute(&chapter_path(manga_id, chapter_id));

        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Failed to delete chapter directory");
                Ok(false)
            }
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path.trim_start_matches('/'))
    }

    fn disk_name(&self) -> &str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn jpeg(name: &str) -> UploadFile {
        UploadFile::new(Some(name.to_string()), vec![0xFF, 0xD8, 0xFF, 0xE0])
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(jpeg("page.JPG").extension(), "jpg");
        assert_eq!(jpeg("page.png").extension(), "png");
        assert_eq!(jpeg("noext").extension(), "jpg");
        assert_eq!(UploadFile::new(None, vec![1]).extension(), "jpg");
        // Suspicious extensions fall back too
        assert_eq!(jpeg("page.j pg").extension(), "jpg");
    }

    #[tokio::test]
    async fn test_store_many_orders_and_paths() {
        let dir = tempdir().unwrap();
        let store = LocalImageStore::new(dir.path(), "http://localhost/storage");

        let files = vec![jpeg("a.jpg"), jpeg("b.png"), jpeg("c.webp")];
        let stored = store.store_many(&files, 1, 42).await.unwrap();

        assert_eq!(stored.len(), 3);
        assert_eq!(stored[0].path, "chapters/1/42/001.jpg");
        assert_eq!(stored[1].path, "chapters/1/42/002.png");
        assert_eq!(stored[2].path, "chapters/1/42/003.webp");

        // Same relative order as input; order = index + 1
        for (i, image) in stored.iter().enumerate() {
            assert_eq!(image.index, i);
        }

        for image in &stored {
            assert!(dir.path().join(&image.path).exists());
        }
    }

    #[tokio::test]
    async fn test_store_many_skips_invalid_uploads() {
        let dir = tempdir().unwrap();
        let store = LocalImageStore::new(dir.path(), "http://localhost/storage");

        let files = vec![
            jpeg("a.jpg"),
            UploadFile::new(Some("empty.png".into()), vec![]),
            jpeg("c.png"),
        ];
        let stored = store.store_many(&files, 7, 9).await.unwrap();

        // The empty upload is neither stored nor counted; the surviving
        // files keep their input positions
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].index, 0);
        assert_eq!(stored[0].path, "chapters/7/9/001.jpg");
        assert_eq!(stored[1].index, 2);
        assert_eq!(stored[1].path, "chapters/7/9/003.png");
    }

    #[tokio::test]
    async fn test_delete_many_empty_is_success() {
        let dir = tempdir().unwrap();
        let store = LocalImageStore::new(dir.path(), "http://localhost/storage");

        assert!(store.delete_many(&[]).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_many_removes_files() {
        let dir = tempdir().unwrap();
        let store = LocalImageStore::new(dir.path(), "http://localhost/storage");

        let stored = store.store_many(&[jpeg("a.jpg")], 1, 1).await.unwrap();
        let paths: Vec<String> = stored.iter().map(|s| s.path.clone()).collect();

        assert!(store.delete_many(&paths).await.unwrap());
        assert!(!dir.path().join(&paths[0]).exists());

        // Deleting already-missing files is not an error
        assert!(store.delete_many(&paths).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_chapter_dir() {
        let dir = tempdir().unwrap();
        let store = LocalImageStore::new(dir.path(), "http://localhost/storage");

        store
            .store_many(&[jpeg("a.jpg"), jpeg("b.jpg")], 3, 5)
            .await
            .unwrap();
        assert!(dir.path().join("chapters/3/5").exists());

        assert!(store.delete_chapter_dir(3, 5).await.unwrap());
        assert!(!dir.path().join("chapters/3/5").exists());

        // Missing directory is trivially deleted
        assert!(store.delete_chapter_dir(3, 5).await.unwrap());
    }

    #[test]
    fn test_url_derivation() {
        let store = LocalImageStore::new("/tmp/storage", "http://localhost:8080/storage/");
        assert_eq!(
            store.url("chapters/1/42/001.jpg"),
            "http://localhost:8080/storage/chapters/1/42/001.jpg"
        );
        assert_eq!(store.disk_name(), "local");
    }
}
