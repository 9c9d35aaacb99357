use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::ports::image_store::{ImageStore, StoredImage};
use crate::application::services::images::sniff_image;

/// Product images on local disk under `{uploads_dir}/products`, one flat
/// directory keyed by generated filename.
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    pub fn new(uploads_dir: &str) -> Self {
        Self {
            root: Path::new(uploads_dir).join("products"),
        }
    }

    /// Stored names are generated by us; anything with path syntax in it
    /// did not come from [`ImageStore::save`].
    fn resolve(&self, filename: &str) -> Option<PathBuf> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return None;
        }
        Some(self.root.join(filename))
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn save(&self, bytes: &[u8], extension: &str) -> anyhow::Result<String> {
        let filename = format!("{}.{}", Uuid::new_v4().simple(), extension);
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&filename), bytes).await?;
        Ok(filename)
    }

    async fn open(&self, filename: &str) -> anyhow::Result<Option<StoredImage>> {
        let Some(path) = self.resolve(filename) else {
            return Ok(None);
        };
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let content_type = sniff_image(&bytes)
            .map(|kind| kind.content_type.to_string())
            .unwrap_or_else(|| {
                mime_guess::from_path(&path)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });
        Ok(Some(StoredImage {
            bytes,
            content_type,
        }))
    }

    async fn delete(&self, filename: &str) -> anyhow::Result<bool> {
        let Some(path) = self.resolve(filename) else {
            return Ok(false);
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\nfake-image-data";

    #[tokio::test]
    async fn save_then_open_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path().to_str().unwrap());

        let filename = store.save(PNG_HEADER, "png").await.unwrap();
        assert!(filename.ends_with(".png"));

        let stored = store.open(&filename).await.unwrap().unwrap();
        assert_eq!(stored.bytes, PNG_HEADER);
        assert_eq!(stored.content_type, "image/png");
    }

    #[tokio::test]
    async fn open_refuses_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path().to_str().unwrap());
        assert!(store.open("../../etc/passwd").await.unwrap().is_none());
        assert!(store.open("a/b.png").await.unwrap().is_none());
        assert!(store.open("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path().to_str().unwrap());
        let filename = store.save(PNG_HEADER, "png").await.unwrap();

        assert!(store.delete(&filename).await.unwrap());
        assert!(!store.delete(&filename).await.unwrap());
        assert!(!store.delete("../x.png").await.unwrap());
    }

    #[tokio::test]
    async fn opening_a_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path().to_str().unwrap());
        assert!(store.open("does-not-exist.png").await.unwrap().is_none());
    }
}
