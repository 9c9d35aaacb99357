use async_trait::async_trait;

/// Stored image plus the content type sniffed when it was accepted.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persists validated image bytes and returns the generated filename.
    async fn save(&self, bytes: &[u8], extension: &str) -> anyhow::Result<String>;
    async fn open(&self, filename: &str) -> anyhow::Result<Option<StoredImage>>;
    async fn delete(&self, filename: &str) -> anyhow::Result<bool>;
}
