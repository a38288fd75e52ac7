use async_trait::async_trait;

use crate::naming::StorageKey;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlobError {
    #[error("no content stored under {0}")]
    NotFound(StorageKey),
    #[error("content under {0} is not valid UTF-8")]
    InvalidUtf8(StorageKey),
    #[error("blob backend error: {0}")]
    Backend(String),
}

/// Whole-document text storage addressed by [`StorageKey`].
///
/// Writes replace the previous content; the last writer wins.
#[async_trait]
pub trait BlobStorage: Send + Sync + std::fmt::Debug + Clone + 'static {
    async fn exists(&self, key: &StorageKey) -> Result<bool, BlobError>;

    async fn read(&self, key: &StorageKey) -> Result<String, BlobError>;

    async fn write(&self, key: &StorageKey, content: &str) -> Result<(), BlobError>;

    /// Remove the content. Deleting a missing key is not an error.
    async fn delete(&self, key: &StorageKey) -> Result<(), BlobError>;
}
