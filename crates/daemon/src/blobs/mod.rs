//! Document content kept in an object store, one object per storage key.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;

use common::naming::StorageKey;
use common::workspace::{BlobError, BlobStorage};

#[derive(Debug, Clone)]
pub struct BlobStore {
    inner: Arc<dyn ObjectStore>,
}

impl BlobStore {
    /// Store documents as plain files under `path`, created if missing.
    pub async fn local(path: &Path) -> Result<Self, BlobsSetupError> {
        tokio::fs::create_dir_all(path).await?;
        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| BlobsSetupError::InvalidConfig(e.to_string()))?;
        tracing::info!(path = %path.display(), "using local blob store");
        Ok(Self {
            inner: Arc::new(store),
        })
    }

    pub fn memory() -> Self {
        Self {
            inner: Arc::new(InMemory::new()),
        }
    }

    fn object_path(key: &StorageKey) -> ObjectPath {
        ObjectPath::from(key.as_str())
    }
}

fn backend(err: object_store::Error) -> BlobError {
    BlobError::Backend(err.to_string())
}

#[async_trait]
impl BlobStorage for BlobStore {
    async fn exists(&self, key: &StorageKey) -> Result<bool, BlobError> {
        match self.inner.head(&Self::object_path(key)).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(backend(e)),
        }
    }

    async fn read(&self, key: &StorageKey) -> Result<String, BlobError> {
        let bytes = match self.inner.get(&Self::object_path(key)).await {
            Ok(result) => result.bytes().await.map_err(backend)?,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(BlobError::NotFound(key.clone()))
            }
            Err(e) => return Err(backend(e)),
        };
        String::from_utf8(bytes.to_vec()).map_err(|_| BlobError::InvalidUtf8(key.clone()))
    }

    async fn write(&self, key: &StorageKey, content: &str) -> Result<(), BlobError> {
        let data = Bytes::copy_from_slice(content.as_bytes());
        self.inner
            .put(&Self::object_path(key), data.into())
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn delete(&self, key: &StorageKey) -> Result<(), BlobError> {
        match self.inner.delete(&Self::object_path(key)).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(backend(e)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BlobsSetupError {
    #[error("invalid blob store configuration: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> StorageKey {
        StorageKey::try_from(s.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_local_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::local(&dir.path().join("files")).await.unwrap();
        let notes = key("notes.ink");

        assert!(!store.exists(&notes).await.unwrap());
        assert_eq!(
            store.read(&notes).await.unwrap_err(),
            BlobError::NotFound(notes.clone())
        );

        store.write(&notes, "first draft").await.unwrap();
        store.write(&notes, "second draft").await.unwrap();
        assert_eq!(store.read(&notes).await.unwrap(), "second draft");
        assert!(dir.path().join("files").join("notes.ink").exists());

        store.delete(&notes).await.unwrap();
        store.delete(&notes).await.unwrap();
        assert!(!store.exists(&notes).await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_store_empty_content() {
        let store = BlobStore::memory();
        let empty = key("empty.ink");
        store.write(&empty, "").await.unwrap();
        assert!(store.exists(&empty).await.unwrap());
        assert_eq!(store.read(&empty).await.unwrap(), "");
    }
}
