use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{Directory, File};
use crate::naming::StorageKey;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness or integrity constraint rejected the write
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Persistence for directory and file records.
///
/// Listing methods return records in insertion order.
#[async_trait]
pub trait Store: Send + Sync + std::fmt::Debug + Clone + 'static {
    async fn find_directory(&self, id: Uuid) -> Result<Option<Directory>, StoreError>;

    async fn find_file(&self, id: Uuid) -> Result<Option<File>, StoreError>;

    /// Every directory owned by `owner`.
    async fn list_directories(&self, owner: Uuid) -> Result<Vec<Directory>, StoreError>;

    /// Every file owned by `owner`.
    async fn list_files(&self, owner: Uuid) -> Result<Vec<File>, StoreError>;

    /// Storage keys in use across all owners.
    async fn storage_keys(&self) -> Result<HashSet<StorageKey>, StoreError>;

    async fn insert_directory(&self, directory: &Directory) -> Result<(), StoreError>;

    async fn update_directory(&self, directory: &Directory) -> Result<(), StoreError>;

    async fn delete_directory(&self, id: Uuid) -> Result<(), StoreError>;

    async fn insert_file(&self, file: &File) -> Result<(), StoreError>;

    async fn update_file(&self, file: &File) -> Result<(), StoreError>;

    async fn delete_file(&self, id: Uuid) -> Result<(), StoreError>;

    /// Whether any file or directory names `id` as its parent.
    async fn has_children(&self, id: Uuid) -> Result<bool, StoreError>;
}
