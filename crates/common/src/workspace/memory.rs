use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::blob::{BlobError, BlobStorage};
use super::model::{Directory, File};
use super::store::{Store, StoreError};
use crate::naming::StorageKey;

/// In-memory record store, kept in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    directories: Vec<Directory>,
    files: Vec<File>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>, StoreError> {
        self.inner
            .read()
            .map_err(|e| StoreError::Backend(format!("failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>, StoreError> {
        self.inner
            .write()
            .map_err(|e| StoreError::Backend(format!("failed to acquire write lock: {}", e)))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_directory(&self, id: Uuid) -> Result<Option<Directory>, StoreError> {
        Ok(self.read()?.directories.iter().find(|d| d.id == id).cloned())
    }

    async fn find_file(&self, id: Uuid) -> Result<Option<File>, StoreError> {
        Ok(self.read()?.files.iter().find(|f| f.id == id).cloned())
    }

    async fn list_directories(&self, owner: Uuid) -> Result<Vec<Directory>, StoreError> {
        Ok(self
            .read()?
            .directories
            .iter()
            .filter(|d| d.owner_id == owner)
            .cloned()
            .collect())
    }

    async fn list_files(&self, owner: Uuid) -> Result<Vec<File>, StoreError> {
        Ok(self
            .read()?
            .files
            .iter()
            .filter(|f| f.owner_id == owner)
            .cloned()
            .collect())
    }

    async fn storage_keys(&self) -> Result<HashSet<StorageKey>, StoreError> {
        Ok(self
            .read()?
            .files
            .iter()
            .map(|f| f.storage_key.clone())
            .collect())
    }

    async fn insert_directory(&self, directory: &Directory) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if inner.directories.iter().any(|d| d.id == directory.id) {
            return Err(StoreError::Conflict(format!(
                "directory {} already exists",
                directory.id
            )));
        }
        inner.directories.push(directory.clone());
        Ok(())
    }

    async fn update_directory(&self, directory: &Directory) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        match inner.directories.iter_mut().find(|d| d.id == directory.id) {
            Some(existing) => {
                *existing = directory.clone();
                Ok(())
            }
            None => Err(StoreError::Backend(format!(
                "directory {} vanished during update",
                directory.id
            ))),
        }
    }

    async fn delete_directory(&self, id: Uuid) -> Result<(), StoreError> {
        self.write()?.directories.retain(|d| d.id != id);
        Ok(())
    }

    async fn insert_file(&self, file: &File) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if inner
            .files
            .iter()
            .any(|f| f.id == file.id || f.storage_key == file.storage_key)
        {
            return Err(StoreError::Conflict(format!(
                "file {} or storage key {} already exists",
                file.id, file.storage_key
            )));
        }
        inner.files.push(file.clone());
        Ok(())
    }

    async fn update_file(&self, file: &File) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if inner
            .files
            .iter()
            .any(|f| f.id != file.id && f.storage_key == file.storage_key)
        {
            return Err(StoreError::Conflict(format!(
                "storage key {} already in use",
                file.storage_key
            )));
        }
        match inner.files.iter_mut().find(|f| f.id == file.id) {
            Some(existing) => {
                *existing = file.clone();
                Ok(())
            }
            None => Err(StoreError::Backend(format!(
                "file {} vanished during update",
                file.id
            ))),
        }
    }

    async fn delete_file(&self, id: Uuid) -> Result<(), StoreError> {
        self.write()?.files.retain(|f| f.id != id);
        Ok(())
    }

    async fn has_children(&self, id: Uuid) -> Result<bool, StoreError> {
        let inner = self.read()?;
        Ok(inner.directories.iter().any(|d| d.parent_id == Some(id))
            || inner.files.iter().any(|f| f.parent_id == Some(id)))
    }
}

/// In-memory blob storage
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStorage {
    blobs: Arc<RwLock<HashMap<StorageKey, String>>>,
}

impl MemoryBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> BlobError {
    BlobError::Backend(format!("blob lock poisoned: {}", e))
}

#[async_trait]
impl BlobStorage for MemoryBlobStorage {
    async fn exists(&self, key: &StorageKey) -> Result<bool, BlobError> {
        Ok(self.blobs.read().map_err(poisoned)?.contains_key(key))
    }

    async fn read(&self, key: &StorageKey) -> Result<String, BlobError> {
        self.blobs
            .read()
            .map_err(poisoned)?
            .get(key)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(key.clone()))
    }

    async fn write(&self, key: &StorageKey, content: &str) -> Result<(), BlobError> {
        self.blobs
            .write()
            .map_err(poisoned)?
            .insert(key.clone(), content.to_string());
        Ok(())
    }

    async fn delete(&self, key: &StorageKey) -> Result<(), BlobError> {
        self.blobs.write().map_err(poisoned)?.remove(key);
        Ok(())
    }
}
