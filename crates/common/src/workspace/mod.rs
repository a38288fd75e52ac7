//! The user-facing operations on directories and files.
//!
//! [`Workspace`] composes the guard, the uniqueness resolver, the
//! normalizer and the tree builder over a record [`Store`] and a
//! [`BlobStorage`] for document text. Every operation takes the calling
//! principal; an absent principal is rejected before anything is looked up.

mod blob;
mod memory;
mod model;
mod store;

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::guard::{self, GuardError, Owned};
use crate::naming::{allocate_storage_key, resolve_unique_name, SiblingScope};
use crate::tree::{build_tree, FlatEntry, TreeNode};

pub use blob::{BlobError, BlobStorage};
pub use memory::{MemoryBlobStorage, MemoryStore};
pub use model::{
    Directory, DirectoryInfo, DirectoryUpdate, Document, File, FileInfo, FileUpdate,
    NewDirectory, NewFile, Patch, User,
};
pub use store::{Store, StoreError};

pub const DEFAULT_FILE_NAME: &str = "new file";
pub const DEFAULT_DIRECTORY_NAME: &str = "new directory";

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("missing credentials")]
    Unauthenticated,
    #[error("you do not have access to this {0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("blob storage error: {0}")]
    Blob(#[from] BlobError),
}

impl From<GuardError> for WorkspaceError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Unauthenticated => WorkspaceError::Unauthenticated,
            GuardError::Forbidden => WorkspaceError::Forbidden("resource"),
        }
    }
}

fn check<T: Owned>(user: &User, entity: &T, kind: &'static str) -> Result<(), WorkspaceError> {
    guard::authorize(Some(user), entity)
        .into_result()
        .map_err(|e| match e {
            GuardError::Forbidden => WorkspaceError::Forbidden(kind),
            other => other.into(),
        })
}

fn clean_name(name: Option<String>, default: &str) -> String {
    match name.as_deref().map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => default.to_string(),
    }
}

fn required_name(name: String) -> Result<String, WorkspaceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(WorkspaceError::BadRequest("name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

fn join_content(existing: &str, addition: &str) -> String {
    if existing.trim().is_empty() {
        addition.to_string()
    } else {
        format!("{}\n\n{}", existing.trim_end(), addition)
    }
}

#[derive(Debug, Clone)]
pub struct Workspace<S, B> {
    store: S,
    blobs: B,
}

impl<S: Store, B: BlobStorage> Workspace<S, B> {
    pub fn new(store: S, blobs: B) -> Self {
        Self { store, blobs }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    /* Lookups */

    async fn owned_directory(&self, user: &User, id: Uuid) -> Result<Directory, WorkspaceError> {
        let directory = self
            .store
            .find_directory(id)
            .await?
            .ok_or_else(|| WorkspaceError::NotFound("directory not found".to_string()))?;
        check(user, &directory, "directory")?;
        Ok(directory)
    }

    async fn owned_file(&self, user: &User, id: Uuid) -> Result<File, WorkspaceError> {
        let file = self
            .store
            .find_file(id)
            .await?
            .ok_or_else(|| WorkspaceError::NotFound("file not found".to_string()))?;
        check(user, &file, "file")?;
        Ok(file)
    }

    /// Validate a directory named as the destination of a create or move.
    async fn destination(&self, user: &User, parent: Option<Uuid>) -> Result<(), WorkspaceError> {
        let Some(parent) = parent else {
            return Ok(());
        };
        let directory = self
            .store
            .find_directory(parent)
            .await?
            .ok_or_else(|| WorkspaceError::BadRequest("directory not found".to_string()))?;
        check(user, &directory, "directory")
    }

    async fn directory_names(
        &self,
        scope: &SiblingScope,
        exclude: Option<Uuid>,
    ) -> Result<HashSet<String>, WorkspaceError> {
        Ok(self
            .store
            .list_directories(scope.owner)
            .await?
            .into_iter()
            .filter(|d| d.parent_id == scope.parent && Some(d.id) != exclude)
            .map(|d| d.name)
            .collect())
    }

    async fn file_names(
        &self,
        scope: &SiblingScope,
        exclude: Option<Uuid>,
    ) -> Result<HashSet<String>, WorkspaceError> {
        Ok(self
            .store
            .list_files(scope.owner)
            .await?
            .into_iter()
            .filter(|f| f.parent_id == scope.parent && Some(f.id) != exclude)
            .map(|f| f.name)
            .collect())
    }

    async fn read_blob(&self, file: &File) -> Result<String, WorkspaceError> {
        match self.blobs.read(&file.storage_key).await {
            Ok(content) => Ok(content),
            Err(BlobError::NotFound(_)) => {
                Err(WorkspaceError::NotFound("file not found on disk".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /* Directories */

    pub async fn create_directory(
        &self,
        principal: Option<&User>,
        request: NewDirectory,
    ) -> Result<Directory, WorkspaceError> {
        let user = guard::authenticated(principal)?;
        self.destination(user, request.parent).await?;

        let scope = SiblingScope::new(user.id, request.parent);
        let taken = self.directory_names(&scope, None).await?;
        let desired = clean_name(request.name, DEFAULT_DIRECTORY_NAME);
        let name = resolve_unique_name(&desired, &scope, |n, _| taken.contains(n));

        let directory = Directory {
            id: Uuid::new_v4(),
            owner_id: user.id,
            name,
            context: request.context.filter(|c| !c.trim().is_empty()),
            parent_id: request.parent,
        };
        self.store.insert_directory(&directory).await?;

        tracing::info!(
            directory_id = %directory.id,
            name = %directory.name,
            "created directory"
        );
        Ok(directory)
    }

    pub async fn directory_info(
        &self,
        principal: Option<&User>,
        id: Uuid,
    ) -> Result<DirectoryInfo, WorkspaceError> {
        let user = guard::authenticated(principal)?;
        let directory = self.owned_directory(user, id).await?;

        let directories = self
            .store
            .list_directories(user.id)
            .await?
            .into_iter()
            .filter(|d| d.parent_id == Some(id))
            .collect();
        let files = self
            .store
            .list_files(user.id)
            .await?
            .into_iter()
            .filter(|f| f.parent_id == Some(id))
            .collect();

        Ok(DirectoryInfo {
            directory,
            directories,
            files,
        })
    }

    /// Rename, move or change the context of a directory.
    ///
    /// Landing on a name already used in the destination is a conflict; no
    /// suffix is invented. A directory cannot move below itself.
    pub async fn update_directory(
        &self,
        principal: Option<&User>,
        id: Uuid,
        update: DirectoryUpdate,
    ) -> Result<Directory, WorkspaceError> {
        let user = guard::authenticated(principal)?;
        let mut directory = self.owned_directory(user, id).await?;

        let parent = match update.parent {
            Patch::Absent => directory.parent_id,
            Patch::Null => None,
            Patch::Value(target) => {
                self.destination(user, Some(target)).await?;
                self.ensure_not_below(user, id, target).await?;
                Some(target)
            }
        };
        let name = match update.name {
            Some(name) => required_name(name)?,
            None => directory.name.clone(),
        };

        if name != directory.name || parent != directory.parent_id {
            let scope = SiblingScope::new(user.id, parent);
            if self.directory_names(&scope, Some(id)).await?.contains(&name) {
                return Err(WorkspaceError::Conflict(
                    "directory name already exists".to_string(),
                ));
            }
        }

        directory.name = name;
        directory.parent_id = parent;
        directory.context = update
            .context
            .resolve(directory.context)
            .filter(|c| !c.trim().is_empty());
        self.store.update_directory(&directory).await?;

        tracing::info!(directory_id = %directory.id, "updated directory");
        Ok(directory)
    }

    async fn ensure_not_below(
        &self,
        user: &User,
        moving: Uuid,
        target: Uuid,
    ) -> Result<(), WorkspaceError> {
        let parents: HashMap<Uuid, Option<Uuid>> = self
            .store
            .list_directories(user.id)
            .await?
            .into_iter()
            .map(|d| (d.id, d.parent_id))
            .collect();

        let mut seen = HashSet::new();
        let mut current = Some(target);
        while let Some(id) = current {
            if id == moving {
                return Err(WorkspaceError::BadRequest(
                    "a directory cannot be moved into itself or its descendants".to_string(),
                ));
            }
            if !seen.insert(id) {
                break;
            }
            current = parents.get(&id).copied().flatten();
        }
        Ok(())
    }

    pub async fn rename_directory(
        &self,
        principal: Option<&User>,
        id: Uuid,
        name: String,
    ) -> Result<Directory, WorkspaceError> {
        let update = DirectoryUpdate {
            name: Some(name),
            ..Default::default()
        };
        self.update_directory(principal, id, update).await
    }

    pub async fn move_directory(
        &self,
        principal: Option<&User>,
        id: Uuid,
        parent: Option<Uuid>,
    ) -> Result<Directory, WorkspaceError> {
        let update = DirectoryUpdate {
            parent: parent.into(),
            ..Default::default()
        };
        self.update_directory(principal, id, update).await
    }

    pub async fn set_directory_context(
        &self,
        principal: Option<&User>,
        id: Uuid,
        context: Option<String>,
    ) -> Result<Directory, WorkspaceError> {
        let update = DirectoryUpdate {
            context: context.into(),
            ..Default::default()
        };
        self.update_directory(principal, id, update).await
    }

    /// Delete an empty directory.
    pub async fn delete_directory(
        &self,
        principal: Option<&User>,
        id: Uuid,
    ) -> Result<(), WorkspaceError> {
        let user = guard::authenticated(principal)?;
        let directory = self.owned_directory(user, id).await?;

        if self.store.has_children(directory.id).await? {
            return Err(WorkspaceError::Conflict(
                "directory is not empty".to_string(),
            ));
        }
        self.store.delete_directory(directory.id).await?;

        tracing::info!(directory_id = %directory.id, "deleted directory");
        Ok(())
    }

    /// The directory's context, empty when none is set.
    pub async fn directory_context(
        &self,
        principal: Option<&User>,
        id: Uuid,
    ) -> Result<String, WorkspaceError> {
        let user = guard::authenticated(principal)?;
        let directory = self.owned_directory(user, id).await?;
        Ok(directory.context.unwrap_or_default())
    }

    /* Files */

    pub async fn create_file(
        &self,
        principal: Option<&User>,
        request: NewFile,
    ) -> Result<File, WorkspaceError> {
        let user = guard::authenticated(principal)?;
        self.destination(user, request.parent).await?;

        let scope = SiblingScope::new(user.id, request.parent);
        let taken = self.file_names(&scope, None).await?;
        let desired = clean_name(request.name, DEFAULT_FILE_NAME);
        let name = resolve_unique_name(&desired, &scope, |n, _| taken.contains(n));

        let keys = self.store.storage_keys().await?;
        let storage_key = allocate_storage_key(&name, |k| keys.contains(k));

        let file = File {
            id: Uuid::new_v4(),
            owner_id: user.id,
            name,
            storage_key,
            parent_id: request.parent,
        };

        // the unique key on the record claims the blob; losing the insert
        // leaves whatever is stored under that key untouched
        self.store.insert_file(&file).await?;
        if let Err(e) = self.blobs.write(&file.storage_key, "").await {
            if let Err(cleanup) = self.store.delete_file(file.id).await {
                tracing::warn!(file_id = %file.id, error = %cleanup, "orphaned file record");
            }
            return Err(e.into());
        }

        tracing::info!(
            file_id = %file.id,
            name = %file.name,
            key = %file.storage_key,
            "created file"
        );
        Ok(file)
    }

    pub async fn file_info(
        &self,
        principal: Option<&User>,
        id: Uuid,
    ) -> Result<FileInfo, WorkspaceError> {
        let user = guard::authenticated(principal)?;
        let file = self.owned_file(user, id).await?;
        let directory = match file.parent_id {
            Some(parent) => self.store.find_directory(parent).await?,
            None => None,
        };
        Ok(FileInfo { file, directory })
    }

    /// Rename and/or move a file.
    ///
    /// A new name moves the content to a freshly allocated storage key.
    pub async fn update_file(
        &self,
        principal: Option<&User>,
        id: Uuid,
        update: FileUpdate,
    ) -> Result<File, WorkspaceError> {
        let user = guard::authenticated(principal)?;
        let mut file = self.owned_file(user, id).await?;

        let parent = match update.parent {
            Patch::Absent => file.parent_id,
            Patch::Null => None,
            Patch::Value(target) => {
                self.destination(user, Some(target)).await?;
                Some(target)
            }
        };
        let name = match update.name {
            Some(name) => required_name(name)?,
            None => file.name.clone(),
        };

        if name != file.name || parent != file.parent_id {
            let scope = SiblingScope::new(user.id, parent);
            if self.file_names(&scope, Some(id)).await?.contains(&name) {
                return Err(WorkspaceError::Conflict("file name already exists".to_string()));
            }
        }

        let old_key = file.storage_key.clone();
        if name != file.name {
            let keys = self.store.storage_keys().await?;
            let key = allocate_storage_key(&name, |k| *k != old_key && keys.contains(k));
            if key != old_key {
                let content = match self.blobs.read(&old_key).await {
                    Ok(content) => content,
                    Err(BlobError::NotFound(_)) => String::new(),
                    Err(e) => return Err(e.into()),
                };
                self.blobs.write(&key, &content).await?;
                file.storage_key = key;
            }
        }
        file.name = name;
        file.parent_id = parent;

        if let Err(e) = self.store.update_file(&file).await {
            if file.storage_key != old_key {
                if let Err(cleanup) = self.blobs.delete(&file.storage_key).await {
                    tracing::warn!(key = %file.storage_key, error = %cleanup, "orphaned blob");
                }
            }
            return Err(e.into());
        }
        if file.storage_key != old_key {
            if let Err(e) = self.blobs.delete(&old_key).await {
                tracing::warn!(key = %old_key, error = %e, "failed to remove previous blob");
            }
        }

        tracing::info!(file_id = %file.id, name = %file.name, "updated file");
        Ok(file)
    }

    pub async fn rename_file(
        &self,
        principal: Option<&User>,
        id: Uuid,
        name: String,
    ) -> Result<File, WorkspaceError> {
        let update = FileUpdate {
            name: Some(name),
            ..Default::default()
        };
        self.update_file(principal, id, update).await
    }

    pub async fn move_file(
        &self,
        principal: Option<&User>,
        id: Uuid,
        parent: Option<Uuid>,
    ) -> Result<File, WorkspaceError> {
        let update = FileUpdate {
            parent: parent.into(),
            ..Default::default()
        };
        self.update_file(principal, id, update).await
    }

    /// Delete a file and its content.
    pub async fn delete_file(
        &self,
        principal: Option<&User>,
        id: Uuid,
    ) -> Result<(), WorkspaceError> {
        let user = guard::authenticated(principal)?;
        let file = self.owned_file(user, id).await?;

        self.blobs.delete(&file.storage_key).await?;
        self.store.delete_file(file.id).await?;

        tracing::info!(file_id = %file.id, key = %file.storage_key, "deleted file");
        Ok(())
    }

    pub async fn read_content(
        &self,
        principal: Option<&User>,
        id: Uuid,
    ) -> Result<String, WorkspaceError> {
        let user = guard::authenticated(principal)?;
        let file = self.owned_file(user, id).await?;
        self.read_blob(&file).await
    }

    /// Replace the whole content of a file.
    pub async fn write_content(
        &self,
        principal: Option<&User>,
        id: Uuid,
        content: &str,
    ) -> Result<(), WorkspaceError> {
        let user = guard::authenticated(principal)?;
        let file = self.owned_file(user, id).await?;
        self.blobs.write(&file.storage_key, content).await?;
        tracing::debug!(file_id = %file.id, len = content.len(), "wrote content");
        Ok(())
    }

    /// Append `addition` as a new paragraph and return the new content.
    pub async fn append_content(
        &self,
        principal: Option<&User>,
        id: Uuid,
        addition: &str,
    ) -> Result<String, WorkspaceError> {
        let user = guard::authenticated(principal)?;
        let file = self.owned_file(user, id).await?;
        let existing = self.read_blob(&file).await?;
        let content = join_content(&existing, addition);
        self.blobs.write(&file.storage_key, &content).await?;
        Ok(content)
    }

    /// Context of the directory holding the file, empty at the root.
    pub async fn file_context(
        &self,
        principal: Option<&User>,
        id: Uuid,
    ) -> Result<String, WorkspaceError> {
        let user = guard::authenticated(principal)?;
        let file = self.owned_file(user, id).await?;
        self.context_of(&file).await
    }

    async fn context_of(&self, file: &File) -> Result<String, WorkspaceError> {
        let Some(parent) = file.parent_id else {
            return Ok(String::new());
        };
        Ok(self
            .store
            .find_directory(parent)
            .await?
            .and_then(|d| d.context)
            .unwrap_or_default())
    }

    /// Content and directory context of a file, for the assistant.
    pub async fn document(
        &self,
        principal: Option<&User>,
        id: Uuid,
    ) -> Result<Document, WorkspaceError> {
        let user = guard::authenticated(principal)?;
        let file = self.owned_file(user, id).await?;
        let content = self.read_blob(&file).await?;
        let context = self.context_of(&file).await?;
        Ok(Document {
            file,
            content,
            context,
        })
    }

    /* Tree */

    pub async fn tree(&self, principal: Option<&User>) -> Result<Vec<TreeNode<Uuid>>, WorkspaceError> {
        let user = guard::authenticated(principal)?;

        let dirs: Vec<FlatEntry<Uuid>> = self
            .store
            .list_directories(user.id)
            .await?
            .into_iter()
            .map(|d| FlatEntry::new(d.id, d.name, d.parent_id).with_summary(d.context))
            .collect();
        let files: Vec<FlatEntry<Uuid>> = self
            .store
            .list_files(user.id)
            .await?
            .into_iter()
            .map(|f| FlatEntry::new(f.id, f.name, f.parent_id))
            .collect();

        Ok(build_tree(&files, &dirs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_content() {
        assert_eq!(join_content("", "new"), "new");
        assert_eq!(join_content("  \n", "new"), "new");
        assert_eq!(join_content("old\n", "new"), "old\n\nnew");
    }

    #[test]
    fn test_clean_name_defaults() {
        assert_eq!(clean_name(None, DEFAULT_FILE_NAME), "new file");
        assert_eq!(clean_name(Some("   ".into()), DEFAULT_FILE_NAME), "new file");
        assert_eq!(clean_name(Some(" Notes ".into()), DEFAULT_FILE_NAME), "Notes");
    }
}
