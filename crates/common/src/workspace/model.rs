use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::guard::Owned;
use crate::naming::StorageKey;

/// An authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    /// Persona text that steers generation for files in this directory.
    pub context: Option<String>,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub storage_key: StorageKey,
    pub parent_id: Option<Uuid>,
}

impl Owned for Directory {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl Owned for File {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDirectory {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "dir")]
    pub parent: Option<Uuid>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "dir")]
    pub parent: Option<Uuid>,
}

/// A field of a partial update that distinguishes "leave alone" from
/// "clear".
///
/// With `#[serde(default)]` a missing key deserializes to
/// [`Patch::Absent`], an explicit `null` to [`Patch::Null`] and anything
/// else to [`Patch::Value`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// Apply the patch on top of `current`.
    pub fn resolve(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Absent => current,
            Patch::Null => None,
            Patch::Value(v) => Some(v),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Absent | Patch::Null => serializer.serialize_none(),
            Patch::Value(v) => serializer.serialize_some(v),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "dir", skip_serializing_if = "Patch::is_absent")]
    pub parent: Patch<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub context: Patch<String>,
    #[serde(default, rename = "dir", skip_serializing_if = "Patch::is_absent")]
    pub parent: Patch<Uuid>,
}

/// A file together with the directory it lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub file: File,
    pub directory: Option<Directory>,
}

/// A directory with its immediate children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryInfo {
    pub directory: Directory,
    pub directories: Vec<Directory>,
    pub files: Vec<File>,
}

/// What the assistant needs to work on a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub file: File,
    pub content: String,
    /// Context of the parent directory, empty at the root.
    pub context: String,
}
