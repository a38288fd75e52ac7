use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use common::naming::StorageKey;
use common::workspace::{Directory, File, Store, StoreError};

use super::{is_unique_violation, DUuid, Database};

#[derive(sqlx::FromRow)]
struct DirectoryRow {
    id: DUuid,
    owner_id: DUuid,
    name: String,
    context: Option<String>,
    parent_id: Option<DUuid>,
}

impl From<DirectoryRow> for Directory {
    fn from(row: DirectoryRow) -> Self {
        Directory {
            id: row.id.into(),
            owner_id: row.owner_id.into(),
            name: row.name,
            context: row.context,
            parent_id: row.parent_id.map(Into::into),
        }
    }
}

#[derive(sqlx::FromRow)]
struct FileRow {
    id: DUuid,
    owner_id: DUuid,
    name: String,
    storage_key: String,
    parent_id: Option<DUuid>,
}

impl TryFrom<FileRow> for File {
    type Error = StoreError;

    fn try_from(row: FileRow) -> Result<Self, Self::Error> {
        let storage_key = StorageKey::try_from(row.storage_key)
            .map_err(|e| StoreError::Backend(format!("corrupt file row {}: {}", row.id, e)))?;
        Ok(File {
            id: row.id.into(),
            owner_id: row.owner_id.into(),
            name: row.name,
            storage_key,
            parent_id: row.parent_id.map(Into::into),
        })
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Map a failed write, turning UNIQUE violations into conflicts.
fn write_error(err: sqlx::Error, what: &str) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Conflict(format!("{} already exists", what))
    } else {
        backend(err)
    }
}

fn expect_one(rows: u64, what: &str) -> Result<(), StoreError> {
    if rows == 0 {
        return Err(StoreError::Backend(format!("{} vanished during update", what)));
    }
    Ok(())
}

#[async_trait]
impl Store for Database {
    async fn find_directory(&self, id: Uuid) -> Result<Option<Directory>, StoreError> {
        let row: Option<DirectoryRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, name, context, parent_id
            FROM directories
            WHERE id = ?
            "#,
        )
        .bind(DUuid::from(id))
        .fetch_optional(&**self)
        .await
        .map_err(backend)?;

        Ok(row.map(Into::into))
    }

    async fn find_file(&self, id: Uuid) -> Result<Option<File>, StoreError> {
        let row: Option<FileRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, name, storage_key, parent_id
            FROM files
            WHERE id = ?
            "#,
        )
        .bind(DUuid::from(id))
        .fetch_optional(&**self)
        .await
        .map_err(backend)?;

        row.map(File::try_from).transpose()
    }

    async fn list_directories(&self, owner: Uuid) -> Result<Vec<Directory>, StoreError> {
        let rows: Vec<DirectoryRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, name, context, parent_id
            FROM directories
            WHERE owner_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(DUuid::from(owner))
        .fetch_all(&**self)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_files(&self, owner: Uuid) -> Result<Vec<File>, StoreError> {
        let rows: Vec<FileRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, name, storage_key, parent_id
            FROM files
            WHERE owner_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(DUuid::from(owner))
        .fetch_all(&**self)
        .await
        .map_err(backend)?;

        rows.into_iter().map(File::try_from).collect()
    }

    async fn storage_keys(&self) -> Result<HashSet<StorageKey>, StoreError> {
        let keys: Vec<(String,)> = sqlx::query_as("SELECT storage_key FROM files")
            .fetch_all(&**self)
            .await
            .map_err(backend)?;

        keys.into_iter()
            .map(|(key,)| {
                StorageKey::try_from(key).map_err(|e| StoreError::Backend(e.to_string()))
            })
            .collect()
    }

    async fn insert_directory(&self, directory: &Directory) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO directories (id, owner_id, name, context, parent_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(DUuid::from(directory.id))
        .bind(DUuid::from(directory.owner_id))
        .bind(&directory.name)
        .bind(&directory.context)
        .bind(directory.parent_id.map(DUuid::from))
        .execute(&**self)
        .await
        .map_err(|e| write_error(e, "directory"))?;
        Ok(())
    }

    async fn update_directory(&self, directory: &Directory) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE directories
            SET name = ?, context = ?, parent_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&directory.name)
        .bind(&directory.context)
        .bind(directory.parent_id.map(DUuid::from))
        .bind(DUuid::from(directory.id))
        .execute(&**self)
        .await
        .map_err(|e| write_error(e, "directory"))?;
        expect_one(result.rows_affected(), "directory")
    }

    async fn delete_directory(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM directories WHERE id = ?")
            .bind(DUuid::from(id))
            .execute(&**self)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn insert_file(&self, file: &File) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO files (id, owner_id, name, storage_key, parent_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(DUuid::from(file.id))
        .bind(DUuid::from(file.owner_id))
        .bind(&file.name)
        .bind(file.storage_key.as_str())
        .bind(file.parent_id.map(DUuid::from))
        .execute(&**self)
        .await
        .map_err(|e| write_error(e, "storage key"))?;
        Ok(())
    }

    async fn update_file(&self, file: &File) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE files
            SET name = ?, storage_key = ?, parent_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&file.name)
        .bind(file.storage_key.as_str())
        .bind(file.parent_id.map(DUuid::from))
        .bind(DUuid::from(file.id))
        .execute(&**self)
        .await
        .map_err(|e| write_error(e, "storage key"))?;
        expect_one(result.rows_affected(), "file")
    }

    async fn delete_file(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(DUuid::from(id))
            .execute(&**self)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn has_children(&self, id: Uuid) -> Result<bool, StoreError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM directories WHERE parent_id = ?1)
                + (SELECT COUNT(*) FROM files WHERE parent_id = ?1)
            "#,
        )
        .bind(DUuid::from(id))
        .fetch_one(&**self)
        .await
        .map_err(backend)?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> (Database, Uuid) {
        let db = Database::in_memory().await.unwrap();
        let user = db.create_user("alice", "hash", "salt").await.unwrap();
        (db, user.user.id)
    }

    fn file(owner: Uuid, key: &str, parent: Option<Uuid>) -> File {
        File {
            id: Uuid::new_v4(),
            owner_id: owner,
            name: key.to_string(),
            storage_key: StorageKey::try_from(format!("{}.ink", key)).unwrap(),
            parent_id: parent,
        }
    }

    #[tokio::test]
    async fn test_directory_round_trip_and_order() {
        let (db, owner) = setup().await;

        let first = Directory {
            id: Uuid::new_v4(),
            owner_id: owner,
            name: "first".to_string(),
            context: Some("You are a poet.".to_string()),
            parent_id: None,
        };
        let mut second = Directory {
            id: Uuid::new_v4(),
            owner_id: owner,
            name: "second".to_string(),
            context: None,
            parent_id: Some(first.id),
        };
        db.insert_directory(&first).await.unwrap();
        db.insert_directory(&second).await.unwrap();

        assert_eq!(db.find_directory(first.id).await.unwrap(), Some(first.clone()));
        let listed = db.list_directories(owner).await.unwrap();
        assert_eq!(listed, vec![first.clone(), second.clone()]);
        assert!(db.has_children(first.id).await.unwrap());

        second.parent_id = None;
        second.context = Some("updated".to_string());
        db.update_directory(&second).await.unwrap();
        assert_eq!(db.find_directory(second.id).await.unwrap(), Some(second.clone()));
        assert!(!db.has_children(first.id).await.unwrap());

        db.delete_directory(first.id).await.unwrap();
        assert_eq!(db.find_directory(first.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_storage_key_conflicts() {
        let (db, owner) = setup().await;

        db.insert_file(&file(owner, "notes", None)).await.unwrap();
        let err = db.insert_file(&file(owner, "notes", None)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_files_and_keys() {
        let (db, owner) = setup().await;
        let dir = Directory {
            id: Uuid::new_v4(),
            owner_id: owner,
            name: "d".to_string(),
            context: None,
            parent_id: None,
        };
        db.insert_directory(&dir).await.unwrap();

        let mut a = file(owner, "a", Some(dir.id));
        let b = file(owner, "b", None);
        db.insert_file(&a).await.unwrap();
        db.insert_file(&b).await.unwrap();

        assert!(db.has_children(dir.id).await.unwrap());
        let keys = db.storage_keys().await.unwrap();
        assert!(keys.contains(&a.storage_key));
        assert!(keys.contains(&b.storage_key));

        a.name = "renamed".to_string();
        a.storage_key = StorageKey::try_from("renamed.ink".to_string()).unwrap();
        db.update_file(&a).await.unwrap();
        assert_eq!(db.find_file(a.id).await.unwrap(), Some(a.clone()));
        assert_eq!(db.list_files(owner).await.unwrap(), vec![a.clone(), b.clone()]);

        db.delete_file(a.id).await.unwrap();
        assert_eq!(db.find_file(a.id).await.unwrap(), None);
        assert!(!db.has_children(dir.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_lists_are_scoped_to_owner() {
        let (db, alice) = setup().await;
        let bob = db.create_user("bob", "hash", "salt").await.unwrap().user.id;

        db.insert_file(&file(alice, "mine", None)).await.unwrap();
        db.insert_file(&file(bob, "theirs", None)).await.unwrap();

        let files = db.list_files(alice).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].owner_id, alice);
    }
}
