//! Shared test utilities for workspace integration tests
#![allow(dead_code)]

use common::workspace::{
    Directory, File, MemoryBlobStorage, MemoryStore, NewDirectory, NewFile, User, Workspace,
};
use uuid::Uuid;

pub type TestWorkspace = Workspace<MemoryStore, MemoryBlobStorage>;

/// Set up an empty in-memory workspace and two unrelated users
pub fn setup_test_env() -> (TestWorkspace, User, User) {
    let workspace = Workspace::new(MemoryStore::new(), MemoryBlobStorage::new());
    (workspace, user("alice"), user("bob"))
}

pub fn user(login: &str) -> User {
    User {
        id: Uuid::new_v4(),
        login: login.to_string(),
    }
}

pub async fn mkdir(
    workspace: &TestWorkspace,
    owner: &User,
    name: &str,
    parent: Option<Uuid>,
) -> Directory {
    workspace
        .create_directory(
            Some(owner),
            NewDirectory {
                name: Some(name.to_string()),
                parent,
                context: None,
            },
        )
        .await
        .unwrap()
}

pub async fn touch(
    workspace: &TestWorkspace,
    owner: &User,
    name: &str,
    parent: Option<Uuid>,
) -> File {
    workspace
        .create_file(
            Some(owner),
            NewFile {
                name: Some(name.to_string()),
                parent,
            },
        )
        .await
        .unwrap()
}
