//! Integration tests for deleting files and directories

mod common;

use ::common::workspace::{BlobStorage, WorkspaceError};

#[tokio::test]
async fn test_delete_file_removes_record_and_content() {
    let (workspace, alice, _) = common::setup_test_env();
    let file = common::touch(&workspace, &alice, "Scratch", None).await;

    workspace.delete_file(Some(&alice), file.id).await.unwrap();

    assert!(!workspace.blobs().exists(&file.storage_key).await.unwrap());
    let err = workspace
        .file_info(Some(&alice), file.id)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkspaceError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_non_empty_directory_conflicts() {
    let (workspace, alice, _) = common::setup_test_env();

    let dir = common::mkdir(&workspace, &alice, "Drafts", None).await;
    let file = common::touch(&workspace, &alice, "Chapter", Some(dir.id)).await;

    let err = workspace
        .delete_directory(Some(&alice), dir.id)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkspaceError::Conflict(_)));

    workspace.delete_file(Some(&alice), file.id).await.unwrap();
    workspace
        .delete_directory(Some(&alice), dir.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_directory_with_subdirectory_is_not_empty() {
    let (workspace, alice, _) = common::setup_test_env();

    let dir = common::mkdir(&workspace, &alice, "Outer", None).await;
    common::mkdir(&workspace, &alice, "Inner", Some(dir.id)).await;

    let err = workspace
        .delete_directory(Some(&alice), dir.id)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkspaceError::Conflict(_)));
}

#[tokio::test]
async fn test_delete_checks_ownership_before_anything() {
    let (workspace, alice, bob) = common::setup_test_env();
    let file = common::touch(&workspace, &alice, "Mine", None).await;

    let err = workspace
        .delete_file(Some(&bob), file.id)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkspaceError::Forbidden(_)));
    assert!(workspace.blobs().exists(&file.storage_key).await.unwrap());

    let err = workspace.delete_file(None, file.id).await.unwrap_err();
    assert!(matches!(err, WorkspaceError::Unauthenticated));
}

#[tokio::test]
async fn test_deleted_name_is_reused() {
    let (workspace, alice, _) = common::setup_test_env();

    let first = common::touch(&workspace, &alice, "Notes", None).await;
    workspace.delete_file(Some(&alice), first.id).await.unwrap();

    let again = common::touch(&workspace, &alice, "Notes", None).await;
    assert_eq!(again.name, "Notes");
    assert_eq!(again.storage_key, first.storage_key);
}
