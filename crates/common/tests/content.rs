//! Integration tests for reading and writing file content

mod common;

use ::common::workspace::{BlobStorage, WorkspaceError};

#[tokio::test]
async fn test_write_then_read_and_append() {
    let (workspace, alice, _) = common::setup_test_env();
    let file = common::touch(&workspace, &alice, "Story", None).await;

    workspace
        .write_content(Some(&alice), file.id, "It was a dark night.")
        .await
        .unwrap();
    let appended = workspace
        .append_content(Some(&alice), file.id, "The wind howled.")
        .await
        .unwrap();

    assert_eq!(appended, "It was a dark night.\n\nThe wind howled.");
    assert_eq!(
        workspace
            .read_content(Some(&alice), file.id)
            .await
            .unwrap(),
        appended
    );
}

#[tokio::test]
async fn test_missing_blob_is_not_found() {
    let (workspace, alice, _) = common::setup_test_env();
    let file = common::touch(&workspace, &alice, "Ghost", None).await;
    workspace.blobs().delete(&file.storage_key).await.unwrap();

    let err = workspace
        .read_content(Some(&alice), file.id)
        .await
        .unwrap_err();
    match err {
        WorkspaceError::NotFound(msg) => assert_eq!(msg, "file not found on disk"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_foreign_content_is_forbidden() {
    let (workspace, alice, bob) = common::setup_test_env();
    let file = common::touch(&workspace, &alice, "Diary", None).await;

    let err = workspace
        .read_content(Some(&bob), file.id)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkspaceError::Forbidden("file")));

    let err = workspace
        .write_content(Some(&bob), file.id, "defaced")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkspaceError::Forbidden("file")));
}

#[tokio::test]
async fn test_file_context_follows_parent() {
    let (workspace, alice, _) = common::setup_test_env();

    let dir = workspace
        .create_directory(
            Some(&alice),
            ::common::workspace::NewDirectory {
                name: Some("Poems".to_string()),
                parent: None,
                context: Some("You are a poet.".to_string()),
            },
        )
        .await
        .unwrap();
    let nested = common::touch(&workspace, &alice, "Sonnet", Some(dir.id)).await;
    let root = common::touch(&workspace, &alice, "Loose", None).await;

    assert_eq!(
        workspace
            .file_context(Some(&alice), nested.id)
            .await
            .unwrap(),
        "You are a poet."
    );
    assert_eq!(
        workspace.file_context(Some(&alice), root.id).await.unwrap(),
        ""
    );

    let document = workspace.document(Some(&alice), nested.id).await.unwrap();
    assert_eq!(document.context, "You are a poet.");
    assert_eq!(document.content, "");
}

#[tokio::test]
async fn test_info_views() {
    let (workspace, alice, _) = common::setup_test_env();

    let dir = common::mkdir(&workspace, &alice, "Book", None).await;
    let sub = common::mkdir(&workspace, &alice, "Part I", Some(dir.id)).await;
    let file = common::touch(&workspace, &alice, "Preface", Some(dir.id)).await;
    common::touch(&workspace, &alice, "Elsewhere", None).await;

    let info = workspace.directory_info(Some(&alice), dir.id).await.unwrap();
    assert_eq!(info.directory.id, dir.id);
    assert_eq!(info.directories, vec![sub]);
    assert_eq!(info.files, vec![file.clone()]);

    let info = workspace.file_info(Some(&alice), file.id).await.unwrap();
    assert_eq!(info.directory.map(|d| d.id), Some(dir.id));
}
