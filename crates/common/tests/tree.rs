//! Integration tests for the nested workspace view

mod common;

use ::common::tree::TreeNode;
use ::common::workspace::WorkspaceError;

#[tokio::test]
async fn test_tree_mirrors_parent_chain() {
    let (workspace, alice, bob) = common::setup_test_env();

    let one = common::mkdir(&workspace, &alice, "1", None).await;
    let two = common::mkdir(&workspace, &alice, "2", Some(one.id)).await;
    let three = common::mkdir(&workspace, &alice, "3", Some(two.id)).await;
    let ten = common::touch(&workspace, &alice, "10", Some(three.id)).await;
    common::mkdir(&workspace, &bob, "not alice's", None).await;

    let tree = workspace.tree(Some(&alice)).await.unwrap();
    assert_eq!(tree.len(), 1);

    let node = &tree[0];
    assert_eq!(*node.id(), one.id);
    let node = &node.children()[0];
    assert_eq!(*node.id(), two.id);
    let node = &node.children()[0];
    assert_eq!(*node.id(), three.id);
    let leaf = &node.children()[0];
    assert_eq!(*leaf.id(), ten.id);
    assert!(matches!(leaf, TreeNode::File { .. }));
}

#[tokio::test]
async fn test_tree_reflects_moves() {
    let (workspace, alice, _) = common::setup_test_env();

    let a = common::mkdir(&workspace, &alice, "a", None).await;
    let b = common::mkdir(&workspace, &alice, "b", None).await;
    let file = common::touch(&workspace, &alice, "f", Some(a.id)).await;

    workspace
        .move_file(Some(&alice), file.id, Some(b.id))
        .await
        .unwrap();

    let tree = workspace.tree(Some(&alice)).await.unwrap();
    let a_node = tree.iter().find(|n| *n.id() == a.id).unwrap();
    let b_node = tree.iter().find(|n| *n.id() == b.id).unwrap();
    assert!(a_node.children().is_empty());
    assert_eq!(*b_node.children()[0].id(), file.id);
}

#[tokio::test]
async fn test_tree_requires_principal() {
    let (workspace, _, _) = common::setup_test_env();
    let err = workspace.tree(None).await.unwrap_err();
    assert!(matches!(err, WorkspaceError::Unauthenticated));
}
