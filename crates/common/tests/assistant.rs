//! Integration tests for running the assistant over workspace documents

mod common;

use std::sync::Arc;

use ::common::generation::Orchestrator;
use ::common::testkit::ScriptedBackend;
use ::common::workspace::NewDirectory;

const STORY: &str = "The harbour was quiet at dawn. Boats rocked on the grey water. \
A gull cried somewhere over the pier.";

#[tokio::test]
async fn test_rephrase_document_with_directory_persona() {
    let (workspace, alice, _) = common::setup_test_env();
    let dir = workspace
        .create_directory(
            Some(&alice),
            NewDirectory {
                name: Some("Sea".to_string()),
                parent: None,
                context: Some("You are a sailor telling stories.".to_string()),
            },
        )
        .await
        .unwrap();
    let file = common::touch(&workspace, &alice, "Harbour", Some(dir.id)).await;
    workspace
        .write_content(Some(&alice), file.id, STORY)
        .await
        .unwrap();

    let backend = ScriptedBackend::new();
    backend.push_text("Dawn, and the harbour slept.", 7, 500_000_000);
    backend.push_text("Boats swayed on slate water.", 9, 500_000_000);
    backend.push_text("A gull called over the pier.", 8, 500_000_000);
    let orchestrator =
        Orchestrator::new(Arc::new(backend.clone()), "test-model").with_max_chunk_len(40);

    let document = workspace.document(Some(&alice), file.id).await.unwrap();
    let response = orchestrator
        .rephrase(&document.content, &document.context, file.id)
        .await
        .unwrap();

    assert_eq!(
        response.response,
        "Dawn, and the harbour slept. Boats swayed on slate water. A gull called over the pier."
    );
    assert_eq!(response.eval_count, 24);
    assert!((response.tokenpersecond - 16.0).abs() < 1e-9);

    let requests = backend.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests
        .iter()
        .all(|r| r.prompt.contains("You are a sailor telling stories.")));
}

#[tokio::test]
async fn test_add_text_result_can_be_appended() {
    let (workspace, alice, _) = common::setup_test_env();
    let file = common::touch(&workspace, &alice, "Harbour", None).await;
    workspace
        .write_content(Some(&alice), file.id, "The harbour was quiet at dawn.")
        .await
        .unwrap();

    let backend = ScriptedBackend::new();
    backend.push_text("Then the fishermen arrived.", 5, 1_000_000_000);
    let orchestrator = Orchestrator::new(Arc::new(backend.clone()), "test-model");

    let document = workspace.document(Some(&alice), file.id).await.unwrap();
    let response = orchestrator
        .add_text_with_context(
            &document.content,
            "continue the story",
            &document.context,
            file.id,
        )
        .await
        .unwrap();
    let content = workspace
        .append_content(Some(&alice), file.id, &response.response)
        .await
        .unwrap();

    assert_eq!(
        content,
        "The harbour was quiet at dawn.\n\nThen the fishermen arrived."
    );
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn test_described_persona_becomes_directory_context() {
    let (workspace, alice, _) = common::setup_test_env();
    let dir = common::mkdir(&workspace, &alice, "Recipes", None).await;

    let backend = ScriptedBackend::new();
    backend.push_text("You are a chef who writes warm, precise recipes.", 12, 0);
    let orchestrator = Orchestrator::new(Arc::new(backend), "test-model");

    let persona = orchestrator
        .change_directory_context("a cooking blog")
        .await
        .unwrap();
    workspace
        .set_directory_context(Some(&alice), dir.id, Some(persona))
        .await
        .unwrap();

    let context = workspace
        .directory_context(Some(&alice), dir.id)
        .await
        .unwrap();
    assert_eq!(context, "You are a chef who writes warm, precise recipes.");

    let tree = workspace.tree(Some(&alice)).await.unwrap();
    let json = serde_json::to_value(&tree).unwrap();
    assert_eq!(json[0]["summary"], context);
}

#[tokio::test]
async fn test_rephrase_long_document_with_default_chunking() {
    let (workspace, alice, _) = common::setup_test_env();
    let file = common::touch(&workspace, &alice, "Logbook", None).await;
    let text = (1..=40)
        .map(|i| format!("Entry {} records the weather and the state of the sails.", i))
        .collect::<Vec<_>>()
        .join(" ");
    workspace
        .write_content(Some(&alice), file.id, &text)
        .await
        .unwrap();

    let backend = ScriptedBackend::new();
    for eval_count in [12, 15, 9, 7] {
        backend.push_text("Rewritten.", eval_count, 250_000_000);
    }
    let orchestrator = Orchestrator::new(Arc::new(backend.clone()), "test-model");

    let document = workspace.document(Some(&alice), file.id).await.unwrap();
    assert!(document.content.chars().count() >= 2000);
    let response = orchestrator
        .rephrase(&document.content, &document.context, file.id)
        .await
        .unwrap();

    let requests = backend.requests();
    assert!(requests.len() >= 3);
    assert!(requests.len() <= 4);
    let expected: u64 = [12, 15, 9, 7].iter().take(requests.len()).sum();
    assert_eq!(response.eval_count, expected);
    for request in &requests {
        let chunk = request
            .prompt
            .split("Text:\n")
            .nth(1)
            .and_then(|rest| rest.split("\n\n").next())
            .unwrap();
        assert!(chunk.chars().count() <= 800);
        assert!(chunk.starts_with("Entry "));
    }
}
