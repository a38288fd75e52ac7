//! [`GenerationBackend`] over an Ollama server's HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use moka::sync::Cache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use common::generation::{
    BackendError, GenerationBackend, GenerationOptions, GenerationOutput, GenerationRequest,
};

/// How long a fetched model list is served before asking again.
pub const MODELS_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
pub struct OllamaBackend {
    base: Url,
    client: Client,
    models: Cache<(), Vec<String>>,
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a GenerationOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

impl OllamaBackend {
    pub fn new(base: Url) -> Self {
        Self::with_client(base, Client::new())
    }

    /// `base` may carry a path prefix, e.g. behind a reverse proxy; it is
    /// kept when endpoints are joined onto it.
    pub fn with_client(mut base: Url, client: Client) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self {
            base,
            client,
            models: Cache::builder()
                .max_capacity(1)
                .time_to_live(MODELS_TTL)
                .build(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base
            .join(path)
            .map_err(|e| BackendError::Unreachable(format!("invalid backend url: {}", e)))
    }

    async fn fetch_models(&self) -> Result<Vec<String>, BackendError> {
        let url = self.endpoint("api/tags")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BackendError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "model list unavailable");
            return Ok(Vec::new());
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        let models: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
        self.models.insert((), models.clone());
        Ok(models)
    }
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutput, BackendError> {
        let url = self.endpoint("api/generate")?;
        let body = GenerateBody {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            options: &request.options,
            format: request.format.as_deref(),
        };

        tracing::debug!(model = %request.model, len = request.prompt.len(), "calling backend");
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BackendError::Status(status.as_u16(), text));
        }

        response
            .json::<GenerationOutput>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn list_models(&self) -> Result<Vec<String>, BackendError> {
        if let Some(models) = self.models.get(&()) {
            return Ok(models);
        }
        self.fetch_models().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::extract::State;
    use axum::routing::{get, post};
    use axum::{Json, Router};

    use super::*;

    async fn serve(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Url::parse(&format!("http://{}", addr)).unwrap()
    }

    fn request(format: Option<&str>) -> GenerationRequest {
        GenerationRequest {
            model: "llama3".to_string(),
            prompt: "Say hi".to_string(),
            options: GenerationOptions::default(),
            format: format.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_generate_forwards_request_and_reads_metrics() {
        let router = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["model"], "llama3");
                assert_eq!(body["stream"], false);
                assert_eq!(body["format"], "json");
                assert_eq!(body["options"]["top_k"], 40);
                Json(serde_json::json!({
                    "model": "llama3",
                    "response": "{\"text\": \"hi\"}",
                    "done": true,
                    "total_duration": 5_000,
                    "load_duration": 1_000,
                    "prompt_eval_count": 3,
                    "eval_count": 2,
                    "eval_duration": 4_000
                }))
            }),
        );
        let backend = OllamaBackend::new(serve(router).await);

        let output = backend.generate(request(Some("json"))).await.unwrap();
        assert_eq!(output.response, "{\"text\": \"hi\"}");
        assert_eq!(output.eval_count, 2);
        assert_eq!(output.eval_duration, 4_000);
    }

    #[tokio::test]
    async fn test_generate_error_status_carries_body() {
        let router = Router::new().route(
            "/api/generate",
            post(|| async { (http::StatusCode::NOT_FOUND, "model not found") }),
        );
        let backend = OllamaBackend::new(serve(router).await);

        let err = backend.generate(request(None)).await.unwrap_err();
        assert_eq!(err, BackendError::Status(404, "model not found".to_string()));
    }

    #[tokio::test]
    async fn test_base_path_prefix_is_kept() {
        let router = Router::new().route(
            "/ollama/api/generate",
            post(|| async { Json(serde_json::json!({ "response": "proxied" })) }),
        );
        let root = serve(router).await;
        let backend = OllamaBackend::new(root.join("ollama").unwrap());

        let output = backend.generate(request(None)).await.unwrap();
        assert_eq!(output.response, "proxied");
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let backend = OllamaBackend::new(Url::parse("http://127.0.0.1:1").unwrap());
        let err = backend.generate(request(None)).await.unwrap_err();
        assert!(matches!(err, BackendError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_model_list_is_cached() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/api/tags",
                get(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(serde_json::json!({
                        "models": [{"name": "llama3:latest"}, {"name": "mistral:7b"}]
                    }))
                }),
            )
            .with_state(hits.clone());
        let backend = OllamaBackend::new(serve(router).await);

        let first = backend.list_models().await.unwrap();
        let second = backend.list_models().await.unwrap();
        assert_eq!(first, vec!["llama3:latest", "mistral:7b"]);
        assert_eq!(first, second);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_model_list_is_empty_and_not_cached() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/api/tags",
                get(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    http::StatusCode::INTERNAL_SERVER_ERROR
                }),
            )
            .with_state(hits.clone());
        let backend = OllamaBackend::new(serve(router).await);

        assert!(backend.list_models().await.unwrap().is_empty());
        assert!(backend.list_models().await.unwrap().is_empty());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
