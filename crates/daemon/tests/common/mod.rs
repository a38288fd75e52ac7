//! Shared setup for API integration tests
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::Router;
use http::{Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use ::common::testkit::ScriptedBackend;
use quill_daemon::blobs::BlobStore;
use quill_daemon::database::Database;
use quill_daemon::http_server;
use quill_daemon::{GenerationConfig, ServiceState};

pub struct TestApp {
    pub router: Router,
    pub state: ServiceState,
    pub backend: ScriptedBackend,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).unwrap()
    }
}

/// Router over in-memory SQLite, in-memory blobs and a scripted model
pub async fn setup_test_app() -> TestApp {
    let database = Database::in_memory().await.unwrap();
    let backend = ScriptedBackend::new();
    let generation = GenerationConfig {
        max_chunk_len: 40,
        ..Default::default()
    };
    let state = ServiceState::from_parts(
        database,
        BlobStore::memory(),
        Arc::new(backend.clone()),
        &generation,
    );

    let config = http_server::Config::new(
        SocketAddr::from(([127, 0, 0, 1], 0)),
        tracing::Level::DEBUG,
    );
    let router = http_server::router(config, state.clone());

    TestApp {
        router,
        state,
        backend,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.dispatch(request).await
    }

    /// Send `body` as-is, with an optional content type
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        content_type: Option<&str>,
        body: &str,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(content_type) = content_type {
            builder = builder.header(http::header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// Register `login` and return its session token
    pub async fn signup(&self, login: &str) -> String {
        let response = self
            .post(
                "/api/v0/user/signup",
                None,
                serde_json::json!({"login": login, "password": "hunter2"}),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.json()["token"].as_str().unwrap().to_string()
    }

    pub async fn create_file(&self, token: &str, name: &str, dir: Option<&str>) -> Value {
        let response = self
            .post(
                "/api/v0/file",
                Some(token),
                serde_json::json!({"name": name, "dir": dir}),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.json()
    }

    pub async fn write(&self, token: &str, file_id: &str, content: &str) {
        let response = self
            .post(
                &format!("/api/v0/file/{}/contents", file_id),
                Some(token),
                serde_json::json!({ "content": content }),
            )
            .await;
        assert_eq!(response.status, StatusCode::NO_CONTENT);
    }

    pub async fn read(&self, token: &str, file_id: &str) -> String {
        let response = self
            .get(&format!("/api/v0/file/{}/contents", file_id), Some(token))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.text()
    }
}
