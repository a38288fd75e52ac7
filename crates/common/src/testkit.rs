//! In-process doubles for exercising the workspace and the orchestrator
//! without a model server.
//!
//! ```rust,ignore
//! use common::testkit::ScriptedBackend;
//!
//! let backend = ScriptedBackend::new();
//! backend.push_text("Bonjour.", 3, 1_000_000_000);
//! let orchestrator = Orchestrator::new(Arc::new(backend.clone()), "llama3");
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::generation::{BackendError, GenerationBackend, GenerationOutput, GenerationRequest};

pub const DEFAULT_REPLY: &str = "generated text";

/// A backend that answers from a queue of scripted replies and records
/// every request it receives. Once the queue is drained it answers
/// `{"text": DEFAULT_REPLY}`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    inner: Arc<Mutex<ScriptedBackendInner>>,
}

#[derive(Debug, Default)]
struct ScriptedBackendInner {
    replies: VecDeque<Result<GenerationOutput, BackendError>>,
    requests: Vec<GenerationRequest>,
    models: Vec<String>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptedBackendInner> {
        // a panicking test holding the lock poisons it; the data is still usable
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a reply shaped like `{"text": text}`.
    pub fn push_text(&self, text: &str, eval_count: u64, eval_duration: u64) {
        let body = serde_json::json!({ "text": text }).to_string();
        self.push_raw(&body, eval_count, eval_duration);
    }

    /// Queue a reply whose response body is used verbatim.
    pub fn push_raw(&self, response: &str, eval_count: u64, eval_duration: u64) {
        self.lock().replies.push_back(Ok(GenerationOutput {
            response: response.to_string(),
            total_duration: eval_duration,
            load_duration: 0,
            prompt_eval_count: 0,
            eval_count,
            eval_duration,
        }));
    }

    pub fn push_error(&self, error: BackendError) {
        self.lock().replies.push_back(Err(error));
    }

    pub fn set_models(&self, models: &[&str]) {
        self.lock().models = models.iter().map(|m| m.to_string()).collect();
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.lock().requests.clone()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutput, BackendError> {
        let mut inner = self.lock();
        inner.requests.push(request);
        inner.replies.pop_front().unwrap_or_else(|| {
            Ok(GenerationOutput {
                response: serde_json::json!({ "text": DEFAULT_REPLY }).to_string(),
                ..Default::default()
            })
        })
    }

    async fn list_models(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.lock().models.clone())
    }
}
