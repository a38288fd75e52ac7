//! Model-backed text generation.
//!
//! The [`Orchestrator`] turns documents of any length into a sequence of
//! bounded calls against a [`GenerationBackend`] and folds the replies back
//! into one [`GenerationResponse`].

mod orchestrator;
pub mod parse;
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use orchestrator::Orchestrator;
pub use parse::extract_text;

/// Sampling options forwarded to the backend with every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub num_ctx: u32,
    pub top_k: u32,
    pub top_p: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            num_ctx: 4096,
            top_k: 40,
            top_p: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub options: GenerationOptions,
    /// Output format hint, `Some("json")` when a JSON object is expected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// What a single backend call reports. Durations are in nanoseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub response: String,
    #[serde(default)]
    pub total_duration: u64,
    #[serde(default)]
    pub load_duration: u64,
    #[serde(default)]
    pub prompt_eval_count: u64,
    #[serde(default)]
    pub eval_count: u64,
    #[serde(default)]
    pub eval_duration: u64,
}

/// Aggregated result handed back to callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub response: String,
    pub total_duration: u64,
    pub load_duration: u64,
    pub eval_count: u64,
    pub tokenpersecond: f64,
}

/// Running totals over every backend call made for one operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub total_duration: u64,
    pub load_duration: u64,
    pub eval_count: u64,
    pub eval_duration: u64,
}

impl Usage {
    pub fn record(&mut self, output: &GenerationOutput) {
        self.total_duration += output.total_duration;
        self.load_duration += output.load_duration;
        self.eval_count += output.eval_count;
        self.eval_duration += output.eval_duration;
    }

    /// Tokens generated per second of evaluation time, zero when no
    /// evaluation time was reported.
    pub fn tokens_per_second(&self) -> f64 {
        if self.eval_duration == 0 {
            return 0.0;
        }
        self.eval_count as f64 / (self.eval_duration as f64 / 1e9)
    }

    pub fn into_response(self, response: String) -> GenerationResponse {
        GenerationResponse {
            response,
            total_duration: self.total_duration,
            load_duration: self.load_duration,
            eval_count: self.eval_count,
            tokenpersecond: self.tokens_per_second(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("generation backend unreachable: {0}")]
    Unreachable(String),
    #[error("generation backend returned status {0}: {1}")]
    Status(u16, String),
    #[error("generation backend sent an unreadable reply: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("upstream failure: {0}")]
    Upstream(#[from] BackendError),
}

/// A model server that can complete prompts.
#[async_trait]
pub trait GenerationBackend: Send + Sync + std::fmt::Debug {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutput, BackendError>;

    /// Names of the models the backend can serve.
    async fn list_models(&self) -> Result<Vec<String>, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_sums_and_rates() {
        let mut usage = Usage::default();
        usage.record(&GenerationOutput {
            response: String::new(),
            total_duration: 10,
            load_duration: 1,
            prompt_eval_count: 3,
            eval_count: 20,
            eval_duration: 500_000_000,
        });
        usage.record(&GenerationOutput {
            response: String::new(),
            total_duration: 5,
            load_duration: 2,
            prompt_eval_count: 3,
            eval_count: 30,
            eval_duration: 500_000_000,
        });

        let response = usage.into_response("done".to_string());
        assert_eq!(response.total_duration, 15);
        assert_eq!(response.load_duration, 3);
        assert_eq!(response.eval_count, 50);
        assert!((response.tokenpersecond - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_eval_time_yields_zero_rate() {
        let usage = Usage {
            eval_count: 12,
            ..Default::default()
        };
        assert_eq!(usage.tokens_per_second(), 0.0);
    }
}
