use std::sync::Arc;

use uuid::Uuid;

use super::parse::extract_text;
use super::prompts;
use super::{
    GenerationBackend, GenerationError, GenerationOptions, GenerationOutput, GenerationRequest,
    GenerationResponse, Usage,
};
use crate::text::{split_into_chunks, DEFAULT_MAX_CHUNK_LEN};

const TEXT_FIELD: &str = "text";

/// Drives documents through a [`GenerationBackend`] chunk by chunk.
///
/// Chunks are sent one at a time, in document order. There is no timeout:
/// a slow model simply makes the call slow.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    backend: Arc<dyn GenerationBackend>,
    model: String,
    options: GenerationOptions,
    max_chunk_len: usize,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn GenerationBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            options: GenerationOptions::default(),
            max_chunk_len: DEFAULT_MAX_CHUNK_LEN,
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_max_chunk_len(mut self, max_chunk_len: usize) -> Self {
        self.max_chunk_len = max_chunk_len.max(1);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn backend(&self) -> &Arc<dyn GenerationBackend> {
        &self.backend
    }

    async fn call(
        &self,
        model: &str,
        prompt: String,
        format: Option<&str>,
    ) -> Result<GenerationOutput, GenerationError> {
        let request = GenerationRequest {
            model: model.to_string(),
            prompt,
            options: self.options.clone(),
            format: format.map(str::to_string),
        };
        Ok(self.backend.generate(request).await?)
    }

    /// One JSON-mode call whose reply is reduced to its `text` field.
    async fn ask(&self, prompt: String, usage: &mut Usage) -> Result<String, GenerationError> {
        let output = self.call(&self.model, prompt, Some("json")).await?;
        usage.record(&output);
        Ok(extract_text(&output.response, TEXT_FIELD))
    }

    /// Apply `prompt` to every chunk and join the fragments in order.
    async fn per_chunk<F>(&self, text: &str, prompt: F) -> Result<GenerationResponse, GenerationError>
    where
        F: Fn(&str) -> String,
    {
        let mut usage = Usage::default();
        if text.trim().is_empty() {
            return Ok(usage.into_response(String::new()));
        }

        let chunks = split_into_chunks(text, self.max_chunk_len);
        let mut fragments = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            tracing::debug!(chunk = i, of = chunks.len(), "sending chunk");
            let fragment = self.ask(prompt(chunk), &mut usage).await?;
            if !fragment.is_empty() {
                fragments.push(fragment);
            }
        }

        Ok(usage.into_response(fragments.join(" ")))
    }

    /// Rephrase `text` in full, steered by the directory `context`.
    #[tracing::instrument(skip(self, text, context), fields(model = %self.model, len = text.len()))]
    pub async fn rephrase(
        &self,
        text: &str,
        context: &str,
        file_id: Uuid,
    ) -> Result<GenerationResponse, GenerationError> {
        let response = self
            .per_chunk(text, |chunk| prompts::rephrase(context, chunk))
            .await?;
        tracing::info!(eval_count = response.eval_count, "rephrase finished");
        Ok(response)
    }

    /// Translate `text` into the language `user_query` asks for.
    #[tracing::instrument(skip(self, text, user_query), fields(model = %self.model, len = text.len()))]
    pub async fn translate(
        &self,
        text: &str,
        user_query: &str,
        file_id: Uuid,
    ) -> Result<GenerationResponse, GenerationError> {
        let response = self
            .per_chunk(text, |chunk| prompts::translate(user_query, chunk))
            .await?;
        tracing::info!(eval_count = response.eval_count, "translate finished");
        Ok(response)
    }

    /// Write new text for `user_query` using the document as background.
    pub async fn add_text(
        &self,
        text: &str,
        user_query: &str,
        file_id: Uuid,
    ) -> Result<GenerationResponse, GenerationError> {
        self.add_text_with_context(text, user_query, "", file_id)
            .await
    }

    /// Like [`Orchestrator::add_text`], with a directory persona.
    ///
    /// A single chunk is answered directly. Longer documents get one partial
    /// answer per chunk and a final synthesis call that merges them; the
    /// synthesis call counts towards the returned metrics.
    #[tracing::instrument(skip(self, text, user_query, context), fields(model = %self.model, len = text.len()))]
    pub async fn add_text_with_context(
        &self,
        text: &str,
        user_query: &str,
        context: &str,
        file_id: Uuid,
    ) -> Result<GenerationResponse, GenerationError> {
        let mut usage = Usage::default();
        let chunks = split_into_chunks(text, self.max_chunk_len);

        if let [chunk] = chunks.as_slice() {
            let answer = self
                .ask(prompts::add_text(context, user_query, chunk), &mut usage)
                .await?;
            return Ok(usage.into_response(answer));
        }

        let mut partials = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let partial = self
                .ask(prompts::add_text(context, user_query, chunk), &mut usage)
                .await?;
            if !partial.is_empty() {
                partials.push(partial);
            }
        }

        tracing::debug!(partials = partials.len(), "synthesizing partial answers");
        let answer = self
            .ask(prompts::synthesize(context, user_query, &partials), &mut usage)
            .await?;
        Ok(usage.into_response(answer))
    }

    /// Turn a short description of a directory's purpose into a persona.
    ///
    /// A blank description, or a reply with no usable text, yields
    /// [`prompts::DEFAULT_PERSONA`].
    #[tracing::instrument(skip(self, description), fields(model = %self.model))]
    pub async fn change_directory_context(
        &self,
        description: &str,
    ) -> Result<String, GenerationError> {
        if description.trim().is_empty() {
            return Ok(prompts::DEFAULT_PERSONA.to_string());
        }

        let mut usage = Usage::default();
        let persona = self
            .ask(prompts::describe_persona(description), &mut usage)
            .await?;
        let persona = persona.trim();
        if persona.is_empty() {
            tracing::warn!("model returned no persona, keeping the default");
            return Ok(prompts::DEFAULT_PERSONA.to_string());
        }
        Ok(persona.to_string())
    }

    /// Send `prompt` verbatim to `model` and return the raw reply text.
    #[tracing::instrument(skip(self, prompt), fields(len = prompt.len()))]
    pub async fn generate_raw(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<GenerationResponse, GenerationError> {
        let mut usage = Usage::default();
        let output = self.call(model, prompt.to_string(), None).await?;
        usage.record(&output);
        Ok(usage.into_response(output.response.trim().to_string()))
    }

    pub async fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        Ok(self.backend.list_models().await?)
    }
}
