use clap::Args;
use url::Url;

use quill_daemon::state::{AppConfig, AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// API server port written to config.toml
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Default model used by the assistant
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of the model server
    #[arg(long)]
    pub generation_url: Option<Url>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("state error: {0}")]
    StateError(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut config = AppConfig::default();
        if let Some(port) = self.api_port {
            config.api_port = port;
        }
        if let Some(model) = &self.model {
            config.generation.model = model.clone();
        }
        if let Some(url) = &self.generation_url {
            config.generation.url = url.clone();
        }

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        Ok(format!(
            "Initialized quill directory at {}\n  api_port: {}\n  model:    {} ({})",
            state.quill_dir.display(),
            state.config.api_port,
            state.config.generation.model,
            state.config.generation.url,
        ))
    }
}
