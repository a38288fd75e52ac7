use clap::Args;

use quill_daemon::state::AppState;
use quill_daemon::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override API server port (default from config)
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Override the model used by the assistant (default from config)
    #[arg(long)]
    pub model: Option<String>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,

    /// Seconds SIGTERM waits for in-flight requests
    #[arg(long, default_value_t = 10)]
    pub shutdown_grace: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    StateError(#[from] quill_daemon::state::StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // Load state from config path (or default ~/.quill)
        let state = AppState::load(ctx.config_path.clone())?;

        let mut generation = state.config.generation.clone();
        if let Some(model) = &self.model {
            generation.model = model.clone();
        }

        let config = ServiceConfig {
            api_port: self.api_port.unwrap_or(state.config.api_port),
            sqlite_path: Some(state.db_path),
            files_path: Some(state.files_path),
            generation,
            log_level: tracing::Level::DEBUG,
            log_dir: self.log_dir.clone(),
            shutdown_grace: std::time::Duration::from_secs(self.shutdown_grace),
        };

        spawn_service(&config).await;
        Ok("daemon ended".to_string())
    }
}
