use std::error::Error;
use std::path::PathBuf;

use url::Url;

use quill_daemon::http_server::api::client::{ApiClient, ApiError};
use quill_daemon::state::AppState;

const FALLBACK_API_PORT: u16 = 5001;

fn local_api(port: u16) -> Url {
    let mut url = Url::parse("http://localhost").expect("hardcoded URL must parse");
    // http URLs always accept a port
    let _ = url.set_port(Some(port));
    url
}

/// Where CLI commands send their requests.
///
/// An explicit `--remote` wins; otherwise the `api_port` of an initialized
/// config directory, otherwise port 5001 on localhost.
pub fn resolve_remote(explicit: Option<Url>, config_path: Option<PathBuf>) -> Url {
    explicit.unwrap_or_else(|| {
        let port = AppState::load(config_path)
            .map(|state| state.config.api_port)
            .unwrap_or(FALLBACK_API_PORT);
        local_api(port)
    })
}

#[derive(Clone)]
pub struct OpContext {
    pub client: ApiClient,
    /// Custom config directory (defaults to ~/.quill)
    pub config_path: Option<PathBuf>,
}

impl OpContext {
    pub fn new(remote: Url, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        Ok(Self {
            client: ApiClient::new(&remote)?,
            config_path,
        })
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

/// Declare the `Command` enum and its dispatch from `(Variant, Op)` pairs.
#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => op
                            .execute(ctx)
                            .await
                            .map(OpOutput::$variant)
                            .map_err(OpError::$variant),
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(OpOutput::$variant(output) => write!(f, "{}", output),)*
                }
            }
        }
    };
}
