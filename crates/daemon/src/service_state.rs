use std::sync::Arc;

use axum::extract::FromRef;
use url::Url;

use common::generation::{GenerationBackend, Orchestrator};
use common::workspace::Workspace;

use crate::blobs::{BlobStore, BlobsSetupError};
use crate::database::{Database, DatabaseSetupError};
use crate::ollama::OllamaBackend;
use crate::service_config::Config;
use crate::state::GenerationConfig;

pub type AppWorkspace = Workspace<Database, BlobStore>;

/// Main service state shared by every request handler
#[derive(Clone)]
pub struct State {
    database: Database,
    workspace: AppWorkspace,
    orchestrator: Orchestrator,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        // 1. Setup database
        let sqlite_database_url = match config.sqlite_path {
            Some(ref path) => {
                if !path.exists() {
                    return Err(StateSetupError::DatabasePathDoesNotExist);
                }
                Url::parse(&format!("sqlite://{}", path.display()))
                    .map_err(|_| StateSetupError::InvalidDatabaseUrl)
            }
            // otherwise just set up an in-memory database
            None => Url::parse("sqlite::memory:").map_err(|_| StateSetupError::InvalidDatabaseUrl),
        }?;
        tracing::info!("Database URL: {:?}", sqlite_database_url);
        let database = Database::connect(&sqlite_database_url).await?;

        // 2. Setup document content storage
        let blobs = match config.files_path {
            Some(ref path) => BlobStore::local(path).await?,
            None => {
                tracing::warn!("no files directory configured, document content is kept in memory");
                BlobStore::memory()
            }
        };

        // 3. Setup the model backend
        tracing::info!(
            url = %config.generation.url,
            model = %config.generation.model,
            "using generation backend"
        );
        let backend = Arc::new(OllamaBackend::new(config.generation.url.clone()));

        Ok(Self::from_parts(database, blobs, backend, &config.generation))
    }

    /// Assemble state from already constructed parts.
    pub fn from_parts(
        database: Database,
        blobs: BlobStore,
        backend: Arc<dyn GenerationBackend>,
        generation: &GenerationConfig,
    ) -> Self {
        let workspace = Workspace::new(database.clone(), blobs);
        let orchestrator = Orchestrator::new(backend, generation.model.clone())
            .with_options(generation.options())
            .with_max_chunk_len(generation.max_chunk_len);

        Self {
            database,
            workspace,
            orchestrator,
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &AppWorkspace {
        &self.workspace
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }
}

impl FromRef<State> for Database {
    fn from_ref(state: &State) -> Self {
        state.database.clone()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("Database path does not exist")]
    DatabasePathDoesNotExist,
    #[error("Database setup error: {0}")]
    DatabaseSetupError(#[from] DatabaseSetupError),
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,
    #[error("Blob store error: {0}")]
    BlobsSetupError(#[from] BlobsSetupError),
}
