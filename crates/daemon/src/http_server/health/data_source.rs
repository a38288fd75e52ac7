use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use http::request::Parts;

use common::naming::normalize;
use common::workspace::BlobStorage;

use crate::blobs::BlobStore;
use crate::database::Database;
use crate::ServiceState;

/// Something the service cannot answer requests without.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn is_ready(&self) -> Result<(), DataSourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("{0} is not available")]
    DependencyFailure(&'static str),

    #[error("service has received signal indicating it should shutdown")]
    ShuttingDown,
}

/// The dependencies checked by `/readyz`, extracted from the service state.
#[derive(Clone)]
pub struct StateDataSource(Arc<dyn DataSource>);

impl std::fmt::Debug for StateDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StateDataSource")
    }
}

impl StateDataSource {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self(source)
    }

    pub async fn is_ready(&self) -> Result<(), DataSourceError> {
        self.0.is_ready().await
    }
}

/// SQLite must answer a trivial query and blob storage must answer a
/// metadata lookup.
struct Dependencies {
    database: Database,
    blobs: BlobStore,
}

#[async_trait]
impl DataSource for Dependencies {
    async fn is_ready(&self) -> Result<(), DataSourceError> {
        if let Err(e) = sqlx::query("SELECT 1").execute(&*self.database).await {
            tracing::warn!("readiness query failed: {}", e);
            return Err(DataSourceError::DependencyFailure("database"));
        }

        // a missing object is a healthy answer
        let probe = normalize("readiness probe");
        if let Err(e) = self.blobs.exists(&probe).await {
            tracing::warn!("blob storage probe failed: {}", e);
            return Err(DataSourceError::DependencyFailure("blob storage"));
        }
        Ok(())
    }
}

#[async_trait]
impl FromRequestParts<ServiceState> for StateDataSource {
    type Rejection = ();

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        Ok(StateDataSource::new(Arc::new(Dependencies {
            database: state.database().clone(),
            blobs: state.workspace().blobs().clone(),
        })))
    }
}
