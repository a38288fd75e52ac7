use axum::extract::{Json, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::workspace::NewDirectory;

use crate::auth::Session;
use crate::http_server::api::{ApiJson, ServiceError};
use crate::ServiceState;

use super::{resolve_context, DirectoryResponse};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDirectoryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dir: Option<Uuid>,
    #[serde(default)]
    pub context: Option<String>,
    /// Plain description of the directory's purpose; when set, the model
    /// writes the context from it.
    #[serde(default)]
    pub describe: Option<String>,
}

#[tracing::instrument(skip_all)]
pub async fn handler(
    State(state): State<ServiceState>,
    session: Session,
    ApiJson(req): ApiJson<CreateDirectoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let principal = session.principal();
    // anonymous callers never reach the model
    common::guard::authenticated(principal)?;

    let context = resolve_context(state.orchestrator(), req.context, req.describe).await?;
    let request = NewDirectory {
        name: req.name,
        parent: req.dir,
        context,
    };
    let directory = state
        .workspace()
        .create_directory(principal, request)
        .await?;

    Ok((
        http::StatusCode::CREATED,
        Json(DirectoryResponse::from(directory)),
    )
        .into_response())
}
