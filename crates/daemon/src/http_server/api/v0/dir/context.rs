use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Session;
use crate::http_server::api::v0::file::context::ContextResponse;
use crate::http_server::api::{ApiJson, ServiceError};
use crate::ServiceState;

use super::{resolve_context, DirectoryResponse};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetContextRequest {
    /// New context; absent or null clears it.
    #[serde(default)]
    pub context: Option<String>,
    /// Regenerate the context from this description instead.
    #[serde(default)]
    pub describe: Option<String>,
}

pub async fn get_handler(
    State(state): State<ServiceState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let context = state
        .workspace()
        .directory_context(session.principal(), id)
        .await?;
    Ok((http::StatusCode::OK, Json(ContextResponse { context })).into_response())
}

#[tracing::instrument(skip(state, session, req))]
pub async fn put_handler(
    State(state): State<ServiceState>,
    session: Session,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<SetContextRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let principal = session.principal();
    // owner check before any model call
    state.workspace().directory_context(principal, id).await?;

    let context = resolve_context(state.orchestrator(), req.context, req.describe).await?;
    let directory = state
        .workspace()
        .set_directory_context(principal, id, context)
        .await?;
    Ok((http::StatusCode::OK, Json(DirectoryResponse::from(directory))).into_response())
}
