use axum::extract::{Json, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Session;
use crate::http_server::api::{ApiJson, ServiceError};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub file_id: Uuid,
    /// Model to ask; the configured model when absent.
    #[serde(default)]
    pub model: Option<String>,
    pub prompt: String,
}

/// Send a raw prompt and append the reply to the file.
#[tracing::instrument(skip(state, session, req), fields(file_id = %req.file_id))]
pub async fn handler(
    State(state): State<ServiceState>,
    session: Session,
    ApiJson(req): ApiJson<GenerateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let principal = session.principal();
    let info = state.workspace().file_info(principal, req.file_id).await?;

    let orchestrator = state.orchestrator();
    let model = req.model.as_deref().unwrap_or(orchestrator.model());
    let response = orchestrator.generate_raw(model, &req.prompt).await?;

    if !response.response.is_empty() {
        state
            .workspace()
            .append_content(principal, info.file.id, &response.response)
            .await?;
    }

    Ok((http::StatusCode::OK, Json(response)).into_response())
}
