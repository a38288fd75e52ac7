use axum::extract::{Json, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Session;
use crate::http_server::api::{ApiJson, ServiceError};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub file_id: Uuid,
    /// What to translate into, e.g. "to French".
    pub query: String,
    #[serde(default)]
    pub write: bool,
}

pub async fn handler(
    State(state): State<ServiceState>,
    session: Session,
    ApiJson(req): ApiJson<TranslateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let principal = session.principal();
    let document = state.workspace().document(principal, req.file_id).await?;

    let response = state
        .orchestrator()
        .translate(&document.content, &req.query, document.file.id)
        .await?;

    if req.write && !response.response.trim().is_empty() {
        state
            .workspace()
            .write_content(principal, document.file.id, &response.response)
            .await?;
        tracing::info!(file_id = %document.file.id, "ASSISTANT: translation written back");
    }

    Ok((http::StatusCode::OK, Json(response)).into_response())
}
