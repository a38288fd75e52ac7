use axum::extract::{Json, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Session;
use crate::http_server::api::{ApiJson, ServiceError};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RephraseRequest {
    pub file_id: Uuid,
    /// Replace the file content with the rephrased text.
    #[serde(default)]
    pub write: bool,
}

/// Rephrase a whole file in the voice of its directory.
pub async fn handler(
    State(state): State<ServiceState>,
    session: Session,
    ApiJson(req): ApiJson<RephraseRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let principal = session.principal();
    let document = state.workspace().document(principal, req.file_id).await?;

    let response = state
        .orchestrator()
        .rephrase(&document.content, &document.context, document.file.id)
        .await?;

    if req.write && !response.response.trim().is_empty() {
        state
            .workspace()
            .write_content(principal, document.file.id, &response.response)
            .await?;
        tracing::info!(file_id = %document.file.id, "ASSISTANT: rephrased content written back");
    }

    Ok((http::StatusCode::OK, Json(response)).into_response())
}
