use axum::extract::{Json, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Session;
use crate::http_server::api::{ApiJson, ServiceError};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTextRequest {
    pub file_id: Uuid,
    /// What the new text should say.
    pub query: String,
}

/// Write new text for `query` and append it to the file as a paragraph.
pub async fn handler(
    State(state): State<ServiceState>,
    session: Session,
    ApiJson(req): ApiJson<AddTextRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let principal = session.principal();
    let document = state.workspace().document(principal, req.file_id).await?;

    let response = state
        .orchestrator()
        .add_text_with_context(
            &document.content,
            &req.query,
            &document.context,
            document.file.id,
        )
        .await?;

    if !response.response.trim().is_empty() {
        state
            .workspace()
            .append_content(principal, document.file.id, &response.response)
            .await?;
    }

    Ok((http::StatusCode::OK, Json(response)).into_response())
}
