use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Session;
use crate::http_server::api::ServiceError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextResponse {
    pub context: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let context = state
        .workspace()
        .file_context(session.principal(), id)
        .await?;
    Ok((http::StatusCode::OK, Json(ContextResponse { context })).into_response())
}
