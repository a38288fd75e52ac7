use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Session;
use crate::http_server::api::{ApiJson, ServiceError};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteContentRequest {
    pub content: String,
}

pub async fn read_handler(
    State(state): State<ServiceState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let content = state
        .workspace()
        .read_content(session.principal(), id)
        .await?;
    Ok((
        http::StatusCode::OK,
        [(http::header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        content,
    )
        .into_response())
}

/// Overwrite the whole content of the file.
pub async fn write_handler(
    State(state): State<ServiceState>,
    session: Session,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<WriteContentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .workspace()
        .write_content(session.principal(), id, &req.content)
        .await?;
    Ok(http::StatusCode::NO_CONTENT)
}
