use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;
use uuid::Uuid;

use common::workspace::DirectoryUpdate;

use crate::auth::Session;
use crate::http_server::api::{ApiJson, ServiceError};
use crate::ServiceState;

use super::DirectoryResponse;

#[tracing::instrument(skip(state, session, req))]
pub async fn handler(
    State(state): State<ServiceState>,
    session: Session,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<DirectoryUpdate>,
) -> Result<impl IntoResponse, ServiceError> {
    let directory = state
        .workspace()
        .update_directory(session.principal(), id, req)
        .await?;
    Ok((http::StatusCode::OK, Json(DirectoryResponse::from(directory))).into_response())
}
