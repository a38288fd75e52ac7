use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;
use uuid::Uuid;

use common::workspace::FileUpdate;

use crate::auth::Session;
use crate::http_server::api::{ApiJson, ServiceError};
use crate::ServiceState;

use super::FileResponse;

/// Rename and/or move. `{"dir": null}` moves the file to the root.
#[tracing::instrument(skip(state, session, req))]
pub async fn handler(
    State(state): State<ServiceState>,
    session: Session,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<FileUpdate>,
) -> Result<impl IntoResponse, ServiceError> {
    let file = state
        .workspace()
        .update_file(session.principal(), id, req)
        .await?;
    Ok((http::StatusCode::OK, Json(FileResponse::from(file))).into_response())
}
