use axum::extract::{Json, State};
use axum::response::IntoResponse;

use common::workspace::NewFile;

use crate::auth::Session;
use crate::http_server::api::{ApiJson, ServiceError};
use crate::ServiceState;

use super::FileResponse;

#[tracing::instrument(skip_all)]
pub async fn handler(
    State(state): State<ServiceState>,
    session: Session,
    ApiJson(req): ApiJson<NewFile>,
) -> Result<impl IntoResponse, ServiceError> {
    let file = state
        .workspace()
        .create_file(session.principal(), req)
        .await?;
    Ok((http::StatusCode::CREATED, Json(FileResponse::from(file))).into_response())
}
