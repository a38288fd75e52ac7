use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Session;
use crate::http_server::api::v0::file::FileResponse;
use crate::http_server::api::ServiceError;
use crate::ServiceState;

use super::DirectoryResponse;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryInfoResponse {
    #[serde(flatten)]
    pub directory: DirectoryResponse,
    pub directories: Vec<DirectoryResponse>,
    pub files: Vec<FileResponse>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let info = state
        .workspace()
        .directory_info(session.principal(), id)
        .await?;
    let response = DirectoryInfoResponse {
        directory: info.directory.into(),
        directories: info.directories.into_iter().map(Into::into).collect(),
        files: info.files.into_iter().map(Into::into).collect(),
    };
    Ok((http::StatusCode::OK, Json(response)).into_response())
}
