use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Session;
use crate::http_server::api::v0::dir::DirectoryResponse;
use crate::http_server::api::ServiceError;
use crate::ServiceState;

use super::FileResponse;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfoResponse {
    #[serde(flatten)]
    pub file: FileResponse,
    /// The directory holding the file, absent at the root.
    pub directory: Option<DirectoryResponse>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let info = state.workspace().file_info(session.principal(), id).await?;
    let response = FileInfoResponse {
        file: info.file.into(),
        directory: info.directory.map(Into::into),
    };
    Ok((http::StatusCode::OK, Json(response)).into_response())
}
