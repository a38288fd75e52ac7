use axum::extract::{Path, State};
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::auth::Session;
use crate::http_server::api::ServiceError;
use crate::ServiceState;

#[tracing::instrument(skip(state, session))]
pub async fn handler(
    State(state): State<ServiceState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .workspace()
        .delete_file(session.principal(), id)
        .await?;
    Ok(http::StatusCode::NO_CONTENT)
}
