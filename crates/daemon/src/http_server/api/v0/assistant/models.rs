use axum::extract::{Json, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::auth::Session;
use crate::http_server::api::ServiceError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    session: Session,
) -> Result<impl IntoResponse, ServiceError> {
    common::guard::authenticated(session.principal())?;
    let models = state.orchestrator().list_models().await?;
    Ok((http::StatusCode::OK, Json(ModelsResponse { models })).into_response())
}
