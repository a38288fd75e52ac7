use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::database::is_unique_violation;
use crate::http_server::api::{error_response, ApiJson};
use crate::ServiceState;

use super::{issue_token, TokenResponse};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub login: String,
    pub password: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse, SignupError> {
    let login = req.login.trim();
    tracing::info!("SIGNUP API: Received signup for '{}'", login);

    if login.is_empty() || req.password.is_empty() {
        return Err(SignupError::Invalid("login and password are required"));
    }

    let salt = auth::generate_salt();
    let hash = auth::hash_password(&req.password, &salt);
    let record = state
        .database()
        .create_user(login, &hash, &salt)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                SignupError::LoginTaken
            } else {
                SignupError::Database(e)
            }
        })?;

    let token = issue_token(state.database(), record.user.id).await?;
    tracing::info!(
        "SIGNUP API: Created user {} at {}",
        record.user.id,
        record.created_at
    );

    Ok((http::StatusCode::CREATED, Json(TokenResponse { token })).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error("{0}")]
    Invalid(&'static str),
    #[error("login already taken")]
    LoginTaken,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for SignupError {
    fn into_response(self) -> Response {
        match self {
            SignupError::Invalid(msg) => error_response(http::StatusCode::BAD_REQUEST, msg),
            SignupError::LoginTaken => {
                error_response(http::StatusCode::CONFLICT, self.to_string())
            }
            SignupError::Database(e) => {
                tracing::error!("SIGNUP ERROR: {:?}", e);
                error_response(
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    "unknown server error",
                )
            }
        }
    }
}
