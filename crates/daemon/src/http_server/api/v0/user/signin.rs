use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::{error_response, ApiJson};
use crate::ServiceState;

use super::{issue_token, TokenResponse};

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct SigninRequest {
    /// Account login
    #[arg(long)]
    pub login: String,
    /// Account password
    #[arg(long)]
    pub password: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    ApiJson(req): ApiJson<SigninRequest>,
) -> Result<impl IntoResponse, SigninError> {
    tracing::info!("SIGNIN API: Received signin for '{}'", req.login.trim());

    let record = state
        .database()
        .find_user_by_login(req.login.trim())
        .await?
        .ok_or(SigninError::InvalidCredentials)?;

    if !auth::verify_password(&req.password, &record.salt, &record.password_hash) {
        tracing::info!("SIGNIN API: Wrong password for {}", record.user.id);
        return Err(SigninError::InvalidCredentials);
    }

    let token = issue_token(state.database(), record.user.id).await?;
    Ok((http::StatusCode::OK, Json(TokenResponse { token })).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum SigninError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for SigninError {
    fn into_response(self) -> Response {
        match self {
            SigninError::InvalidCredentials => {
                error_response(http::StatusCode::UNAUTHORIZED, self.to_string())
            }
            SigninError::Database(e) => {
                tracing::error!("SIGNIN ERROR: {:?}", e);
                error_response(
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    "unknown server error",
                )
            }
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for SigninRequest {
    type Response = TokenResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/user/signin").unwrap();
        client.post(full_url).json(&self)
    }
}
