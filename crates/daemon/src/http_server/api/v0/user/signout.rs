use axum::extract::State;
use axum::response::{IntoResponse, Response};

use crate::auth::Session;
use crate::http_server::api::error_response;
use crate::ServiceState;

pub async fn handler(
    State(state): State<ServiceState>,
    session: Session,
) -> Result<impl IntoResponse, SignoutError> {
    let token = session.token.ok_or(SignoutError::MissingCredentials)?;

    if !state.database().clear_token(&token).await? {
        return Err(SignoutError::UnknownToken);
    }
    if let Some(user) = session.user {
        tracing::info!("SIGNOUT API: Cleared session of {}", user.id);
    }
    Ok(http::StatusCode::NO_CONTENT)
}

#[derive(Debug, thiserror::Error)]
pub enum SignoutError {
    #[error("missing credentials")]
    MissingCredentials,
    #[error("invalid token")]
    UnknownToken,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for SignoutError {
    fn into_response(self) -> Response {
        match self {
            SignoutError::MissingCredentials | SignoutError::UnknownToken => {
                error_response(http::StatusCode::UNAUTHORIZED, self.to_string())
            }
            SignoutError::Database(e) => {
                tracing::error!("SIGNOUT ERROR: {:?}", e);
                error_response(
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    "unknown server error",
                )
            }
        }
    }
}
