use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::de::DeserializeOwned;

use common::generation::GenerationError;
use common::guard::GuardError;
use common::workspace::WorkspaceError;

/// `{"code", "error", "message"}` with the given status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({
        "code": status.as_u16(),
        "error": status.canonical_reason().unwrap_or("Error"),
        "message": message.into(),
    });
    (status, Json(body)).into_response()
}

/// [`Json`] whose rejections use the same body as every other API error.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> Response {
    let status = match &rejection {
        JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        _ => StatusCode::BAD_REQUEST,
    };
    tracing::debug!(%status, "rejected request body: {}", rejection.body_text());
    error_response(status, rejection.body_text())
}

/// Failure of a workspace or assistant handler.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl From<GuardError> for ServiceError {
    fn from(err: GuardError) -> Self {
        ServiceError::Workspace(err.into())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            ServiceError::Workspace(err) => {
                let status = match &err {
                    WorkspaceError::Unauthenticated => StatusCode::UNAUTHORIZED,
                    WorkspaceError::Forbidden(_) => StatusCode::FORBIDDEN,
                    WorkspaceError::NotFound(_) => StatusCode::NOT_FOUND,
                    WorkspaceError::Conflict(_) => StatusCode::CONFLICT,
                    WorkspaceError::BadRequest(_) => StatusCode::BAD_REQUEST,
                    WorkspaceError::Store(_) | WorkspaceError::Blob(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                if status.is_server_error() {
                    tracing::error!("WORKSPACE ERROR: {:?}", err);
                    return error_response(status, "unknown server error");
                }
                tracing::debug!(%status, "workspace request rejected: {}", err);
                error_response(status, err.to_string())
            }
            ServiceError::Generation(err) => {
                tracing::error!("GENERATION ERROR: {:?}", err);
                error_response(StatusCode::BAD_GATEWAY, err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::generation::BackendError;
    use common::workspace::StoreError;

    fn status_of(err: impl Into<ServiceError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(WorkspaceError::Unauthenticated),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(WorkspaceError::Forbidden("file")),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(WorkspaceError::NotFound("file not found".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(WorkspaceError::Conflict("taken".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(WorkspaceError::BadRequest("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(WorkspaceError::Store(StoreError::Backend("down".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(GenerationError::Upstream(BackendError::Unreachable(
                "refused".into()
            ))),
            StatusCode::BAD_GATEWAY
        );
    }
}
