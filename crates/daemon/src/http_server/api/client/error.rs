use reqwest::StatusCode;
use serde::Deserialize;

/// The `{"code", "error", "message"}` body every failing route returns.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Why a call against the daemon failed, as seen by the CLI.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("could not reach the daemon: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("not signed in: {0}")]
    Unauthorized(String),
    #[error("not yours: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("model server failed: {0}")]
    Upstream(String),
    #[error("daemon answered {0}: {1}")]
    Status(StatusCode, String),
}

impl ApiError {
    /// Classify a non-success response. Bodies that are not the daemon's
    /// JSON error shape are reported verbatim.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.message)
            .unwrap_or_else(|_| body.trim().to_string());

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::BAD_GATEWAY => ApiError::Upstream(message),
            _ => ApiError::Status(status, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_body_message_is_used() {
        let err = ApiError::from_response(
            StatusCode::NOT_FOUND,
            r#"{"code":404,"error":"Not Found","message":"file not found"}"#,
        );
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "file not found"));
    }

    #[test]
    fn test_status_picks_variant() {
        assert!(matches!(
            ApiError::from_response(StatusCode::UNAUTHORIZED, "{\"message\":\"invalid token\"}"),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from_response(StatusCode::BAD_GATEWAY, "{\"message\":\"down\"}"),
            ApiError::Upstream(_)
        ));
        assert!(matches!(
            ApiError::from_response(StatusCode::CONFLICT, "{\"message\":\"taken\"}"),
            ApiError::Status(StatusCode::CONFLICT, _)
        ));
    }

    #[test]
    fn test_plain_body_is_kept() {
        let err = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, " plain failure\n");
        assert_eq!(
            err.to_string(),
            "daemon answered 500 Internal Server Error: plain failure"
        );
    }
}
