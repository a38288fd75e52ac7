//! Password hashing, session tokens and the request principal.

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use http::request::Parts;
use rand::RngCore;
use sha2::{Digest, Sha256};

use common::workspace::User;

use crate::database::Database;

const SALT_BYTES: usize = 16;
const TOKEN_BYTES: usize = 32;
const BEARER_PREFIX: &str = "Bearer ";

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn generate_salt() -> String {
    random_hex(SALT_BYTES)
}

pub fn generate_token() -> String {
    random_hex(TOKEN_BYTES)
}

/// Hex-encoded SHA-256 of the salt followed by the password.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt) == expected_hash
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then_some(token)
}

/// The caller of a request.
///
/// Resolving never rejects for a missing or unknown token; the principal is
/// simply absent and the workspace decides what that means.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl Session {
    pub fn principal(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    Database: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = SessionError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts).map(str::to_string) else {
            return Ok(Session {
                user: None,
                token: None,
            });
        };

        let database = Database::from_ref(state);
        let user = database.find_user_by_token(&token).await?;
        if user.is_none() {
            tracing::debug!("unknown session token");
        }

        Ok(Session {
            user,
            token: Some(token),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        tracing::error!("SESSION ERROR: {:?}", self);
        (
            http::StatusCode::INTERNAL_SERVER_ERROR,
            "unknown server error",
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = http::Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(http::header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_hash_is_salted_and_stable() {
        let a = hash_password("secret", "salt-a");
        let b = hash_password("secret", "salt-b");
        assert_ne!(a, b);
        assert_eq!(a, hash_password("secret", "salt-a"));
        assert_eq!(a.len(), 64);
        assert!(verify_password("secret", "salt-a", &a));
        assert!(!verify_password("Secret", "salt-a", &a));
    }

    #[test]
    fn test_tokens_are_random_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc123"))), Some("abc123"));
        assert_eq!(bearer_token(&parts(Some("Basic abc123"))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts(None)), None);
    }

    #[tokio::test]
    async fn test_session_resolves_known_token() {
        let db = Database::in_memory().await.unwrap();
        let record = db.create_user("alice", "hash", "salt").await.unwrap();
        db.set_user_token(record.user.id, Some("known")).await.unwrap();

        let mut known = parts(Some("Bearer known"));
        let session = Session::from_request_parts(&mut known, &db).await.unwrap();
        assert_eq!(session.principal(), Some(&record.user));

        let mut unknown = parts(Some("Bearer unknown"));
        let session = Session::from_request_parts(&mut unknown, &db).await.unwrap();
        assert!(session.principal().is_none());
        assert_eq!(session.token.as_deref(), Some("unknown"));
    }
}
