use axum::routing::post;
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth;
use crate::database::{is_unique_violation, Database};
use crate::ServiceState;

pub mod signin;
pub mod signout;
pub mod signup;

pub use signin::SigninRequest;

const TOKEN_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Give `user` a fresh session token, replacing any previous one.
pub(crate) async fn issue_token(database: &Database, user: Uuid) -> Result<String, sqlx::Error> {
    let mut attempt = 0;
    loop {
        let token = auth::generate_token();
        match database.set_user_token(user, Some(&token)).await {
            Ok(()) => return Ok(token),
            // astronomically unlikely, but tokens must stay unique
            Err(e) if is_unique_violation(&e) && attempt + 1 < TOKEN_ATTEMPTS => {
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/signup", post(signup::handler))
        .route("/signin", post(signin::handler))
        .route("/signout", post(signout::handler))
        .with_state(state)
}
