use axum::routing::{get, post};
use axum::Router;

use crate::ServiceState;

pub mod add;
pub mod generate;
pub mod models;
pub mod rephrase;
pub mod translate;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/rephrase", post(rephrase::handler))
        .route("/translate", post(translate::handler))
        .route("/add", post(add::handler))
        .route("/generate", post(generate::handler))
        .route("/models", get(models::handler))
        .with_state(state)
}
