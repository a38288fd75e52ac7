use axum::routing::get;
use axum::Router;

pub mod assistant;
pub mod dir;
pub mod file;
pub mod tree;
pub mod user;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .nest("/user", user::router(state.clone()))
        .route("/tree", get(tree::handler))
        .nest("/file", file::router(state.clone()))
        .nest("/dir", dir::router(state.clone()))
        .nest("/assistant", assistant::router(state.clone()))
        .with_state(state)
}
