use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::prelude::File;

use crate::ServiceState;

pub mod contents;
pub mod context;
pub mod create;
pub mod delete;
pub mod info;
pub mod update;

/// A file as the API shows it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResponse {
    pub id: Uuid,
    pub name: String,
    pub dir: Option<Uuid>,
    /// Storage key of the content.
    pub path: String,
}

impl From<File> for FileResponse {
    fn from(file: File) -> Self {
        Self {
            id: file.id,
            name: file.name,
            dir: file.parent_id,
            path: file.storage_key.to_string(),
        }
    }
}

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", post(create::handler))
        .route(
            "/:id",
            get(info::handler)
                .put(update::handler)
                .delete(delete::handler),
        )
        .route(
            "/:id/contents",
            get(contents::read_handler).post(contents::write_handler),
        )
        .route("/:id/context", get(context::handler))
        .with_state(state)
}
