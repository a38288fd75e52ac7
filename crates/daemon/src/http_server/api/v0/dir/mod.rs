use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::generation::GenerationError;
use common::prelude::{Directory, Orchestrator};

use crate::ServiceState;

pub mod context;
pub mod create;
pub mod delete;
pub mod info;
pub mod update;

/// A directory as the API shows it. `summary` carries the persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryResponse {
    pub id: Uuid,
    pub name: String,
    pub summary: Option<String>,
    pub dir: Option<Uuid>,
}

impl From<Directory> for DirectoryResponse {
    fn from(directory: Directory) -> Self {
        Self {
            id: directory.id,
            name: directory.name,
            summary: directory.context,
            dir: directory.parent_id,
        }
    }
}

/// Pick the context to store: a persona generated from `describe` when one
/// is given, otherwise `context` as sent.
pub(crate) async fn resolve_context(
    orchestrator: &Orchestrator,
    context: Option<String>,
    describe: Option<String>,
) -> Result<Option<String>, GenerationError> {
    match describe {
        Some(description) => Ok(Some(
            orchestrator.change_directory_context(&description).await?,
        )),
        None => Ok(context),
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
        .route("/:id/context", get(context::get_handler).put(context::put_handler))
        .with_state(state)
}
