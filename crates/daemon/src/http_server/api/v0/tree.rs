use axum::extract::{Json, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use uuid::Uuid;

use common::prelude::TreeNode;

use crate::auth::Session;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::ServiceError;
use crate::ServiceState;

/// Fetch the caller's whole workspace as nested nodes.
#[derive(Debug, Clone, clap::Args)]
pub struct TreeRequest {
    /// Session token returned by signin
    #[arg(long)]
    pub token: String,
}

pub type TreeResponse = Vec<TreeNode<Uuid>>;

#[tracing::instrument(skip_all)]
pub async fn handler(
    State(state): State<ServiceState>,
    session: Session,
) -> Result<impl IntoResponse, ServiceError> {
    let tree = state.workspace().tree(session.principal()).await?;
    Ok((http::StatusCode::OK, Json(tree)).into_response())
}

impl ApiRequest for TreeRequest {
    type Response = TreeResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/tree").unwrap();
        client.get(full_url).bearer_auth(self.token)
    }
}
