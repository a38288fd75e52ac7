use clap::Args;

use quill_daemon::http_server::api::client::ApiError;
use quill_daemon::http_server::api::v0::tree::TreeRequest;

#[derive(Args, Debug, Clone)]
pub struct Tree {
    #[command(flatten)]
    pub request: TreeRequest,
}

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("could not render tree: {0}")]
    Render(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Tree {
    type Error = TreeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let tree = ctx.client.call(self.request.clone()).await?;
        Ok(serde_json::to_string_pretty(&tree)?)
    }
}
