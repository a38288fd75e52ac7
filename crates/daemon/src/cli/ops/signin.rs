use clap::Args;

use quill_daemon::http_server::api::client::ApiError;
use quill_daemon::http_server::api::v0::user::SigninRequest;

#[derive(Args, Debug, Clone)]
pub struct Signin {
    #[command(flatten)]
    pub request: SigninRequest,
}

#[derive(Debug, thiserror::Error)]
pub enum SigninError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Signin {
    type Error = SigninError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.request.clone()).await?;
        Ok(response.token)
    }
}
