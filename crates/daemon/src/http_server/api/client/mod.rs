//! Typed client for the daemon's own API, used by the CLI.

#[allow(clippy::module_inception)]
mod client;
mod error;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

pub use client::ApiClient;
pub use error::ApiError;

/// A request the [`ApiClient`] knows how to send.
pub trait ApiRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder;
}
