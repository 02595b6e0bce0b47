//! reqwest-backed [`Network`] implementation.
//!
//! Classifies each response relative to the scope origin the way a
//! browser would for a same-origin page: a final URL on the scope origin
//! is [`ResponseType::Basic`], anything else is [`ResponseType::Cors`].
//! This client never produces opaque responses.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::{Origin, Url};

use crate::traits::Network;
use crate::types::{Request, RequestKey, Response, ResponseType};
use crate::{PrecacheError, Result};

/// Network access through a shared [`reqwest::Client`].
pub struct HttpNetwork {
    client: Client,
    origin: Origin,
}

impl HttpNetwork {
    /// Create a network with a default client for pages served from `scope`.
    pub fn new(scope: &Url) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| PrecacheError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, scope))
    }

    /// Use a preconfigured client (timeouts, proxies, TLS roots).
    pub fn with_client(client: Client, scope: &Url) -> Self {
        Self {
            client,
            origin: scope.origin(),
        }
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        let response = self
            .client
            .request(request.method().clone(), request.url().clone())
            .headers(request.headers().clone())
            .send()
            .await?;

        let final_url = response.url().clone();
        let redirected =
            RequestKey::new(request.method().clone(), &final_url) != request.key();
        let response_type = if final_url.origin() == self.origin {
            ResponseType::Basic
        } else {
            ResponseType::Cors
        };
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        debug!(
            url = %request.url(),
            status = status.as_u16(),
            redirected,
            "network fetch"
        );

        Ok(Response::new(status, body)
            .with_headers(headers)
            .with_type(response_type)
            .with_url(final_url)
            .with_redirected(redirected))
    }
}
