use async_trait::async_trait;
use tracing::debug;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Carries a request to whatever answers it: the network, or a canned table.
///
/// A non-2xx status is not an error at this layer; only failures to exchange
/// the request at all are.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn round_trip(&self, req: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Production transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn round_trip(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!(method = %req.method, url = %req.url, "sending request");
        let mut builder = self
            .client
            .request(req.method, req.url)
            .headers(req.headers);
        if let Some(body) = req.body {
            builder = builder.body(body);
        }
        let resp = builder.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?.to_vec();
        Ok(HttpResponse { status, headers, body })
    }
}
