use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;

use crate::auth::{merge_headers, SharedTokenProvider, TokenProvider};
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{ApiResponse, HttpMethod, HttpRequest};

use super::{decode_body, finish, warn_dropped_body, AsyncTransport, DEFAULT_TIMEOUT};

/// Async transport backed by a `reqwest::Client`.
#[derive(Clone)]
pub struct AsyncHttpTransport {
    client: reqwest::Client,
    token_provider: Option<SharedTokenProvider>,
    timeout: Duration,
}

impl AsyncHttpTransport {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Use a caller-configured client (proxies, TLS roots, user agent).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            token_provider: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Transport honouring the configured timeout.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new().with_timeout(config.timeout())
    }

    pub fn with_token_provider(mut self, provider: impl TokenProvider + 'static) -> Self {
        self.token_provider = Some(Arc::new(provider));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn execute(&self, request: &HttpRequest) -> Result<ApiResponse, TransportError> {
        let headers = merge_headers(request.headers.as_ref(), self.token_provider.as_deref());

        let mut builder = self
            .client
            .request(method(request.method), &request.url)
            .timeout(self.timeout)
            .query(&request.query_pairs());
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(payload) = request.body() {
            builder = builder.json(payload);
        }

        let response = builder.send().await.map_err(request_error)?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        Ok(ApiResponse::new(decode_body(&bytes, status)?, status))
    }
}

impl Default for AsyncHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AsyncTransport for AsyncHttpTransport {
    async fn send(&self, request: HttpRequest) -> ApiResponse {
        warn_dropped_body(&request);
        log::debug!("sending {} {}", request.method, request.url);
        let result = self.execute(&request).await;
        finish(&request, result)
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
    }
}

fn request_error(err: reqwest::Error) -> TransportError {
    TransportError::Request {
        status: err.status().map(|status| status.as_u16()),
        message: err.to_string(),
    }
}
