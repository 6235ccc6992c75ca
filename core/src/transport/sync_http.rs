use std::sync::Arc;
use std::time::Duration;

use crate::auth::{merge_headers, SharedTokenProvider, TokenProvider};
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{ApiResponse, HttpMethod, HttpRequest};

use super::{decode_body, finish, warn_dropped_body, Transport, DEFAULT_TIMEOUT};

/// Blocking transport backed by a `ureq` agent.
///
/// The agent is configured not to treat 4xx/5xx statuses as errors, so the
/// service's own error bodies come back as data with their real status.
pub struct HttpTransport {
    agent: ureq::Agent,
    token_provider: Option<SharedTokenProvider>,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self {
            agent,
            token_provider: None,
            timeout,
        }
    }

    /// Transport honouring the configured timeout.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_timeout(config.timeout())
    }

    pub fn with_token_provider(mut self, provider: impl TokenProvider + 'static) -> Self {
        self.token_provider = Some(Arc::new(provider));
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn execute(&self, request: &HttpRequest) -> Result<ApiResponse, TransportError> {
        let headers = merge_headers(request.headers.as_ref(), self.token_provider.as_deref());
        let query = request.query_pairs();
        let url = request.url.as_str();

        let result = match request.method {
            HttpMethod::Get => decorate(self.agent.get(url), &query, &headers).call(),
            HttpMethod::Head => decorate(self.agent.head(url), &query, &headers).call(),
            HttpMethod::Options => decorate(self.agent.options(url), &query, &headers).call(),
            HttpMethod::Delete => decorate(self.agent.delete(url), &query, &headers).call(),
            HttpMethod::Post => {
                send_with_body(decorate(self.agent.post(url), &query, &headers), request)?
            }
            HttpMethod::Put => {
                send_with_body(decorate(self.agent.put(url), &query, &headers), request)?
            }
            HttpMethod::Patch => {
                send_with_body(decorate(self.agent.patch(url), &query, &headers), request)?
            }
        };

        let mut response = result.map_err(request_error)?;
        let status = response.status().as_u16();
        // No size cap, matching the async transport.
        let bytes = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        Ok(ApiResponse::new(decode_body(&bytes, status)?, status))
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: HttpRequest) -> ApiResponse {
        warn_dropped_body(&request);
        log::debug!("sending {} {}", request.method, request.url);
        let result = self.execute(&request);
        finish(&request, result)
    }
}

fn decorate<B>(
    mut builder: ureq::RequestBuilder<B>,
    query: &[(String, String)],
    headers: &crate::http::Headers,
) -> ureq::RequestBuilder<B> {
    for (key, value) in query {
        builder = builder.query(key, value);
    }
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_with_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    request: &HttpRequest,
) -> Result<Result<ureq::http::Response<ureq::Body>, ureq::Error>, TransportError> {
    match request.body() {
        Some(payload) => {
            let body = serde_json::to_vec(payload).map_err(|e| TransportError::Encode(e.to_string()))?;
            Ok(builder.content_type("application/json").send(&body[..]))
        }
        None => Ok(builder.send_empty()),
    }
}

fn request_error(err: ureq::Error) -> TransportError {
    let status = match &err {
        ureq::Error::StatusCode(code) => Some(*code),
        _ => None,
    };
    TransportError::Request {
        message: err.to_string(),
        status,
    }
}
