//! Transports: the boundary where requests hit the network.
//!
//! # Design
//! `Transport` and `AsyncTransport` share one contract and differ only in
//! how they wait. `send` always yields an `ApiResponse`; library errors,
//! decode failures and cancellation are folded into an `{"error": ...}` body
//! here and never reach the client layer as errors.

mod async_http;
mod sync_http;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::http::{ApiResponse, HttpRequest};

pub use async_http::AsyncHttpTransport;
pub use sync_http::HttpTransport;

/// Timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking transport: `send` returns once the response has been read.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> ApiResponse;
}

/// Async transport: `send` suspends while the request is in flight.
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> ApiResponse;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: HttpRequest) -> ApiResponse {
        (**self).send(request)
    }
}

#[async_trait]
impl<T: AsyncTransport + ?Sized> AsyncTransport for std::sync::Arc<T> {
    async fn send(&self, request: HttpRequest) -> ApiResponse {
        (**self).send(request).await
    }
}

/// Send through `transport` unless `token` fires first. A cancelled request
/// is dropped mid-flight and reported as an error response.
pub async fn send_cancellable<T>(
    transport: &T,
    request: HttpRequest,
    token: &CancellationToken,
) -> ApiResponse
where
    T: AsyncTransport + ?Sized,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => {
            log::warn!("request cancelled before completion");
            ApiResponse::from(TransportError::Cancelled)
        }
        response = transport.send(request) => response,
    }
}

/// Decode a response body. An empty body is JSON `null`. The observed
/// status is kept in the error message of an undecodable body.
pub(crate) fn decode_body(bytes: &[u8], status: u16) -> Result<Value, TransportError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes)
        .map_err(|e| TransportError::Decode(format!("status {status}: {e}")))
}

/// Log the outcome of a send and fold failures into a response.
pub(crate) fn finish(
    request: &HttpRequest,
    result: Result<ApiResponse, TransportError>,
) -> ApiResponse {
    match result {
        Ok(response) => {
            log::debug!(
                "{} {} -> {}",
                request.method,
                request.url,
                response.status
            );
            response
        }
        Err(err) => {
            log::warn!("{} {} failed: {err}", request.method, request.url);
            ApiResponse::from(err)
        }
    }
}

pub(crate) fn warn_dropped_body(request: &HttpRequest) {
    if request.payload.is_some() && !request.method.carries_body() {
        log::warn!(
            "dropping payload of {} {}: method does not carry a body",
            request.method,
            request.url
        );
    }
}
