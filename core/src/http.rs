//! HTTP request and response types exchanged with transports.
//!
//! # Design
//! `HttpRequest` describes a call as plain data: clients fill it in and a
//! transport executes it. `ApiResponse` is the only thing a transport ever
//! hands back, success or failure, so callers branch on `status` rather than
//! on an error type.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{json, Value};

use crate::error::TransportError;
use crate::payload::JsonMap;

/// Request headers by name.
pub type Headers = BTreeMap<String, String>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Whether a JSON payload is sent with this method.
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    /// JSON body.
    pub payload: Option<JsonMap>,
    /// Query string parameters.
    pub params: Option<JsonMap>,
    pub headers: Option<Headers>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            payload: None,
            params: None,
            headers: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn with_payload(mut self, payload: JsonMap) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_params(mut self, params: JsonMap) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Query parameters rendered as strings. Strings go out as-is, nulls are
    /// skipped, everything else as its JSON text.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let Some(params) = &self.params else {
            return Vec::new();
        };
        params
            .iter()
            .filter_map(|(key, value)| {
                let rendered = match value {
                    Value::Null => return None,
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Some((key.clone(), rendered))
            })
            .collect()
    }

    /// Payload to send as the JSON body, if the method carries one.
    pub fn body(&self) -> Option<&JsonMap> {
        if self.method.carries_body() {
            self.payload.as_ref()
        } else {
            None
        }
    }
}

/// Normalized result of every transport call: a JSON body and a status code.
///
/// On failure `body` is `{"error": message}` and `status` is the status the
/// HTTP library reported, or 500.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub body: Value,
    pub status: u16,
}

impl ApiResponse {
    pub fn new(body: Value, status: u16) -> Self {
        Self { body, status }
    }

    pub fn from_error(message: impl Into<String>, status: u16) -> Self {
        Self {
            body: json!({ "error": message.into() }),
            status,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `error` message of an error body, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }

    pub fn into_parts(self) -> (Value, u16) {
        (self.body, self.status)
    }
}

impl From<TransportError> for ApiResponse {
    fn from(err: TransportError) -> Self {
        let status = err.status();
        ApiResponse::from_error(err.to_string(), status)
    }
}

impl From<ApiResponse> for (Value, u16) {
    fn from(response: ApiResponse) -> Self {
        response.into_parts()
    }
}

impl From<(Value, u16)> for ApiResponse {
    fn from((body, status): (Value, u16)) -> Self {
        ApiResponse::new(body, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(value: Value) -> JsonMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn query_pairs_render_scalars() {
        let req = HttpRequest::get("http://localhost/api/crm/accounts").with_params(params(json!({
            "client_origin": "web",
            "limit": 10,
            "is_vip": true,
            "missing": null
        })));
        assert_eq!(
            req.query_pairs(),
            vec![
                ("client_origin".to_string(), "web".to_string()),
                ("is_vip".to_string(), "true".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn query_pairs_empty_without_params() {
        assert!(HttpRequest::get("http://localhost").query_pairs().is_empty());
    }

    #[test]
    fn get_never_carries_a_body() {
        let req = HttpRequest::get("http://localhost").with_payload(params(json!({"a": 1})));
        assert!(req.body().is_none());
        let req = HttpRequest::new(HttpMethod::Delete, "http://localhost")
            .with_payload(params(json!({"a": 1})));
        assert!(req.body().is_none());
    }

    #[test]
    fn post_carries_its_payload() {
        let req = HttpRequest::post("http://localhost").with_payload(params(json!({"a": 1})));
        assert_eq!(req.body().unwrap()["a"], 1);
        assert!(HttpMethod::Patch.carries_body());
        assert!(!HttpMethod::Head.carries_body());
    }

    #[test]
    fn transport_error_becomes_error_body() {
        let response = ApiResponse::from(TransportError::request("connection refused"));
        assert_eq!(response.status, 500);
        assert_eq!(response.error_message(), Some("connection refused"));
        assert!(!response.is_success());
    }

    #[test]
    fn response_converts_to_tuple() {
        let (body, status): (Value, u16) = ApiResponse::new(json!({"id": "123"}), 200).into();
        assert_eq!(body["id"], "123");
        assert_eq!(status, 200);
    }

    #[test]
    fn method_names() {
        assert_eq!(HttpMethod::Options.to_string(), "OPTIONS");
        assert_eq!(HttpMethod::Patch.as_str(), "PATCH");
    }
}
