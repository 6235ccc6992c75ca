//! Token providers and `Authorization` header injection.
//!
//! A provider is asked for a token on every request, so rotating or
//! short-lived credentials work without rebuilding the transport.

use std::sync::Arc;

use crate::http::Headers;

pub const AUTHORIZATION: &str = "Authorization";

/// Supplies the `Authorization` header value for each request.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> String;
}

impl<F> TokenProvider for F
where
    F: Fn() -> String + Send + Sync,
{
    fn token(&self) -> String {
        self()
    }
}

/// A fixed header value.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl TokenProvider for StaticToken {
    fn token(&self) -> String {
        self.0.clone()
    }
}

/// Prefixes the wrapped provider's token with the `Bearer` scheme.
pub struct BearerToken<P>(pub P);

impl<P: TokenProvider> TokenProvider for BearerToken<P> {
    fn token(&self) -> String {
        format!("Bearer {}", self.0.token())
    }
}

pub type SharedTokenProvider = Arc<dyn TokenProvider>;

/// Start from the caller's headers and, when a provider is configured, set
/// `Authorization` to its current value. Any caller-supplied
/// `Authorization`, whatever its casing, is replaced.
pub fn merge_headers(extra: Option<&Headers>, provider: Option<&dyn TokenProvider>) -> Headers {
    let mut headers = extra.cloned().unwrap_or_default();
    if let Some(provider) = provider {
        headers.retain(|name, _| !name.eq_ignore_ascii_case(AUTHORIZATION));
        headers.insert(AUTHORIZATION.to_string(), provider.token());
    }
    headers
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn provider_overwrites_caller_authorization() {
        let extra = Headers::from([(AUTHORIZATION.to_string(), "stale".to_string())]);
        let provider = || "fresh".to_string();
        let merged = merge_headers(Some(&extra), Some(&provider));
        assert_eq!(merged, Headers::from([(AUTHORIZATION.to_string(), "fresh".to_string())]));
    }

    #[test]
    fn provider_overwrites_lowercase_authorization() {
        let extra = Headers::from([
            ("authorization".to_string(), "stale".to_string()),
            ("X-Request-Id".to_string(), "abc".to_string()),
        ]);
        let merged = merge_headers(Some(&extra), Some(&StaticToken("fresh".to_string())));
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[AUTHORIZATION], "fresh");
        assert_eq!(merged["X-Request-Id"], "abc");
    }

    #[test]
    fn caller_headers_survive_without_provider() {
        let extra = Headers::from([(AUTHORIZATION.to_string(), "mine".to_string())]);
        assert_eq!(merge_headers(Some(&extra), None), extra);
        assert!(merge_headers(None, None).is_empty());
    }

    #[test]
    fn provider_runs_on_every_merge() {
        let calls = AtomicUsize::new(0);
        let provider = || format!("token-{}", calls.fetch_add(1, Ordering::SeqCst));
        assert_eq!(merge_headers(None, Some(&provider))[AUTHORIZATION], "token-0");
        assert_eq!(merge_headers(None, Some(&provider))[AUTHORIZATION], "token-1");
    }

    #[test]
    fn bearer_adapter_prefixes_scheme() {
        let provider = BearerToken(StaticToken("abc".to_string()));
        assert_eq!(provider.token(), "Bearer abc");
    }
}
