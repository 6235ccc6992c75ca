//! Client SDK for the CRM account-management API.
//!
//! # Overview
//! Builds origin-tagged request payloads, resolves endpoint templates and
//! sends the resulting requests through a pluggable transport. Every call
//! returns an `ApiResponse` (`body`, `status`): transport failures show up
//! as an `{"error": ...}` body with a status code, never as an `Err`.
//!
//! # Design
//! - `PayloadVariant` is a closed sum type with one variant per
//!   `ClientOrigin`; overrides naming undeclared fields are rejected.
//! - `ClientCore` builds `HttpRequest` values without I/O. `CrmClient`
//!   (blocking) and `AsyncCrmClient` (async) hand them to a `Transport` or
//!   `AsyncTransport`.
//! - `HttpTransport` (ureq) and `AsyncHttpTransport` (reqwest) inject the
//!   `Authorization` header from a `TokenProvider` on every request.
//!
//! ```no_run
//! use crm_sdk::{ClientOrigin, CrmClient, CrmClientApi, HttpTransport, ListOptions};
//!
//! # fn main() -> Result<(), crm_sdk::ConfigError> {
//! let transport = HttpTransport::new().with_token_provider(|| "Bearer abc".to_string());
//! let client = CrmClient::new("https://crm.example.com", ClientOrigin::Web, transport);
//! let (body, status) = client.get_accounts(ListOptions::accounts().limit(5))?.into_parts();
//! if status == 200 {
//!     println!("{body}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod async_client;
pub mod auth;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod origin;
pub mod payload;
pub mod transport;
pub mod types;

pub use async_client::{AsyncCrmClient, AsyncCrmClientApi};
pub use auth::{merge_headers, BearerToken, StaticToken, TokenProvider};
pub use client::{ClientCore, CrmClient, CrmClientApi, CrmResult};
pub use config::ClientConfig;
pub use endpoints::resolve_endpoint;
pub use error::{ConfigError, TransportError};
pub use http::{ApiResponse, Headers, HttpMethod, HttpRequest};
pub use origin::{ClientOrigin, SortOrder};
pub use payload::{build, get_builder, JsonMap, PayloadBuilder, PayloadFields, PayloadVariant};
pub use transport::{send_cancellable, AsyncHttpTransport, AsyncTransport, HttpTransport, Transport};
pub use types::{AccountRequest, ListOptions};
