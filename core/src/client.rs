//! Blocking CRM client and the request building it shares with the async
//! client.
//!
//! # Design
//! `ClientCore` holds only the base URL and a `PayloadBuilder`. Each
//! operation has a `build_*` method that resolves the endpoint, builds the
//! main payload and returns an `HttpRequest` without touching the network.
//! `CrmClient` and `AsyncCrmClient` hand those requests to their transport
//! and return the transport's `ApiResponse` unchanged.

use serde_json::Value;

use crate::config::ClientConfig;
use crate::endpoints::{self, resolve_endpoint};
use crate::error::ConfigError;
use crate::http::{ApiResponse, HttpRequest};
use crate::origin::ClientOrigin;
use crate::payload::{JsonMap, PayloadBuilder};
use crate::transport::Transport;
use crate::types::{AccountRequest, ListOptions};

/// Result of every client operation. Transport failures live inside the
/// `ApiResponse`; `Err` is reserved for configuration mistakes.
pub type CrmResult = Result<ApiResponse, ConfigError>;

/// Stateless request builder for the CRM account API.
#[derive(Debug, Clone)]
pub struct ClientCore {
    base_url: String,
    builder: PayloadBuilder,
}

impl ClientCore {
    pub fn new(base_url: &str, origin: ClientOrigin) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            builder: PayloadBuilder::new(origin),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn origin(&self) -> ClientOrigin {
        self.builder.origin()
    }

    fn endpoint(&self, template: &str, values: &[(&str, &str)]) -> Result<String, ConfigError> {
        resolve_endpoint(&self.base_url, template, values)
    }

    fn get(&self, url: String, options: Option<&ListOptions>) -> Result<HttpRequest, ConfigError> {
        let params = match options {
            Some(options) => self.builder.build(&options.to_overrides())?,
            None => self.builder.build_default(),
        };
        Ok(HttpRequest::get(url).with_params(params))
    }

    pub fn build_get_account(&self, account_id: &str) -> Result<HttpRequest, ConfigError> {
        let url = self.endpoint(endpoints::ACCOUNT, &[("account_id", account_id)])?;
        self.get(url, None)
    }

    pub fn build_get_accounts(&self, options: &ListOptions) -> Result<HttpRequest, ConfigError> {
        let url = self.endpoint(endpoints::ACCOUNTS, &[])?;
        self.get(url, Some(options))
    }

    pub fn build_get_account_addresses(
        &self,
        account_id: &str,
        options: &ListOptions,
    ) -> Result<HttpRequest, ConfigError> {
        let url = self.endpoint(endpoints::ACCOUNT_ADDRESSES, &[("account_id", account_id)])?;
        self.get(url, Some(options))
    }

    pub fn build_get_account_address(
        &self,
        account_id: &str,
        address_id: &str,
    ) -> Result<HttpRequest, ConfigError> {
        let url = self.endpoint(
            endpoints::ACCOUNT_ADDRESS,
            &[("account_id", account_id), ("address_id", address_id)],
        )?;
        self.get(url, None)
    }

    pub fn build_get_account_types(&self, options: &ListOptions) -> Result<HttpRequest, ConfigError> {
        let url = self.endpoint(endpoints::ACCOUNT_TYPES, &[])?;
        self.get(url, Some(options))
    }

    pub fn build_get_account_type(&self, type_id: &str) -> Result<HttpRequest, ConfigError> {
        let url = self.endpoint(endpoints::ACCOUNT_TYPE, &[("type_id", type_id)])?;
        self.get(url, None)
    }

    /// POST body is `{"account_data": <account>, "meta": <main payload>}`.
    pub fn build_create_account(&self, account: &AccountRequest) -> Result<HttpRequest, ConfigError> {
        let url = self.endpoint(endpoints::ACCOUNTS, &[])?;
        let account_data =
            serde_json::to_value(account).map_err(|e| ConfigError::Serialization(e.to_string()))?;
        let mut body = JsonMap::new();
        body.insert("account_data".to_string(), account_data);
        body.insert("meta".to_string(), Value::Object(self.builder.build_default()));
        Ok(HttpRequest::post(url).with_payload(body))
    }
}

/// Operations of the CRM account API, blocking flavour.
pub trait CrmClientApi {
    fn get_account(&self, account_id: &str) -> CrmResult;
    fn get_accounts(&self, options: ListOptions) -> CrmResult;
    fn get_account_addresses(&self, account_id: &str, options: ListOptions) -> CrmResult;
    fn get_account_address(&self, account_id: &str, address_id: &str) -> CrmResult;
    fn get_account_types(&self, options: ListOptions) -> CrmResult;
    fn get_account_type(&self, type_id: &str) -> CrmResult;
    fn create_account(&self, account: &AccountRequest) -> CrmResult;
}

/// Blocking client: every call runs to completion on the calling thread.
pub struct CrmClient<T> {
    core: ClientCore,
    transport: T,
}

impl<T: Transport> CrmClient<T> {
    pub fn new(base_url: &str, origin: ClientOrigin, transport: T) -> Self {
        Self {
            core: ClientCore::new(base_url, origin),
            transport,
        }
    }

    pub fn from_config(config: &ClientConfig, transport: T) -> Self {
        Self::new(&config.base_url, config.origin, transport)
    }

    pub fn core(&self) -> &ClientCore {
        &self.core
    }

    fn dispatch(&self, request: HttpRequest) -> CrmResult {
        Ok(self.transport.send(request))
    }
}

impl<T: Transport> CrmClientApi for CrmClient<T> {
    fn get_account(&self, account_id: &str) -> CrmResult {
        self.dispatch(self.core.build_get_account(account_id)?)
    }

    fn get_accounts(&self, options: ListOptions) -> CrmResult {
        self.dispatch(self.core.build_get_accounts(&options)?)
    }

    fn get_account_addresses(&self, account_id: &str, options: ListOptions) -> CrmResult {
        self.dispatch(self.core.build_get_account_addresses(account_id, &options)?)
    }

    fn get_account_address(&self, account_id: &str, address_id: &str) -> CrmResult {
        self.dispatch(self.core.build_get_account_address(account_id, address_id)?)
    }

    fn get_account_types(&self, options: ListOptions) -> CrmResult {
        self.dispatch(self.core.build_get_account_types(&options)?)
    }

    fn get_account_type(&self, type_id: &str) -> CrmResult {
        self.dispatch(self.core.build_get_account_type(type_id)?)
    }

    fn create_account(&self, account: &AccountRequest) -> CrmResult {
        let request = self.core.build_create_account(account)?;
        log::debug!("creating account via {}", request.url);
        let response = self.transport.send(request);
        log::debug!("create account returned status {}", response.status);
        Ok(response)
    }
}
