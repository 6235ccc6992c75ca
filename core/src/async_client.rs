//! Async CRM client.
//!
//! Calls suspend only while the transport waits on the network. The client
//! holds no mutable state, so any number of calls may run concurrently on
//! one instance.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::client::{ClientCore, CrmResult};
use crate::config::ClientConfig;
use crate::http::HttpRequest;
use crate::origin::ClientOrigin;
use crate::transport::{send_cancellable, AsyncTransport};
use crate::types::{AccountRequest, ListOptions};

/// Operations of the CRM account API, async flavour.
#[async_trait]
pub trait AsyncCrmClientApi {
    async fn get_account(&self, account_id: &str) -> CrmResult;
    async fn get_accounts(&self, options: ListOptions) -> CrmResult;
    async fn get_account_addresses(&self, account_id: &str, options: ListOptions) -> CrmResult;
    async fn get_account_address(&self, account_id: &str, address_id: &str) -> CrmResult;
    async fn get_account_types(&self, options: ListOptions) -> CrmResult;
    async fn get_account_type(&self, type_id: &str) -> CrmResult;
    async fn create_account(&self, account: &AccountRequest) -> CrmResult;
}

pub struct AsyncCrmClient<T> {
    core: ClientCore,
    transport: T,
    cancellation: Option<CancellationToken>,
}

impl<T: AsyncTransport> AsyncCrmClient<T> {
    pub fn new(base_url: &str, origin: ClientOrigin, transport: T) -> Self {
        Self {
            core: ClientCore::new(base_url, origin),
            transport,
            cancellation: None,
        }
    }

    pub fn from_config(config: &ClientConfig, transport: T) -> Self {
        Self::new(&config.base_url, config.origin, transport)
    }

    /// Abandon in-flight requests once `token` is cancelled. Affected calls
    /// return a `request cancelled` error response.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn core(&self) -> &ClientCore {
        &self.core
    }

    async fn dispatch(&self, request: HttpRequest) -> CrmResult {
        let response = match &self.cancellation {
            Some(token) => send_cancellable(&self.transport, request, token).await,
            None => self.transport.send(request).await,
        };
        Ok(response)
    }
}

#[async_trait]
impl<T: AsyncTransport> AsyncCrmClientApi for AsyncCrmClient<T> {
    async fn get_account(&self, account_id: &str) -> CrmResult {
        self.dispatch(self.core.build_get_account(account_id)?).await
    }

    async fn get_accounts(&self, options: ListOptions) -> CrmResult {
        self.dispatch(self.core.build_get_accounts(&options)?).await
    }

    async fn get_account_addresses(&self, account_id: &str, options: ListOptions) -> CrmResult {
        self.dispatch(self.core.build_get_account_addresses(account_id, &options)?)
            .await
    }

    async fn get_account_address(&self, account_id: &str, address_id: &str) -> CrmResult {
        self.dispatch(self.core.build_get_account_address(account_id, address_id)?)
            .await
    }

    async fn get_account_types(&self, options: ListOptions) -> CrmResult {
        self.dispatch(self.core.build_get_account_types(&options)?).await
    }

    async fn get_account_type(&self, type_id: &str) -> CrmResult {
        self.dispatch(self.core.build_get_account_type(type_id)?).await
    }

    async fn create_account(&self, account: &AccountRequest) -> CrmResult {
        let request = self.core.build_create_account(account)?;
        log::debug!("creating account via {}", request.url);
        let response = self.dispatch(request).await?;
        log::debug!("create account returned status {}", response.status);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use serde_json::{json, Value};

    use super::*;
    use crate::http::{ApiResponse, HttpMethod};

    struct Recording {
        requests: Mutex<Vec<HttpRequest>>,
        reply: ApiResponse,
    }

    impl Recording {
        fn replying(reply: ApiResponse) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                reply,
            }
        }

        fn last(&self) -> HttpRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl AsyncTransport for Recording {
        async fn send(&self, request: HttpRequest) -> ApiResponse {
            self.requests.lock().unwrap().push(request);
            self.reply.clone()
        }
    }

    /// Never answers.
    struct Hanging;

    #[async_trait]
    impl AsyncTransport for Hanging {
        async fn send(&self, _request: HttpRequest) -> ApiResponse {
            std::future::pending::<()>().await;
            ApiResponse::new(Value::Null, 200)
        }
    }

    fn client(reply: ApiResponse) -> AsyncCrmClient<Recording> {
        AsyncCrmClient::new("https://host", ClientOrigin::Web, Recording::replying(reply))
    }

    #[tokio::test]
    async fn get_account_resolves_url_and_params() {
        let c = client(ApiResponse::new(json!({"id": "123"}), 200));
        let response = c.get_account("123").await.unwrap();
        assert_eq!(response.status, 200);

        let req = c.transport.last();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://host/api/crm/accounts/123");
        assert_eq!(Value::Object(req.params.unwrap()), json!({"client_origin": "web"}));
    }

    #[tokio::test]
    async fn list_endpoints_send_pagination() {
        let c = client(ApiResponse::new(json!([]), 200));
        c.get_account_addresses("5", ListOptions::account_addresses().offset(20))
            .await
            .unwrap();
        let params = c.transport.last().params.unwrap();
        assert_eq!(params["offset"], 20);
        assert_eq!(params["sort_by"], "address.created");

        c.get_accounts(ListOptions::accounts().filter("is_vip", true)).await.unwrap();
        let params = c.transport.last().params.unwrap();
        assert_eq!(params["is_vip"], true);
        assert!(params.get("filters").is_none());
    }

    #[tokio::test]
    async fn create_account_is_a_post_with_meta() {
        let c = client(ApiResponse::new(json!({"id": 1}), 201));
        let response = c.create_account(&AccountRequest::new(2, 3)).await.unwrap();
        assert_eq!(response.status, 201);

        let req = c.transport.last();
        assert_eq!(req.method, HttpMethod::Post);
        let body = req.payload.unwrap();
        assert_eq!(body["meta"], json!({"client_origin": "web"}));
        assert_eq!(body["account_data"]["account_type_id"], 2);
    }

    #[tokio::test]
    async fn cancelled_call_returns_error_response() {
        let token = CancellationToken::new();
        let c = AsyncCrmClient::new("https://host", ClientOrigin::Web, Hanging)
            .with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });
        let response = c.get_account("1").await.unwrap();
        canceller.await.unwrap();

        assert_eq!(response.status, 500);
        assert_eq!(response.error_message(), Some("request cancelled"));
    }

    #[tokio::test]
    async fn concurrent_calls_do_not_share_payload_state() {
        let c = client(ApiResponse::new(json!([]), 200));
        let (a, b) = tokio::join!(
            c.get_accounts(ListOptions::accounts().limit(1)),
            c.get_account_types(ListOptions::account_types())
        );
        assert_eq!(a.unwrap().status, 200);
        assert_eq!(b.unwrap().status, 200);

        let requests = c.transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        let limits: Vec<&Value> = requests
            .iter()
            .map(|req| &req.params.as_ref().unwrap()["limit"])
            .collect();
        assert!(limits.contains(&&json!(1)));
        assert!(limits.contains(&&json!(10)));
    }
}
