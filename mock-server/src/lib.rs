use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const CLIENT_ORIGINS: [&str; 4] = ["web", "ewap", "mobile-api", "admin-dashboard"];

const RESERVED_PARAMS: [&str; 5] = ["client_origin", "offset", "limit", "sort_by", "sort_order"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: Option<String>,
    pub email_address: Option<String>,
    pub phone_number: Option<String>,
    pub account_type: i64,
    pub parent_account: i64,
    pub created_by: Option<String>,
    pub user_ids: Vec<String>,
    pub is_active: bool,
    pub created: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: i64,
    pub account_id: i64,
    pub line1: String,
    pub city: String,
    pub postal_code: String,
    pub created: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountType {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub is_partner: bool,
    pub commission_rate: u32,
    pub created: u64,
}

/// `account_data` of a create request.
#[derive(Deserialize)]
pub struct AccountData {
    pub account_type_id: i64,
    pub parent_account_id: i64,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
    pub created_by: Option<String>,
    pub user_id: Option<String>,
    pub existing_account_email: Option<String>,
}

#[derive(Deserialize)]
pub struct Meta {
    pub client_origin: String,
}

#[derive(Deserialize)]
pub struct CreateAccount {
    pub account_data: AccountData,
    pub meta: Meta,
}

#[derive(Debug, Default)]
pub struct Store {
    pub accounts: Vec<Account>,
    pub addresses: Vec<Address>,
    pub account_types: Vec<AccountType>,
    clock: u64,
}

impl Store {
    /// Three account types and one account with two addresses.
    pub fn seeded() -> Self {
        let mut store = Store::default();
        for (id, name, is_partner) in [(1, "Internal", false), (2, "Business", false), (3, "Partner", true)] {
            let created = store.tick();
            store.account_types.push(AccountType {
                id,
                name: name.to_string(),
                description: format!("{name} accounts"),
                is_partner,
                commission_rate: if is_partner { 10 } else { 0 },
                created,
            });
        }
        let created = store.tick();
        store.accounts.push(Account {
            id: 1,
            name: Some("Seed Account".to_string()),
            email_address: Some("seed@example.com".to_string()),
            phone_number: None,
            account_type: 1,
            parent_account: 1,
            created_by: Some("system".to_string()),
            user_ids: Vec::new(),
            is_active: true,
            created,
        });
        for (id, line1, city) in [(1, "1 Main St", "Springfield"), (2, "9 Side Rd", "Shelbyville")] {
            let created = store.tick();
            store.addresses.push(Address {
                id,
                account_id: 1,
                line1: line1.to_string(),
                city: city.to_string(),
                postal_code: "00000".to_string(),
                created,
            });
        }
        store
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn next_account_id(&self) -> i64 {
        self.accounts.iter().map(|a| a.id).max().unwrap_or(0) + 1
    }
}

pub type Db = Arc<RwLock<Store>>;

type ApiError = (StatusCode, Json<Value>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

fn not_found(what: &str, id: &str) -> ApiError {
    error(StatusCode::NOT_FOUND, format!("{what} '{id}' not found"))
}

pub fn app() -> Router {
    app_with_store(Store::seeded())
}

pub fn app_with_store(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/api/crm/accounts", get(list_accounts).post(create_account))
        .route("/api/crm/accounts/{account_id}", get(get_account))
        .route("/api/crm/accounts/{account_id}/addresses", get(list_addresses))
        .route(
            "/api/crm/accounts/{account_id}/addresses/{address_id}",
            get(get_address),
        )
        .route("/api/crm/account_types", get(list_account_types))
        .route("/api/crm/account_types/{type_id}", get(get_account_type))
        .layer(middleware::from_fn(require_authorization))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_authorization(request: Request, next: Next) -> Result<Response, ApiError> {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| !value.trim().is_empty());
    if !authorized {
        return Err(error(StatusCode::UNAUTHORIZED, "missing Authorization header"));
    }
    Ok(next.run(request).await)
}

fn check_origin(origin: Option<&str>) -> Result<(), ApiError> {
    match origin {
        Some(origin) if CLIENT_ORIGINS.contains(&origin) => Ok(()),
        Some(origin) => Err(error(
            StatusCode::BAD_REQUEST,
            format!("unsupported client_origin '{origin}'"),
        )),
        None => Err(error(StatusCode::BAD_REQUEST, "client_origin is required")),
    }
}

fn parse_id(raw: &str, what: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| not_found(what, raw))
}

fn parse_count(query: &HashMap<String, String>, key: &str, default: usize) -> Result<usize, ApiError> {
    match query.get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| error(StatusCode::BAD_REQUEST, format!("{key} must be a non-negative integer"))),
        None => Ok(default),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => render(a).cmp(&render(b)),
    }
}

/// Filter, sort and paginate `records` according to the list query.
/// Unreserved query keys are equality filters on record fields.
fn page<T: Serialize>(
    records: &[T],
    query: &HashMap<String, String>,
    default_sort: &str,
) -> Result<Vec<Value>, ApiError> {
    check_origin(query.get("client_origin").map(String::as_str))?;
    let offset = parse_count(query, "offset", 0)?;
    let limit = parse_count(query, "limit", 10)?;
    let sort_by = query.get("sort_by").map(String::as_str).unwrap_or(default_sort);
    // "address.created" sorts on the address record's own "created" field.
    let sort_field = sort_by.rsplit('.').next().unwrap_or(sort_by);
    let descending = match query.get("sort_order").map(String::as_str) {
        None | Some("DESC") => true,
        Some("ASC") => false,
        Some(other) => {
            return Err(error(
                StatusCode::BAD_REQUEST,
                format!("sort_order must be ASC or DESC, got '{other}'"),
            ))
        }
    };

    let mut items: Vec<Value> = records
        .iter()
        .filter_map(|record| serde_json::to_value(record).ok())
        .filter(|record| {
            query
                .iter()
                .filter(|(key, _)| !RESERVED_PARAMS.contains(&key.as_str()))
                .all(|(key, expected)| record.get(key).is_some_and(|v| render(v) == *expected))
        })
        .collect();
    items.sort_by(|a, b| {
        let ordering = compare(&a[sort_field], &b[sort_field]);
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
    Ok(items.into_iter().skip(offset).take(limit).collect())
}

async fn list_accounts(
    State(db): State<Db>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let store = db.read().await;
    page(&store.accounts, &query, "name").map(Json)
}

async fn get_account(
    State(db): State<Db>,
    Path(account_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Account>, ApiError> {
    check_origin(query.get("client_origin").map(String::as_str))?;
    let id = parse_id(&account_id, "account")?;
    let store = db.read().await;
    store
        .accounts
        .iter()
        .find(|a| a.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("account", &account_id))
}

async fn create_account(
    State(db): State<Db>,
    Json(input): Json<CreateAccount>,
) -> Result<(StatusCode, Json<Account>), ApiError> {
    check_origin(Some(input.meta.client_origin.as_str()))?;
    let data = input.account_data;
    let mut store = db.write().await;

    if !store.account_types.iter().any(|t| t.id == data.account_type_id) {
        return Err(error(
            StatusCode::BAD_REQUEST,
            format!("unknown account type {}", data.account_type_id),
        ));
    }

    if let Some(email) = &data.existing_account_email {
        if let Some(existing) = store
            .accounts
            .iter_mut()
            .find(|a| a.email_address.as_deref() == Some(email.as_str()))
        {
            if let Some(user_id) = data.user_id {
                if !existing.user_ids.contains(&user_id) {
                    existing.user_ids.push(user_id);
                }
            }
            log::info!("associated request with existing account {}", existing.id);
            return Ok((StatusCode::OK, Json(existing.clone())));
        }
    }

    let created = store.tick();
    let account = Account {
        id: store.next_account_id(),
        name: data.name,
        email_address: data.email_address,
        phone_number: data.phone_number,
        account_type: data.account_type_id,
        parent_account: data.parent_account_id,
        created_by: data.created_by,
        user_ids: data.user_id.into_iter().collect(),
        is_active: true,
        created,
    };
    log::info!(
        "created account {} for origin {}",
        account.id,
        input.meta.client_origin
    );
    store.accounts.push(account.clone());
    Ok((StatusCode::CREATED, Json(account)))
}

async fn list_addresses(
    State(db): State<Db>,
    Path(account_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let id = parse_id(&account_id, "account")?;
    let store = db.read().await;
    if !store.accounts.iter().any(|a| a.id == id) {
        return Err(not_found("account", &account_id));
    }
    let addresses: Vec<Address> = store
        .addresses
        .iter()
        .filter(|a| a.account_id == id)
        .cloned()
        .collect();
    page(&addresses, &query, "address.created").map(Json)
}

async fn get_address(
    State(db): State<Db>,
    Path((account_id, address_id)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Address>, ApiError> {
    check_origin(query.get("client_origin").map(String::as_str))?;
    let account = parse_id(&account_id, "account")?;
    let id = parse_id(&address_id, "address")?;
    let store = db.read().await;
    store
        .addresses
        .iter()
        .find(|a| a.account_id == account && a.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("address", &address_id))
}

async fn list_account_types(
    State(db): State<Db>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let store = db.read().await;
    page(&store.account_types, &query, "created").map(Json)
}

async fn get_account_type(
    State(db): State<Db>,
    Path(type_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<AccountType>, ApiError> {
    check_origin(query.get("client_origin").map(String::as_str))?;
    let id = parse_id(&type_id, "account type")?;
    let store = db.read().await;
    store
        .account_types
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("account type", &type_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn seeded_store_has_types_account_and_addresses() {
        let store = Store::seeded();
        assert_eq!(store.account_types.len(), 3);
        assert_eq!(store.accounts.len(), 1);
        assert_eq!(store.addresses.len(), 2);
        assert_eq!(store.next_account_id(), 2);
    }

    #[test]
    fn page_requires_client_origin() {
        let store = Store::seeded();
        let (status, _) = page(&store.account_types, &query(&[]), "created").unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) =
            page(&store.account_types, &query(&[("client_origin", "kiosk")]), "created").unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn page_sorts_desc_by_default() {
        let store = Store::seeded();
        let items = page(&store.account_types, &query(&[("client_origin", "web")]), "created").unwrap();
        let names: Vec<&str> = items.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Partner", "Business", "Internal"]);
    }

    #[test]
    fn page_applies_offset_limit_and_asc() {
        let store = Store::seeded();
        let items = page(
            &store.account_types,
            &query(&[
                ("client_origin", "web"),
                ("sort_by", "name"),
                ("sort_order", "ASC"),
                ("offset", "1"),
                ("limit", "1"),
            ]),
            "created",
        )
        .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "Internal");
    }

    #[test]
    fn page_filters_on_unreserved_keys() {
        let store = Store::seeded();
        let items = page(
            &store.account_types,
            &query(&[("client_origin", "web"), ("is_partner", "true")]),
            "created",
        )
        .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "Partner");
    }

    #[test]
    fn page_rejects_bad_sort_order_and_limit() {
        let store = Store::seeded();
        let (status, _) = page(
            &store.account_types,
            &query(&[("client_origin", "web"), ("sort_order", "UP")]),
            "created",
        )
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = page(
            &store.account_types,
            &query(&[("client_origin", "web"), ("limit", "-1")]),
            "created",
        )
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn create_account_body_parses() {
        let input: CreateAccount = serde_json::from_str(
            r#"{"account_data":{"account_type_id":2,"parent_account_id":1,"name":"Acme"},"meta":{"client_origin":"web"}}"#,
        )
        .unwrap();
        assert_eq!(input.account_data.account_type_id, 2);
        assert_eq!(input.account_data.name.as_deref(), Some("Acme"));
        assert!(input.account_data.user_id.is_none());
        assert_eq!(input.meta.client_origin, "web");
    }

    #[test]
    fn create_account_body_requires_meta() {
        let result: Result<CreateAccount, _> =
            serde_json::from_str(r#"{"account_data":{"account_type_id":2,"parent_account_id":1}}"#);
        assert!(result.is_err());
    }
}
