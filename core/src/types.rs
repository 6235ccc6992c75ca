//! Request DTOs and list options for the account endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::origin::SortOrder;
use crate::payload::JsonMap;

/// Body of an account creation request.
///
/// When `existing_account_email` matches an existing account, the service
/// treats the request as an association with that account and creates
/// nothing new.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRequest {
    pub account_type_id: i64,
    pub parent_account_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// System user to associate the account with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_account_email: Option<String>,
}

impl AccountRequest {
    pub fn new(account_type_id: i64, parent_account_id: i64) -> Self {
        Self {
            account_type_id,
            parent_account_id,
            ..Self::default()
        }
    }
}

pub const DEFAULT_OFFSET: u64 = 0;
pub const DEFAULT_LIMIT: u64 = 10;

/// Filtering, sorting and pagination for list endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct ListOptions {
    /// Equality filters, sent as top-level query parameters.
    pub filters: JsonMap,
    pub offset: u64,
    pub limit: u64,
    pub sort_by: String,
    pub sort_order: SortOrder,
}

impl ListOptions {
    pub fn sorted_by(sort_by: impl Into<String>) -> Self {
        Self {
            filters: JsonMap::new(),
            offset: DEFAULT_OFFSET,
            limit: DEFAULT_LIMIT,
            sort_by: sort_by.into(),
            sort_order: SortOrder::default(),
        }
    }

    pub fn accounts() -> Self {
        Self::sorted_by("name")
    }

    pub fn account_types() -> Self {
        Self::sorted_by("created")
    }

    pub fn account_addresses() -> Self {
        Self::sorted_by("address.created")
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn sort_by(mut self, sort_by: impl Into<String>) -> Self {
        self.sort_by = sort_by.into();
        self
    }

    pub fn sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Payload overrides for these options.
    pub fn to_overrides(&self) -> JsonMap {
        let mut overrides = JsonMap::new();
        overrides.insert("offset".to_string(), Value::from(self.offset));
        overrides.insert("limit".to_string(), Value::from(self.limit));
        overrides.insert("sort_by".to_string(), Value::String(self.sort_by.clone()));
        overrides.insert(
            "sort_order".to_string(),
            Value::String(self.sort_order.as_str().to_string()),
        );
        if !self.filters.is_empty() {
            overrides.insert("filters".to_string(), Value::Object(self.filters.clone()));
        }
        overrides
    }
}
