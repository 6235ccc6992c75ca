//! Origin-keyed request payloads.
//!
//! # Design
//! Every request the SDK sends carries a small "main payload": the caller's
//! `client_origin` tag plus optional filter, sort and pagination fields. Each
//! origin gets its own `PayloadVariant`, chosen by an explicit match in
//! `PayloadVariant::for_origin`. The declared field set is closed, so an
//! override naming anything else is rejected instead of silently dropped.
//!
//! `PayloadBuilder::build` starts from a fresh variant on every call, applies
//! the overrides, and flattens the result into a single JSON object with the
//! `filters` entries promoted to the top level. Nothing is shared between
//! builds, so overrides from one request never reach the next.

use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::origin::ClientOrigin;

/// A JSON object used for payload overrides and built payloads.
pub type JsonMap = Map<String, Value>;

/// Fields every variant declares, in serialization order.
pub const PAYLOAD_FIELDS: [&str; 6] = [
    "client_origin",
    "filters",
    "sort_by",
    "sort_order",
    "offset",
    "limit",
];

/// The overridable query fields shared by all variants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayloadFields {
    pub filters: JsonMap,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

/// Per-origin payload shape. The variant itself is the `client_origin` tag,
/// which keeps the tag out of reach of overrides.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadVariant {
    Web(PayloadFields),
    Ewap(PayloadFields),
    MobileApi(PayloadFields),
    AdminDashboard(PayloadFields),
}

impl PayloadVariant {
    /// Fresh variant with default fields for `origin`.
    pub fn for_origin(origin: ClientOrigin) -> Self {
        let fields = PayloadFields::default();
        match origin {
            ClientOrigin::Web => PayloadVariant::Web(fields),
            ClientOrigin::Ewap => PayloadVariant::Ewap(fields),
            ClientOrigin::MobileApi => PayloadVariant::MobileApi(fields),
            ClientOrigin::AdminDashboard => PayloadVariant::AdminDashboard(fields),
        }
    }

    pub fn client_origin(&self) -> ClientOrigin {
        match self {
            PayloadVariant::Web(_) => ClientOrigin::Web,
            PayloadVariant::Ewap(_) => ClientOrigin::Ewap,
            PayloadVariant::MobileApi(_) => ClientOrigin::MobileApi,
            PayloadVariant::AdminDashboard(_) => ClientOrigin::AdminDashboard,
        }
    }

    /// Model name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            PayloadVariant::Web(_) => "WebPayload",
            PayloadVariant::Ewap(_) => "EwapPayload",
            PayloadVariant::MobileApi(_) => "MobileApiPayload",
            PayloadVariant::AdminDashboard(_) => "AdminDashboardPayload",
        }
    }

    pub fn declared_fields(&self) -> &'static [&'static str] {
        match self {
            PayloadVariant::Web(_)
            | PayloadVariant::Ewap(_)
            | PayloadVariant::MobileApi(_)
            | PayloadVariant::AdminDashboard(_) => &PAYLOAD_FIELDS,
        }
    }

    pub fn declares(&self, field: &str) -> bool {
        self.declared_fields().contains(&field)
    }

    pub fn fields(&self) -> &PayloadFields {
        match self {
            PayloadVariant::Web(fields)
            | PayloadVariant::Ewap(fields)
            | PayloadVariant::MobileApi(fields)
            | PayloadVariant::AdminDashboard(fields) => fields,
        }
    }

    fn fields_mut(&mut self) -> &mut PayloadFields {
        match self {
            PayloadVariant::Web(fields)
            | PayloadVariant::Ewap(fields)
            | PayloadVariant::MobileApi(fields)
            | PayloadVariant::AdminDashboard(fields) => fields,
        }
    }

    /// Assign one declared field. Null values leave the field untouched.
    pub fn set(&mut self, field: &str, value: Value) -> Result<(), ConfigError> {
        if !self.declares(field) {
            return Err(ConfigError::UnknownPayloadField {
                field: field.to_string(),
                variant: self.name(),
            });
        }
        if value.is_null() {
            return Ok(());
        }

        let fields = self.fields_mut();
        match field {
            "filters" => match value {
                Value::Object(filters) => fields.filters = filters,
                _ => return Err(invalid(field, "an object")),
            },
            "sort_by" => fields.sort_by = Some(expect_string(field, value)?),
            "sort_order" => fields.sort_order = Some(expect_string(field, value)?),
            "offset" => fields.offset = Some(expect_count(field, &value)?),
            "limit" => fields.limit = Some(expect_count(field, &value)?),
            _ => return Err(ConfigError::ReadOnlyPayloadField(field.to_string())),
        }
        Ok(())
    }

    /// Serialize to a JSON object, leaving out unset fields. `filters` is
    /// still nested at this point.
    pub fn to_map(&self) -> JsonMap {
        let fields = self.fields();
        let mut map = JsonMap::new();
        map.insert(
            "client_origin".to_string(),
            Value::String(self.client_origin().as_str().to_string()),
        );
        let filters: JsonMap = fields
            .filters
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        map.insert("filters".to_string(), Value::Object(filters));
        if let Some(sort_by) = &fields.sort_by {
            map.insert("sort_by".to_string(), Value::String(sort_by.clone()));
        }
        if let Some(sort_order) = &fields.sort_order {
            map.insert("sort_order".to_string(), Value::String(sort_order.clone()));
        }
        if let Some(offset) = fields.offset {
            map.insert("offset".to_string(), Value::from(offset));
        }
        if let Some(limit) = fields.limit {
            map.insert("limit".to_string(), Value::from(limit));
        }
        map
    }
}

fn invalid(field: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidFieldValue {
        field: field.to_string(),
        expected,
    }
}

fn expect_string(field: &str, value: Value) -> Result<String, ConfigError> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(invalid(field, "a string")),
    }
}

fn expect_count(field: &str, value: &Value) -> Result<u64, ConfigError> {
    value.as_u64().ok_or_else(|| invalid(field, "a non-negative integer"))
}

/// Factory: fresh payload variant for an origin given by its wire value.
pub fn get_builder(origin: &str) -> Result<PayloadVariant, ConfigError> {
    let origin: ClientOrigin = origin.parse()?;
    Ok(PayloadVariant::for_origin(origin))
}

/// Builds flattened main payloads for one client origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadBuilder {
    origin: ClientOrigin,
}

impl PayloadBuilder {
    pub fn new(origin: ClientOrigin) -> Self {
        Self { origin }
    }

    pub fn origin(&self) -> ClientOrigin {
        self.origin
    }

    pub fn build(&self, overrides: &JsonMap) -> Result<JsonMap, ConfigError> {
        build(self.origin, overrides)
    }

    /// Payload with no overrides: just the origin tag.
    pub fn build_default(&self) -> JsonMap {
        flatten_filters(PayloadVariant::for_origin(self.origin).to_map())
    }
}

/// Apply `overrides` to a fresh variant for `origin` and flatten the result.
pub fn build(origin: ClientOrigin, overrides: &JsonMap) -> Result<JsonMap, ConfigError> {
    let mut variant = PayloadVariant::for_origin(origin);
    for (key, value) in overrides {
        variant.set(key, value.clone())?;
    }
    Ok(flatten_filters(variant.to_map()))
}

/// Move the entries of a nested `filters` object to the top level. Keys
/// already present at the top level keep their value.
fn flatten_filters(mut map: JsonMap) -> JsonMap {
    if let Some(Value::Object(filters)) = map.remove("filters") {
        for (key, value) in filters {
            if value.is_null() {
                continue;
            }
            map.entry(key).or_insert(value);
        }
    }
    map
}
