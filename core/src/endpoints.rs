//! Endpoint templates of the CRM account API and the resolver that turns
//! them into full URLs.

use crate::error::ConfigError;

pub const ACCOUNTS: &str = "/api/crm/accounts";
pub const ACCOUNT: &str = "/api/crm/accounts/{account_id}";
pub const ACCOUNT_ADDRESSES: &str = "/api/crm/accounts/{account_id}/addresses";
pub const ACCOUNT_ADDRESS: &str = "/api/crm/accounts/{account_id}/addresses/{address_id}";
pub const ACCOUNT_TYPES: &str = "/api/crm/account_types";
pub const ACCOUNT_TYPE: &str = "/api/crm/account_types/{type_id}";

/// Substitute every `{name}` placeholder in `template` and append the result
/// to `base_url`.
///
/// Values are inserted verbatim. Values that match no placeholder are
/// ignored; a placeholder without a value is an error.
pub fn resolve_endpoint(
    base_url: &str,
    template: &str,
    values: &[(&str, &str)],
) -> Result<String, ConfigError> {
    let mut url = String::with_capacity(base_url.len() + template.len());
    url.push_str(base_url.trim_end_matches('/'));

    let mut rest = template;
    while let Some(start) = rest.find('{') {
        url.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            // Unterminated brace: treat the remainder as a literal.
            url.push_str(&rest[start..]);
            return Ok(url);
        };
        let name = &after[..end];
        let value = values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .ok_or_else(|| ConfigError::MissingPathParameter(name.to_string()))?;
        url.push_str(value);
        rest = &after[end + 1..];
    }
    url.push_str(rest);
    Ok(url)
}
