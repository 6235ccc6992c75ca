//! Client configuration.
//!
//! The SDK does not read config files itself. `ClientConfig` derives
//! `Deserialize` so the host application can embed it in its own config,
//! and `from_env` covers the common environment-variable setup.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::origin::ClientOrigin;
use crate::transport::DEFAULT_TIMEOUT;

pub const ENV_BASE_URL: &str = "CRM_BASE_URL";
pub const ENV_CLIENT_ORIGIN: &str = "CRM_CLIENT_ORIGIN";
pub const ENV_TIMEOUT_SECS: &str = "CRM_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = DEFAULT_TIMEOUT.as_secs();

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub origin: ClientOrigin,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, origin: ClientOrigin) -> Self {
        Self {
            base_url: base_url.into(),
            origin,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(ENV_BASE_URL)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ConfigError::InvalidConfig(format!("{ENV_BASE_URL} is not set")))?;
        let origin: ClientOrigin = lookup(ENV_CLIENT_ORIGIN)
            .ok_or_else(|| ConfigError::InvalidConfig(format!("{ENV_CLIENT_ORIGIN} is not set")))?
            .parse()?;
        let timeout_secs: u64 = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => raw.trim().parse().map_err(|_| {
                ConfigError::InvalidConfig(format!(
                    "{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'"
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            base_url,
            origin,
            timeout_secs,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn reads_all_variables() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "https://crm.internal"),
            (ENV_CLIENT_ORIGIN, "mobile-api"),
            (ENV_TIMEOUT_SECS, "5"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://crm.internal");
        assert_eq!(config.origin, ClientOrigin::MobileApi);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn timeout_defaults_to_thirty_seconds() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "https://crm.internal"),
            (ENV_CLIENT_ORIGIN, "web"),
        ]))
        .unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn missing_base_url_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_CLIENT_ORIGIN, "web")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(_)));
    }

    #[test]
    fn unsupported_origin_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "https://crm.internal"),
            (ENV_CLIENT_ORIGIN, "kiosk"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedOrigin("kiosk".to_string()));
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "https://crm.internal"),
            (ENV_CLIENT_ORIGIN, "web"),
            (ENV_TIMEOUT_SECS, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(_)));
    }

    #[test]
    fn deserializes_with_default_timeout() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url":"https://crm.internal","origin":"ewap"}"#).unwrap();
        assert_eq!(config, ClientConfig::new("https://crm.internal", ClientOrigin::Ewap));
    }
}
