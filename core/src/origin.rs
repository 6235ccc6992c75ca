//! Calling-application origins and sort order constants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Identifies the application calling the CRM service. Selects the payload
/// variant every request is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClientOrigin {
    #[serde(rename = "web")]
    Web,
    #[serde(rename = "ewap")]
    Ewap,
    #[serde(rename = "mobile-api")]
    MobileApi,
    #[serde(rename = "admin-dashboard")]
    AdminDashboard,
}

impl ClientOrigin {
    pub const ALL: [ClientOrigin; 4] = [
        ClientOrigin::Web,
        ClientOrigin::Ewap,
        ClientOrigin::MobileApi,
        ClientOrigin::AdminDashboard,
    ];

    /// Wire value sent as `client_origin`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientOrigin::Web => "web",
            ClientOrigin::Ewap => "ewap",
            ClientOrigin::MobileApi => "mobile-api",
            ClientOrigin::AdminDashboard => "admin-dashboard",
        }
    }
}

impl fmt::Display for ClientOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientOrigin {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClientOrigin::ALL
            .into_iter()
            .find(|origin| origin.as_str() == s)
            .ok_or_else(|| ConfigError::UnsupportedOrigin(s.to_string()))
    }
}

/// Sort direction for list endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
