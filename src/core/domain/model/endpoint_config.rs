//! Domain model for a user-registered Proxmox endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection info entered by the user.
///
/// Persisted as-is; never validated against a real server.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointConfig {
    pub id: String,
    pub name: String,
    /// Base API URL, e.g. `https://pve.example.com:8006`.
    #[serde(default)]
    pub api_url: String,
    /// API token in `user@realm!tokenid=secret` form.
    #[serde(default)]
    pub api_token: String,
}

/// Whether an endpoint carries everything a real connection would need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointReadiness {
    Complete,
    /// Names of the blank fields (`api_url`, `api_token`).
    Incomplete { missing: Vec<&'static str> },
}

impl EndpointConfig {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        api_url: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            api_url: api_url.into(),
            api_token: api_token.into(),
        }
    }

    /// Whitespace-only values count as blank.
    pub fn readiness(&self) -> EndpointReadiness {
        let mut missing = Vec::new();
        if self.api_url.trim().is_empty() {
            missing.push("api_url");
        }
        if self.api_token.trim().is_empty() {
            missing.push("api_token");
        }
        if missing.is_empty() {
            EndpointReadiness::Complete
        } else {
            EndpointReadiness::Incomplete { missing }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.readiness() == EndpointReadiness::Complete
    }
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("api_url", &self.api_url)
            .field("api_token", &"<redacted>")
            .finish()
    }
}
