use crate::{
    ValidationError,
    core::domain::{
        model::endpoint_config::EndpointConfig,
        value_object::{validate_endpoint_name, validate_endpoint_url},
    },
};

/// User input for creating or editing an endpoint.
///
/// URL and token may be left blank; such an endpoint is saved but reports
/// `CONFIG_INCOMPLETE` when selected.
#[derive(Clone, PartialEq, Eq)]
pub struct EndpointRequest {
    pub name: String,
    pub api_url: String,
    pub api_token: String,
}

impl EndpointRequest {
    pub fn new(
        name: impl Into<String>,
        api_url: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            api_url: api_url.into(),
            api_token: api_token.into(),
        }
    }

    /// Name must be present; a non-blank URL must parse as http(s) with a host.
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        validate_endpoint_name(&self.name)?;
        if !self.api_url.trim().is_empty() {
            validate_endpoint_url(self.api_url.trim())?;
        }
        Ok(())
    }

    pub(crate) fn into_config(self, id: String) -> EndpointConfig {
        EndpointConfig {
            id,
            name: self.name.trim().to_string(),
            api_url: self.api_url.trim().to_string(),
            api_token: self.api_token.trim().to_string(),
        }
    }
}

impl std::fmt::Debug for EndpointRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointRequest")
            .field("name", &self.name)
            .field("api_url", &self.api_url)
            .field("api_token", &"<redacted>")
            .finish()
    }
}
