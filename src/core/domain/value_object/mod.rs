mod api_key;
mod api_token;
mod endpoint_name;
mod endpoint_url;

pub use api_key::{API_KEY_PLACEHOLDER, ApiKey};
pub use api_token::ApiToken;
pub use endpoint_url::EndpointUrl;

// Re-export validation functions for internal use
pub(crate) use api_key::validate_api_key;
pub(crate) use api_token::validate_api_token;
pub(crate) use endpoint_name::validate_endpoint_name;
pub(crate) use endpoint_url::validate_endpoint_url;
