use crate::core::domain::error::ValidationError;

const MAX_URL_LENGTH: usize = 2083; // RFC 7230 practical limit
const ALLOWED_SCHEMES: [&str; 2] = ["https", "http"];
const PROXMOX_API_PORT: u16 = 8006;

/// A validated endpoint base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointUrl(String);

impl EndpointUrl {
    /// Creates a new URL without validation.
    pub(crate) fn new_unchecked(url: String) -> Self {
        Self(url)
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for `https://` URLs on the Proxmox API port.
    #[must_use]
    pub fn is_proxmox_api(&self) -> bool {
        url::Url::parse(&self.0)
            .map(|parsed| {
                parsed.scheme() == "https" && parsed.port() == Some(PROXMOX_API_PORT)
            })
            .unwrap_or(false)
    }
}

/// Validates an endpoint base URL (scheme, host and length).
pub(crate) fn validate_endpoint_url(url: &str) -> Result<(), ValidationError> {
    if url.trim().is_empty() {
        return Err(ValidationError::Field {
            field: "api_url".to_string(),
            message: "URL cannot be empty".to_string(),
        });
    }
    if url.len() > MAX_URL_LENGTH {
        return Err(ValidationError::Format(format!(
            "URL exceeds maximum length of {} characters",
            MAX_URL_LENGTH
        )));
    }
    let parsed = url::Url::parse(url)
        .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;
    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return Err(ValidationError::ConstraintViolation(format!(
            "Invalid scheme. Must be one of: {}",
            ALLOWED_SCHEMES.join(", ")
        )));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::Format("URL must contain a host".to_string()));
    }
    Ok(())
}
