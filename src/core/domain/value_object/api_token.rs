use crate::core::domain::error::ValidationError;
use std::fmt;

const MIN_TOKEN_LENGTH: usize = 21;
const MIN_SECRET_LENGTH: usize = 5;

/// A Proxmox API token (`user@realm!tokenid=secret`).
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Creates a new token without validation.
    pub(crate) fn new_unchecked(token: String) -> Self {
        Self(token)
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `user@realm!tokenid` part, safe to display.
    #[must_use]
    pub fn token_id(&self) -> Option<&str> {
        self.0.split_once('=').map(|(id, _)| id)
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiToken").field(&"<redacted>").finish()
    }
}

/// Validates the `user@realm!tokenid=secret` shape of an API token.
pub(crate) fn validate_api_token(token: &str) -> Result<(), ValidationError> {
    if token.is_empty() {
        return Err(ValidationError::Field {
            field: "api_token".to_string(),
            message: "API token cannot be empty".to_string(),
        });
    }
    if token.len() < MIN_TOKEN_LENGTH {
        return Err(ValidationError::Format(format!(
            "API token must be at least {} characters long",
            MIN_TOKEN_LENGTH
        )));
    }
    let shape = || {
        ValidationError::Format(
            "Invalid API Token format (expected user@realm!tokenid=secret_value)".to_string(),
        )
    };
    let (token_id, secret) = token.split_once('=').ok_or_else(shape)?;
    let (user_realm, id) = token_id.split_once('!').ok_or_else(shape)?;
    let (user, realm) = user_realm.split_once('@').ok_or_else(shape)?;
    if user.is_empty() || realm.is_empty() || id.is_empty() {
        return Err(shape());
    }
    if secret.len() < MIN_SECRET_LENGTH {
        return Err(ValidationError::ConstraintViolation(format!(
            "Token secret must be at least {} characters long",
            MIN_SECRET_LENGTH
        )));
    }
    Ok(())
}
