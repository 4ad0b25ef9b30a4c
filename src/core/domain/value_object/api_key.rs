use crate::core::domain::error::ValidationError;
use std::fmt;

/// Value shipped in example configs; treated as "no key".
pub const API_KEY_PLACEHOLDER: &str = "YOUR_GEMINI_API_KEY";

/// A text-generation API key (plaintext, kept in memory only).
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Validates and wraps a key.
    ///
    /// # Errors
    /// Returns `ValidationError::Field` for blank keys or the placeholder value.
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();
        validate_api_key(&key)?;
        Ok(Self(key))
    }

    /// Creates a new key without validation.
    pub(crate) fn new_unchecked(key: String) -> Self {
        Self(key)
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&"<redacted>").finish()
    }
}

/// Rejects blank keys and the placeholder.
pub(crate) fn validate_api_key(key: &str) -> Result<(), ValidationError> {
    if key.trim().is_empty() {
        return Err(ValidationError::Field {
            field: "api_key".to_string(),
            message: "API key cannot be empty".to_string(),
        });
    }
    if key == API_KEY_PLACEHOLDER {
        return Err(ValidationError::Field {
            field: "api_key".to_string(),
            message: "API key is still the placeholder value".to_string(),
        });
    }
    if key.chars().any(char::is_whitespace) {
        return Err(ValidationError::Format(
            "API key cannot contain whitespace".to_string(),
        ));
    }
    Ok(())
}
