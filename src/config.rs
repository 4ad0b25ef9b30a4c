//! Runtime configuration for the supervisor and its text-generation client.

use crate::{
    SupervisorResult, ValidationError,
    core::domain::value_object::{API_KEY_PLACEHOLDER, ApiKey, validate_api_key},
};
use std::env;
use std::time::Duration;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-04-17";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_TEST_DELAY: Duration = Duration::from_millis(1500);
pub const DEFAULT_MAX_CHAT_HISTORY: usize = 20;

/// Environment variables consulted by [`GeminiConfig::from_env`], in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Client-side throttling of outbound generation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

impl RateLimitConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.requests_per_second == 0 {
            return Err(ValidationError::Field {
                field: "requests_per_second".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.burst_size == 0 {
            return Err(ValidationError::Field {
                field: "burst_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Settings for the Gemini REST client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: ApiKey,
    pub model: String,
    /// API root; model paths are joined onto it.
    pub base_url: String,
    pub timeout: Duration,
    pub rate_limit: Option<RateLimitConfig>,
}

impl GeminiConfig {
    /// Configuration with the default model and endpoint.
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            rate_limit: None,
        }
    }

    /// Reads the key from `GEMINI_API_KEY`, then `API_KEY`.
    ///
    /// Returns `Ok(None)` when neither is set or the value is the placeholder.
    ///
    /// # Errors
    /// Returns a validation error when a variable is set to a malformed key.
    pub fn from_env() -> SupervisorResult<Option<Self>> {
        for name in API_KEY_ENV_VARS {
            let Ok(value) = env::var(name) else {
                continue;
            };
            if value.trim().is_empty() || value == API_KEY_PLACEHOLDER {
                continue;
            }
            validate_api_key(&value)?;
            return Ok(Some(Self::new(ApiKey::new_unchecked(value))));
        }
        Ok(None)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the API root. A trailing slash is added when missing.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = if base_url.ends_with('/') {
            base_url
        } else {
            format!("{}/", base_url)
        };
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }
}

/// How endpoint selection produces data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataMode {
    /// Never fabricate data: incomplete endpoints report `CONFIG_INCOMPLETE`.
    #[default]
    Placeholder,
    /// Endpoints without credentials get a generated demo snapshot.
    Mock,
}

/// Artificial delay applied before a generated snapshot is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedDelay {
    /// Uniformly random within the range (inclusive), in milliseconds.
    RandomMillis { min: u64, max: u64 },
    Fixed(Duration),
}

impl Default for SimulatedDelay {
    fn default() -> Self {
        SimulatedDelay::RandomMillis { min: 300, max: 1000 }
    }
}
