//! Typed access to the persisted session values.
//!
//! Reads are forgiving: a value that is missing, unreadable or fails to parse
//! is treated as absent and replaced by its default. Writes propagate errors.

use crate::{
    SupervisorError, SupervisorResult,
    core::{
        domain::model::{endpoint_config::EndpointConfig, user_settings::UserSettings},
        infrastructure::key_value_store::KeyValueStore,
    },
};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;

pub const ENDPOINTS_KEY: &str = "endpoints";
pub const USER_SETTINGS_KEY: &str = "userSettings";
pub const SETUP_GUIDE_COMPLETED_KEY: &str = "setupGuideCompleted";
pub const API_KEY_KEY: &str = "geminiApiKey";

#[derive(Clone)]
pub struct SettingsRepository {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load_endpoints(&self) -> Vec<EndpointConfig> {
        self.load_or_default(ENDPOINTS_KEY).await
    }

    pub async fn save_endpoints(&self, endpoints: &[EndpointConfig]) -> SupervisorResult<()> {
        self.save(ENDPOINTS_KEY, &endpoints).await
    }

    /// Stored settings, or defaults when absent or invalid.
    pub async fn load_settings(&self) -> UserSettings {
        let settings: UserSettings = self.load_or_default(USER_SETTINGS_KEY).await;
        match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "Stored settings are out of range, using defaults");
                UserSettings::default()
            }
        }
    }

    pub async fn save_settings(&self, settings: &UserSettings) -> SupervisorResult<()> {
        self.save(USER_SETTINGS_KEY, settings).await
    }

    pub async fn setup_guide_completed(&self) -> bool {
        self.load_or_default(SETUP_GUIDE_COMPLETED_KEY).await
    }

    pub async fn mark_setup_guide_completed(&self) -> SupervisorResult<()> {
        self.save(SETUP_GUIDE_COMPLETED_KEY, &true).await
    }

    /// The stored text-generation key, if one was saved.
    pub async fn load_api_key(&self) -> Option<String> {
        self.load_or_default::<Option<String>>(API_KEY_KEY)
            .await
            .filter(|key| !key.trim().is_empty())
    }

    pub async fn save_api_key(&self, key: Option<&str>) -> SupervisorResult<()> {
        match key {
            Some(key) => self.save(API_KEY_KEY, &key).await,
            None => self.store.remove(API_KEY_KEY).await,
        }
    }

    async fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read stored value, using default");
                return T::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "Stored value is unparsable, using default");
            T::default()
        })
    }

    async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> SupervisorResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| SupervisorError::Processing(format!("Failed to serialize {}: {}", key, e)))?;
        self.store.set(key, &json).await
    }
}

impl std::fmt::Debug for SettingsRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsRepository").finish_non_exhaustive()
    }
}
