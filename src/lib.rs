//! Supervisor core for a Proxmox monitoring dashboard.
//!
//! The crate keeps a list of user-configured Proxmox endpoints, produces
//! synthetic snapshots of their nodes and guests, derives threshold alerts,
//! and bridges questions and report summaries to a hosted text-generation
//! model. It never talks to a Proxmox server.

mod alerting;
mod assistant;
mod config;
mod core;
mod session;
mod telemetry;

#[cfg(test)]
mod tests;

pub use crate::{
    alerting::application::service::alert_evaluator::{
        AlertEvaluator, evaluate as evaluate_alerts, evaluate_with_settings,
    },
    assistant::application::{
        request::generation_request::{ConversationTurn, GenerationRequest, TurnRole},
        service::{
            chat_session::{CHAT_CLEARED_MESSAGE, ChatSession, Transcript},
            prompt_builder::{ASSISTANT_SYSTEM_INSTRUCTION, chat_prompt, report_prompt},
            report_service::{ReportSummarizer, StatusReport},
            text_generator::TextGenerator,
        },
    },
    config::{
        API_KEY_ENV_VARS, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL,
        DEFAULT_MAX_CHAT_HISTORY, DEFAULT_REFRESH_INTERVAL, DEFAULT_TEST_DELAY, DataMode,
        GeminiConfig, RateLimitConfig, SimulatedDelay,
    },
    core::{
        domain::{
            error::{ErrorCategory, SupervisorError, SupervisorResult, ValidationError},
            model::{
                Alert, AlertResourceType, AlertSeverity, AlertThresholds, BackupState,
                BackupStatus, ChatMessage, ClusterInfo, CpuMetric, EndpointConfig,
                EndpointReadiness, InstanceData, Metric, NetworkInterface, Node, ProxmoxService,
                ResourceType, Sender, SessionStatus, Status, StatusKind, StoragePool,
                Temperature, TemperatureUnit, UserSettings, VirtualResource,
            },
            value_object::{API_KEY_PLACEHOLDER, ApiKey, ApiToken, EndpointUrl},
        },
        infrastructure::{
            gemini_client::GeminiClient,
            key_value_store::{FileStore, KeyValueStore, MemoryStore},
        },
    },
    session::application::{
        request::endpoint_request::EndpointRequest,
        response::{
            connection_test_result::ConnectionTestResult, refresh_outcome::RefreshOutcome,
        },
        service::settings_repository::{
            API_KEY_KEY, ENDPOINTS_KEY, SETUP_GUIDE_COMPLETED_KEY, USER_SETTINGS_KEY,
        },
    },
    telemetry::application::service::{
        metric_factory::{create_cpu_metric, create_metric},
        snapshot_builder::build_snapshot,
        snapshot_source::{SnapshotSource, SyntheticSnapshotSource},
        topology_generator::{Topology, generate_topology},
    },
};

use crate::session::application::service::{
    endpoint_tester,
    session_state::{LoadPlan, SessionState},
    settings_repository::SettingsRepository,
};
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// The session state holder behind a dashboard.
///
/// A `Supervisor` owns the configured endpoints, the active selection, the
/// latest snapshot with its alerts, the user settings and the assistant
/// conversation. Every mutation of endpoints or settings is persisted through
/// the configured [`KeyValueStore`].
///
/// All methods take `&self`; share the supervisor behind an `Arc` to drive it
/// from several tasks.
///
/// # Examples
///
/// ```no_run
/// use proxmox_supervisor::{EndpointRequest, FileStore, GeminiConfig, Supervisor, SupervisorResult};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> SupervisorResult<()> {
///     let mut builder = Supervisor::builder()
///         .store(Arc::new(FileStore::new("./state")))
///         .mock_data(true);
///     if let Some(gemini) = GeminiConfig::from_env()? {
///         builder = builder.gemini(gemini);
///     }
///     let supervisor = builder.build().await?;
///
///     supervisor
///         .add_endpoint(EndpointRequest::new("Homelab", "", ""))
///         .await?;
///     for alert in supervisor.alerts().await {
///         println!("{}: {}", alert.severity, alert.message);
///     }
///     Ok(())
/// }
/// ```
pub struct Supervisor {
    repository: SettingsRepository,
    source: Arc<dyn SnapshotSource>,
    generator: RwLock<Option<Arc<dyn TextGenerator>>>,
    gemini_template: Option<GeminiConfig>,
    state: RwLock<SessionState>,
    conversation: RwLock<Conversation>,
    setup_guide_completed: AtomicBool,
    test_delay: Duration,
    refresh_interval: Duration,
}

#[derive(Debug)]
struct Conversation {
    session: ChatSession,
    transcript: Transcript,
}

impl Conversation {
    fn reset(&mut self) {
        self.session.reset();
        self.transcript.clear();
    }
}

/// Builder for [`Supervisor`] configuration
#[derive(Default)]
pub struct SupervisorBuilder {
    store: Option<Arc<dyn KeyValueStore>>,
    gemini: Option<GeminiConfig>,
    text_generator: Option<Arc<dyn TextGenerator>>,
    snapshot_source: Option<Arc<dyn SnapshotSource>>,
    mock_data: bool,
    seed: Option<u64>,
    simulated_delay: Option<Duration>,
    test_delay: Option<Duration>,
    refresh_interval: Option<Duration>,
    max_chat_history: Option<usize>,
}

impl SupervisorBuilder {
    /// Durable storage for endpoints, settings and flags. Required.
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Talk to Gemini with these settings.
    pub fn gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = Some(config);
        self
    }

    /// Use a custom text generator. Takes precedence over [`gemini`](Self::gemini).
    pub fn text_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.text_generator = Some(generator);
        self
    }

    /// Replace the synthetic snapshot source.
    pub fn snapshot_source(mut self, source: Arc<dyn SnapshotSource>) -> Self {
        self.snapshot_source = Some(source);
        self
    }

    /// Generate demo snapshots for endpoints that lack a URL or token.
    pub fn mock_data(mut self, enabled: bool) -> Self {
        self.mock_data = enabled;
        self
    }

    /// Seed the synthetic source for reproducible snapshots.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fixed artificial load delay. Defaults to a random 300–1000 ms.
    pub fn simulated_delay(mut self, delay: Duration) -> Self {
        self.simulated_delay = Some(delay);
        self
    }

    pub fn test_delay(mut self, delay: Duration) -> Self {
        self.test_delay = Some(delay);
        self
    }

    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    pub fn max_chat_history(mut self, max: usize) -> Self {
        self.max_chat_history = Some(max);
        self
    }

    /// Loads persisted state and assembles the supervisor.
    ///
    /// # Errors
    /// * `ConfigurationMissing` when no store was given
    /// * `Validation` for a zero refresh interval or chat history size, or an
    ///   invalid Gemini configuration
    pub async fn build(self) -> SupervisorResult<Supervisor> {
        let store = self.store.ok_or_else(|| SupervisorError::ConfigurationMissing {
            field: "store".to_string(),
        })?;

        let refresh_interval = self.refresh_interval.unwrap_or(DEFAULT_REFRESH_INTERVAL);
        if refresh_interval.is_zero() {
            return Err(ValidationError::Field {
                field: "refresh_interval".to_string(),
                message: "Refresh interval must be greater than zero".to_string(),
            }
            .into());
        }
        let max_chat_history = self.max_chat_history.unwrap_or(DEFAULT_MAX_CHAT_HISTORY);
        if max_chat_history == 0 {
            return Err(ValidationError::Field {
                field: "max_chat_history".to_string(),
                message: "Chat history must hold at least one message".to_string(),
            }
            .into());
        }

        let repository = SettingsRepository::new(store);
        let endpoints = repository.load_endpoints().await;
        let settings = repository.load_settings().await;
        let setup_guide_completed = repository.setup_guide_completed().await;

        let generator: Option<Arc<dyn TextGenerator>> = match (self.text_generator, &self.gemini) {
            (Some(generator), _) => Some(generator),
            (None, Some(config)) => Some(Arc::new(GeminiClient::new(config.clone())?)),
            (None, None) => match repository.load_api_key().await.map(ApiKey::new) {
                Some(Ok(key)) => Some(Arc::new(GeminiClient::new(GeminiConfig::new(key))?)),
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Ignoring stored API key");
                    None
                }
                None => None,
            },
        };

        let source: Arc<dyn SnapshotSource> = match self.snapshot_source {
            Some(source) => source,
            None => {
                let delay = self
                    .simulated_delay
                    .map(SimulatedDelay::Fixed)
                    .unwrap_or_default();
                Arc::new(match self.seed {
                    Some(seed) => SyntheticSnapshotSource::seeded(seed, delay),
                    None => SyntheticSnapshotSource::new(delay),
                })
            }
        };

        let mode = if self.mock_data {
            DataMode::Mock
        } else {
            DataMode::Placeholder
        };

        tracing::info!(
            endpoints = endpoints.len(),
            ?mode,
            assistant = generator.is_some(),
            "Supervisor ready"
        );

        Ok(Supervisor {
            repository,
            source,
            generator: RwLock::new(generator),
            gemini_template: self.gemini,
            state: RwLock::new(SessionState::new(endpoints, settings, mode)),
            conversation: RwLock::new(Conversation {
                session: ChatSession::new(ASSISTANT_SYSTEM_INSTRUCTION),
                transcript: Transcript::new(max_chat_history),
            }),
            setup_guide_completed: AtomicBool::new(setup_guide_completed),
            test_delay: self.test_delay.unwrap_or(DEFAULT_TEST_DELAY),
            refresh_interval,
        })
    }
}

impl Supervisor {
    /// Creates a new builder for Supervisor configuration
    pub fn builder() -> SupervisorBuilder {
        SupervisorBuilder::default()
    }

    pub async fn endpoints(&self) -> Vec<EndpointConfig> {
        self.state.read().await.endpoints().to_vec()
    }

    pub async fn settings(&self) -> UserSettings {
        self.state.read().await.settings().clone()
    }

    pub async fn selected_endpoint(&self) -> Option<String> {
        self.state.read().await.selected().map(str::to_string)
    }

    pub async fn snapshot(&self) -> Option<Arc<InstanceData>> {
        self.state.read().await.snapshot()
    }

    pub async fn alerts(&self) -> Vec<Alert> {
        self.state.read().await.alerts().to_vec()
    }

    pub async fn status(&self) -> Option<SessionStatus> {
        self.state.read().await.status().cloned()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading()
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Selects an endpoint (or clears the selection with `None`) and loads it.
    ///
    /// Returns the resulting status. Changing the selection also resets the
    /// assistant conversation.
    pub async fn select_endpoint(&self, id: Option<&str>) -> Option<SessionStatus> {
        let (plan, changed) = {
            let mut state = self.state.write().await;
            let changed = state.selected() != id;
            (state.select(id), changed)
        };
        if changed {
            self.conversation.write().await.reset();
        }
        tracing::info!(endpoint_id = ?id, "Endpoint selected");
        self.run(plan).await;
        self.status().await
    }

    /// Reloads the current selection if it is refreshable.
    pub async fn refresh(&self) -> RefreshOutcome {
        let plan = self.state.write().await.plan_refresh();
        match plan {
            LoadPlan::None => RefreshOutcome::NotApplicable,
            LoadPlan::InFlight => {
                tracing::debug!("Refresh skipped, load already in flight");
                RefreshOutcome::Skipped
            }
            plan @ LoadPlan::Load { .. } => {
                self.run(plan).await;
                RefreshOutcome::Refreshed
            }
        }
    }

    /// Calls [`refresh`](Self::refresh) every `refresh_interval` until the task is aborted.
    pub fn spawn_refresh_loop(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.refresh_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; selection already loaded.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let outcome = self.refresh().await;
                tracing::trace!(?outcome, "Refresh tick");
            }
        })
    }

    /// Adds an endpoint, persists the list and selects the new entry.
    ///
    /// # Errors
    /// `Validation` for a blank name or malformed URL, `Storage` when the list
    /// cannot be saved (the endpoint is then not added).
    pub async fn add_endpoint(&self, request: EndpointRequest) -> SupervisorResult<EndpointConfig> {
        request.validate()?;

        let (endpoint, plan) = {
            let mut state = self.state.write().await;
            let id = next_endpoint_id(state.endpoints());
            let endpoint = request.into_config(id);

            let mut endpoints = state.endpoints().to_vec();
            endpoints.push(endpoint.clone());
            self.repository.save_endpoints(&endpoints).await?;
            state.set_endpoints(endpoints);
            (endpoint.clone(), state.select(Some(&endpoint.id)))
        };

        tracing::info!(endpoint_id = %endpoint.id, name = %endpoint.name, "Endpoint added");
        self.conversation.write().await.reset();
        self.run(plan).await;
        Ok(endpoint)
    }

    /// Replaces the fields of an existing endpoint.
    ///
    /// # Errors
    /// `ConfigurationStale` when `id` is unknown; otherwise as [`add_endpoint`](Self::add_endpoint).
    pub async fn update_endpoint(
        &self,
        id: &str,
        request: EndpointRequest,
    ) -> SupervisorResult<EndpointConfig> {
        request.validate()?;

        let (endpoint, plan) = {
            let mut state = self.state.write().await;
            let position = state
                .endpoints()
                .iter()
                .position(|endpoint| endpoint.id == id)
                .ok_or_else(|| SupervisorError::ConfigurationStale(id.to_string()))?;

            let endpoint = request.into_config(id.to_string());
            let mut endpoints = state.endpoints().to_vec();
            endpoints[position] = endpoint.clone();
            self.repository.save_endpoints(&endpoints).await?;
            (endpoint, state.set_endpoints(endpoints))
        };

        tracing::info!(endpoint_id = %endpoint.id, "Endpoint updated");
        self.run(plan).await;
        Ok(endpoint)
    }

    /// Removes an endpoint. If it was selected, the selection and its data are cleared.
    ///
    /// # Errors
    /// `ConfigurationStale` when `id` is unknown, `Storage` when saving fails.
    pub async fn remove_endpoint(&self, id: &str) -> SupervisorResult<()> {
        let was_selected = {
            let mut state = self.state.write().await;
            if state.endpoint(id).is_none() {
                return Err(SupervisorError::ConfigurationStale(id.to_string()));
            }
            let endpoints: Vec<EndpointConfig> = state
                .endpoints()
                .iter()
                .filter(|endpoint| endpoint.id != id)
                .cloned()
                .collect();
            self.repository.save_endpoints(&endpoints).await?;
            let was_selected = state.selected() == Some(id);
            state.set_endpoints(endpoints);
            was_selected
        };

        if was_selected {
            self.conversation.write().await.reset();
        }
        tracing::info!(endpoint_id = %id, "Endpoint removed");
        Ok(())
    }

    /// Simulated connection test for a configured endpoint.
    ///
    /// # Errors
    /// `ConfigurationStale` when `id` is unknown.
    pub async fn test_endpoint(&self, id: &str) -> SupervisorResult<ConnectionTestResult> {
        let endpoint = self
            .state
            .read()
            .await
            .endpoint(id)
            .cloned()
            .ok_or_else(|| SupervisorError::ConfigurationStale(id.to_string()))?;
        Ok(endpoint_tester::test_endpoint(&endpoint, self.test_delay).await)
    }

    /// Validates, persists and applies new settings; alerts are recomputed.
    ///
    /// # Errors
    /// `Validation` for out-of-range values, `Storage` when saving fails.
    pub async fn update_settings(&self, settings: UserSettings) -> SupervisorResult<()> {
        settings.validate()?;
        let mut state = self.state.write().await;
        self.repository.save_settings(&settings).await?;
        tracing::info!(
            report_interval_hours = settings.report_interval_hours,
            alert_on_containers = settings.alert_on_containers,
            "Settings updated"
        );
        state.set_settings(settings);
        Ok(())
    }

    /// Whether a text generator is configured.
    pub async fn has_api_key(&self) -> bool {
        self.generator.read().await.is_some()
    }

    /// Sets (or, with an empty string or the placeholder, clears) the Gemini API key.
    ///
    /// The key is persisted and the conversation is reset.
    ///
    /// # Errors
    /// `Validation` for a malformed key, `Storage` when saving fails.
    pub async fn set_api_key(&self, key: &str) -> SupervisorResult<()> {
        let key = key.trim();
        let generator: Option<Arc<dyn TextGenerator>> =
            if key.is_empty() || key == API_KEY_PLACEHOLDER {
                self.repository.save_api_key(None).await?;
                None
            } else {
                let api_key = ApiKey::new(key)?;
                let config = match &self.gemini_template {
                    Some(template) => GeminiConfig {
                        api_key,
                        ..template.clone()
                    },
                    None => GeminiConfig::new(api_key),
                };
                let client = GeminiClient::new(config)?;
                self.repository.save_api_key(Some(key)).await?;
                Some(Arc::new(client))
            };

        tracing::info!(configured = generator.is_some(), "API key changed");
        *self.generator.write().await = generator;
        self.conversation.write().await.reset();
        Ok(())
    }

    /// `true` until the guide is dismissed, while endpoints or the API key are missing.
    pub async fn setup_guide_needed(&self) -> bool {
        if self.setup_guide_completed.load(Ordering::Acquire) {
            return false;
        }
        let no_endpoints = self.state.read().await.endpoints().is_empty();
        no_endpoints || !self.has_api_key().await
    }

    /// Marks the setup guide as dismissed for good.
    pub async fn complete_setup_guide(&self) -> SupervisorResult<()> {
        self.repository.mark_setup_guide_completed().await?;
        self.setup_guide_completed.store(true, Ordering::Release);
        Ok(())
    }

    /// Sends a question to the assistant with the current snapshot and alerts as context.
    ///
    /// The question and the reply are appended to the transcript. A reply that
    /// arrives after the conversation was reset is returned but not recorded.
    ///
    /// # Errors
    /// * `Validation` for an empty message
    /// * `ConfigurationMissing { field: "api_key" }` when no generator is configured
    /// * `InvalidCredential` / `ExternalService` from the generator
    ///
    /// Every error except the first also leaves a system message in the transcript.
    pub async fn ask(&self, text: &str) -> SupervisorResult<ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::Field {
                field: "message".to_string(),
                message: "Message cannot be empty".to_string(),
            }
            .into());
        }

        let Some(generator) = self.generator.read().await.clone() else {
            let error = SupervisorError::ConfigurationMissing {
                field: "api_key".to_string(),
            };
            self.conversation
                .write()
                .await
                .transcript
                .push(Sender::System, error.user_message());
            return Err(error);
        };

        // The prompt must be built from the snapshot of the epoch it is sent in;
        // a selection change in between rebuilds it.
        let mut epoch = self.conversation.read().await.session.epoch();
        let (request, prompt) = loop {
            let prompt = {
                let state = self.state.read().await;
                let snapshot = state.snapshot();
                chat_prompt(text, snapshot.as_deref(), state.alerts())
            };
            let mut conversation = self.conversation.write().await;
            match conversation.session.prepare_at(epoch, prompt.clone()) {
                Some(request) => {
                    conversation.transcript.push(Sender::User, text);
                    break (request, prompt);
                }
                None => {
                    tracing::debug!(epoch, "Conversation reset while building prompt, rebuilding");
                    epoch = conversation.session.epoch();
                }
            }
        };

        let result = generator.generate(request).await;

        let mut conversation = self.conversation.write().await;
        match result {
            Ok(reply) => {
                if conversation.session.record(epoch, prompt, reply.clone()) {
                    Ok(conversation.transcript.push(Sender::Ai, reply))
                } else {
                    tracing::debug!(epoch, "Reply belongs to a reset conversation, not recorded");
                    Ok(ChatMessage::new(format!("stale-{}", epoch), Sender::Ai, reply))
                }
            }
            Err(error) => {
                tracing::warn!(error = %error, "Assistant request failed");
                if conversation.session.epoch() == epoch {
                    conversation
                        .transcript
                        .push(Sender::System, error.user_message());
                }
                Err(error)
            }
        }
    }

    pub async fn chat_transcript(&self) -> Vec<ChatMessage> {
        self.conversation.read().await.transcript.messages()
    }

    /// Clears the conversation and leaves a "Chat history cleared." notice.
    pub async fn clear_chat(&self) -> ChatMessage {
        let mut conversation = self.conversation.write().await;
        conversation.session.reset();
        conversation.transcript.clear_with_notice()
    }

    /// AI health summary of the current snapshot.
    ///
    /// # Errors
    /// `ConfigurationMissing` without an API key (`api_key`) or snapshot
    /// (`snapshot`); generator errors otherwise.
    pub async fn summarize(&self) -> SupervisorResult<String> {
        let generator = self.generator.read().await.clone().ok_or_else(|| {
            SupervisorError::ConfigurationMissing {
                field: "api_key".to_string(),
            }
        })?;
        let (snapshot, alerts) = {
            let state = self.state.read().await;
            (state.snapshot(), state.alerts().to_vec())
        };
        let snapshot = snapshot.ok_or_else(|| SupervisorError::ConfigurationMissing {
            field: "snapshot".to_string(),
        })?;
        ReportSummarizer::new(generator)
            .summarize(&snapshot, &alerts)
            .await
    }

    /// Markdown status report of the current snapshot, or `None` without one.
    pub async fn status_report(&self, ai_summary: Option<&str>) -> Option<String> {
        let state = self.state.read().await;
        let snapshot = state.snapshot()?;
        let mut report = StatusReport::new(&snapshot, state.alerts(), state.settings());
        if let Some(summary) = ai_summary {
            report = report.with_summary(summary);
        }
        Some(report.to_string())
    }

    /// Suggested file name for [`status_report`](Self::status_report).
    pub async fn report_file_name(&self) -> Option<String> {
        let state = self.state.read().await;
        let snapshot = state.snapshot()?;
        Some(StatusReport::new(&snapshot, state.alerts(), state.settings()).file_name())
    }

    async fn run(&self, plan: LoadPlan) {
        if let LoadPlan::Load {
            generation,
            endpoint,
        } = plan
        {
            let result = self.source.load(&endpoint).await;
            self.state.write().await.complete_load(generation, result);
        }
    }
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("repository", &self.repository)
            .field("test_delay", &self.test_delay)
            .field("refresh_interval", &self.refresh_interval)
            .finish_non_exhaustive()
    }
}

/// Millisecond timestamp, bumped until unique.
fn next_endpoint_id(existing: &[EndpointConfig]) -> String {
    let mut candidate = Utc::now().timestamp_millis();
    while existing
        .iter()
        .any(|endpoint| endpoint.id == candidate.to_string())
    {
        candidate += 1;
    }
    candidate.to_string()
}
