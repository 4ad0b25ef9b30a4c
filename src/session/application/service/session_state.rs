//! Selection, snapshot and status bookkeeping for the active session.
//!
//! This is a synchronous state machine; the facade drives it under a lock and
//! performs the actual loads in between. Every load is tagged with the
//! generation current when it started. Finishing a load whose generation is no
//! longer current is a no-op, so results never land on the wrong selection.

use crate::{
    DataMode, SupervisorError,
    alerting::application::service::alert_evaluator::evaluate_with_settings,
    core::domain::model::{
        alert::Alert,
        endpoint_config::{EndpointConfig, EndpointReadiness},
        instance_data::InstanceData,
        session_status::{SessionStatus, StatusKind},
        user_settings::UserSettings,
    },
};
use std::sync::Arc;

pub const ENDPOINT_NOT_FOUND_MESSAGE: &str = "Selected instance configuration not found.";
pub const FETCH_ERROR_MESSAGE: &str = "Failed to process data for instance.";

/// What the caller has to do after a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPlan {
    /// Nothing to load; the status already explains the situation.
    None,
    /// Load a snapshot for `endpoint` and report back with `generation`.
    Load {
        generation: u64,
        endpoint: EndpointConfig,
    },
    /// A load for this selection is already running.
    InFlight,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    endpoints: Vec<EndpointConfig>,
    settings: UserSettings,
    mode: DataMode,
    selected: Option<String>,
    snapshot: Option<Arc<InstanceData>>,
    alerts: Vec<Alert>,
    status: Option<SessionStatus>,
    generation: u64,
    loading: bool,
}

impl SessionState {
    pub fn new(endpoints: Vec<EndpointConfig>, settings: UserSettings, mode: DataMode) -> Self {
        Self {
            endpoints,
            settings,
            mode,
            selected: None,
            snapshot: None,
            alerts: Vec::new(),
            status: None,
            generation: 0,
            loading: false,
        }
    }

    pub fn endpoints(&self) -> &[EndpointConfig] {
        &self.endpoints
    }

    pub fn endpoint(&self, id: &str) -> Option<&EndpointConfig> {
        self.endpoints.iter().find(|endpoint| endpoint.id == id)
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn snapshot(&self) -> Option<Arc<InstanceData>> {
        self.snapshot.clone()
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn status(&self) -> Option<&SessionStatus> {
        self.status.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Switches the selection. Prior snapshot, alerts and status are cleared
    /// before anything else happens.
    pub fn select(&mut self, id: Option<&str>) -> LoadPlan {
        self.selected = id.map(str::to_string);
        self.clear_view();
        self.plan_load()
    }

    /// Plans a periodic reload of the current selection.
    ///
    /// The current snapshot stays visible until the new one arrives.
    pub fn plan_refresh(&mut self) -> LoadPlan {
        if self.selected.is_none() {
            return LoadPlan::None;
        }
        if self.status.as_ref().is_some_and(|s| s.kind.blocks_refresh()) {
            return LoadPlan::None;
        }
        if self.loading {
            return LoadPlan::InFlight;
        }
        self.plan_load()
    }

    /// Applies a finished load. Returns `false` when the result was stale and dropped.
    pub fn complete_load(
        &mut self,
        generation: u64,
        result: Result<InstanceData, SupervisorError>,
    ) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "Dropping result of an outdated load"
            );
            return false;
        }
        self.loading = false;

        match result {
            Ok(data) => {
                let name = self
                    .selected
                    .as_deref()
                    .and_then(|id| self.endpoint(id))
                    .map(|endpoint| endpoint.name.clone())
                    .unwrap_or_default();
                self.alerts = evaluate_with_settings(&data, &self.settings);
                self.snapshot = Some(Arc::new(data));
                self.status = Some(SessionStatus::new(
                    StatusKind::Info,
                    format!(
                        "Showing generated demo data for instance \"{}\"; it does not reflect a real server.",
                        name
                    ),
                ));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Snapshot load failed");
                self.snapshot = None;
                self.alerts.clear();
                self.status = Some(SessionStatus::new(StatusKind::FetchError, FETCH_ERROR_MESSAGE));
            }
        }
        true
    }

    /// Replaces the settings and recomputes alerts for the current snapshot.
    pub fn set_settings(&mut self, settings: UserSettings) {
        self.settings = settings;
        self.alerts = match &self.snapshot {
            Some(data) => evaluate_with_settings(data, &self.settings),
            None => Vec::new(),
        };
    }

    /// Replaces the endpoint list.
    ///
    /// If the selected endpoint was removed, the selection is cleared. If it was
    /// edited, it is re-selected so its status reflects the new fields.
    pub fn set_endpoints(&mut self, endpoints: Vec<EndpointConfig>) -> LoadPlan {
        let previous = self
            .selected
            .as_deref()
            .and_then(|id| self.endpoint(id))
            .cloned();
        self.endpoints = endpoints;

        let Some(previous) = previous else {
            return LoadPlan::None;
        };
        match self.endpoint(&previous.id).cloned() {
            None => {
                self.selected = None;
                self.clear_view();
                LoadPlan::None
            }
            Some(current) if current != previous => self.select(Some(&current.id)),
            Some(_) => LoadPlan::None,
        }
    }

    fn clear_view(&mut self) {
        self.generation += 1;
        self.loading = false;
        self.snapshot = None;
        self.alerts.clear();
        self.status = None;
    }

    fn plan_load(&mut self) -> LoadPlan {
        let Some(id) = self.selected.clone() else {
            return LoadPlan::None;
        };
        let Some(endpoint) = self.endpoint(&id).cloned() else {
            self.status = Some(SessionStatus::new(
                StatusKind::ConfigError,
                ENDPOINT_NOT_FOUND_MESSAGE,
            ));
            return LoadPlan::None;
        };

        match (endpoint.readiness(), self.mode) {
            (EndpointReadiness::Complete, _) => {
                self.status = Some(SessionStatus::new(
                    StatusKind::RealDataInfo,
                    format!(
                        "Displaying real-time data from {} ({}) requires a backend proxy. \
                         Web browsers and sandboxed frontends cannot call a Proxmox API on another \
                         origin directly, and this application never fabricates data for a fully \
                         configured instance. To see live data, a backend service is needed to fetch \
                         data from Proxmox and relay it to this dashboard.",
                        endpoint.name, endpoint.api_url
                    ),
                ));
                LoadPlan::None
            }
            (EndpointReadiness::Incomplete { .. }, DataMode::Placeholder) => {
                self.status = Some(SessionStatus::new(
                    StatusKind::ConfigIncomplete,
                    format!(
                        "Configuration for instance \"{}\" is incomplete. Please provide API URL and Token in the 'Instances' tab.",
                        endpoint.name
                    ),
                ));
                LoadPlan::None
            }
            (EndpointReadiness::Incomplete { .. }, DataMode::Mock) => {
                self.generation += 1;
                self.loading = true;
                LoadPlan::Load {
                    generation: self.generation,
                    endpoint,
                }
            }
        }
    }
}
