//! Persisted user settings driving reports and alert evaluation.

use crate::core::domain::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Thresholds compared against snapshot metrics.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertThresholds {
    pub cpu_usage_percent: f64,
    pub memory_usage_percent: f64,
    pub disk_usage_percent: f64,
    pub low_disk_free_gb: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            cpu_usage_percent: 80.0,
            memory_usage_percent: 85.0,
            disk_usage_percent: 90.0,
            low_disk_free_gb: 20.0,
        }
    }
}

impl AlertThresholds {
    /// Percent thresholds must lie in `0..=100`; the free-space floor must be non-negative.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let percents = [
            ("cpu_usage_percent", self.cpu_usage_percent),
            ("memory_usage_percent", self.memory_usage_percent),
            ("disk_usage_percent", self.disk_usage_percent),
        ];
        for (field, value) in percents {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(ValidationError::Field {
                    field: field.to_string(),
                    message: format!("must be between 0 and 100 (got {})", value),
                });
            }
        }
        if !self.low_disk_free_gb.is_finite() || self.low_disk_free_gb < 0.0 {
            return Err(ValidationError::Field {
                field: "low_disk_free_gb".to_string(),
                message: format!("must be non-negative (got {})", self.low_disk_free_gb),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub report_interval_hours: u32,
    pub alert_thresholds: AlertThresholds,
    /// Also raise CPU/memory alerts for LXC containers.
    #[serde(default)]
    pub alert_on_containers: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            report_interval_hours: 4,
            alert_thresholds: AlertThresholds::default(),
            alert_on_containers: false,
        }
    }
}

impl UserSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.report_interval_hours == 0 {
            return Err(ValidationError::Field {
                field: "report_interval_hours".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        self.alert_thresholds.validate()
    }
}
