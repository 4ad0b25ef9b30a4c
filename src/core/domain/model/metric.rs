//! Utilization gauges used by nodes, guests and storage pools.

use serde::{Deserialize, Serialize};

/// Rounds `value` to `decimals` fractional digits.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// A generic utilization gauge.
///
/// `percentage` is always derived from `used` and `total`; construct through
/// [`Metric::new`] so the two never disagree.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Metric {
    pub used: f64,
    pub total: f64,
    /// Unit label, e.g. `GB`, `TB` or `%`.
    pub unit: String,
    pub percentage: f64,
}

impl Metric {
    pub fn new(used: f64, total: f64, unit: impl Into<String>) -> Self {
        Self {
            used,
            total,
            unit: unit.into(),
            percentage: Self::percentage_of(used, total),
        }
    }

    /// `round(used / total * 100, 1)`, or `0` for an empty gauge.
    pub fn percentage_of(used: f64, total: f64) -> f64 {
        if total > 0.0 {
            round_to(used / total * 100.0, 1)
        } else {
            0.0
        }
    }

    /// Remaining capacity in the gauge's own unit.
    pub fn free(&self) -> f64 {
        self.total - self.used
    }

    /// Returns `true` when the gauge is measured in gigabytes (case-insensitive).
    pub fn is_gigabytes(&self) -> bool {
        self.unit.eq_ignore_ascii_case("GB")
    }
}

/// CPU gauge: a percentage [`Metric`] plus per-core detail.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuMetric {
    #[serde(flatten)]
    pub metric: Metric,
    pub cores: u32,
    /// Overall load in percent; mirrors `metric.used` and `metric.percentage`.
    pub average_load: f64,
    /// One entry per core, in percent.
    pub load_per_core: Vec<f64>,
}

impl CpuMetric {
    /// `average_load` is rounded to one decimal. An empty `load_per_core` is
    /// treated as a single core running at the average.
    pub fn new(average_load: f64, load_per_core: Vec<f64>) -> Self {
        let average_load = round_to(average_load.max(0.0), 1);
        let load_per_core = if load_per_core.is_empty() {
            vec![average_load]
        } else {
            load_per_core
        };
        Self {
            metric: Metric {
                used: average_load,
                total: 100.0,
                unit: "%".to_string(),
                percentage: average_load,
            },
            cores: load_per_core.len() as u32,
            average_load,
            load_per_core,
        }
    }
}
