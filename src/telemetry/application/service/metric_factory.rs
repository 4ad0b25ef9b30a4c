//! Randomized utilization samples.
//!
//! Every function takes the random source explicitly so callers can seed it.

use crate::core::domain::model::{
    metric::{CpuMetric, Metric, round_to},
    status::Status,
};
use rand::Rng;

/// Uniform sample in `[min, max]`, rounded to `decimals` places.
///
/// A degenerate range (`max <= min`) yields `min`.
pub fn sample<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64, decimals: u32) -> f64 {
    if max <= min {
        return round_to(min, decimals);
    }
    round_to(rng.gen_range(min..=max), decimals)
}

/// Uniform integer in `[min, max]`.
pub fn sample_int<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..=max)
}

/// Picks one entry of a non-empty fixed list.
pub fn pick<R: Rng + ?Sized, T: Copy, const N: usize>(rng: &mut R, options: [T; N]) -> T {
    options[rng.gen_range(0..N)]
}

/// `Metric` with the percentage derived from `used` and `total`.
pub fn create_metric(used: f64, total: f64, unit: &str) -> Metric {
    Metric::new(used, total, unit)
}

/// CPU gauge with an average load in `[5, 70]` and per-core jitter in `[1, average + 10]`.
pub fn create_cpu_metric<R: Rng + ?Sized>(rng: &mut R, cores: u32) -> CpuMetric {
    let average = sample(rng, 5.0, 70.0, 1);
    let per_core = (0..cores.max(1))
        .map(|_| sample(rng, 1.0, average + 10.0, 1))
        .collect();
    CpuMetric::new(average, per_core)
}

/// 80% Running, 10% Stopped, 5% Warning, 5% Error.
pub fn random_status<R: Rng + ?Sized>(rng: &mut R) -> Status {
    let roll: f64 = rng.gen_range(0.0..1.0);
    if roll < 0.8 {
        Status::Running
    } else if roll < 0.9 {
        Status::Stopped
    } else if roll < 0.95 {
        Status::Warning
    } else {
        Status::Error
    }
}

/// `"D days, H hours"`.
pub fn uptime<R: Rng + ?Sized>(rng: &mut R, max_days: u32) -> String {
    format!(
        "{} days, {} hours",
        sample_int(rng, 0, max_days),
        sample_int(rng, 0, 23)
    )
}
