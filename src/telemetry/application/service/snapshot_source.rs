//! Where snapshots come from.

use crate::{
    SimulatedDelay, SupervisorError, SupervisorResult,
    core::domain::model::{endpoint_config::EndpointConfig, instance_data::InstanceData},
    telemetry::application::service::snapshot_builder::build_snapshot,
};
use async_trait::async_trait;
use chrono::Utc;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::Mutex;
use std::time::Duration;

/// Produces a snapshot for one endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Loads the current state of `endpoint`.
    ///
    /// # Errors
    /// Any error is reported to the user as a `FETCH_ERROR` status.
    async fn load(&self, endpoint: &EndpointConfig) -> SupervisorResult<InstanceData>;
}

/// Generates random demo data after an artificial delay standing in for a network round-trip.
#[derive(Debug)]
pub struct SyntheticSnapshotSource {
    rng: Mutex<StdRng>,
    delay: SimulatedDelay,
}

impl SyntheticSnapshotSource {
    pub fn new(delay: SimulatedDelay) -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            delay,
        }
    }

    /// Same output sequence for the same seed.
    pub fn seeded(seed: u64, delay: SimulatedDelay) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            delay,
        }
    }

    fn next_delay(&self) -> SupervisorResult<Duration> {
        match self.delay {
            SimulatedDelay::Fixed(duration) => Ok(duration),
            SimulatedDelay::RandomMillis { min, max } if max <= min => {
                Ok(Duration::from_millis(min))
            }
            SimulatedDelay::RandomMillis { min, max } => {
                let mut rng = self.lock_rng()?;
                Ok(Duration::from_millis(rng.gen_range(min..=max)))
            }
        }
    }

    fn lock_rng(&self) -> SupervisorResult<std::sync::MutexGuard<'_, StdRng>> {
        self.rng
            .lock()
            .map_err(|_| SupervisorError::Processing("random source poisoned".to_string()))
    }
}

impl Default for SyntheticSnapshotSource {
    fn default() -> Self {
        Self::new(SimulatedDelay::default())
    }
}

#[async_trait]
impl SnapshotSource for SyntheticSnapshotSource {
    async fn load(&self, endpoint: &EndpointConfig) -> SupervisorResult<InstanceData> {
        let delay = self.next_delay()?;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let mut rng = self.lock_rng()?;
        Ok(build_snapshot(&mut *rng, &endpoint.id, Utc::now()))
    }
}
