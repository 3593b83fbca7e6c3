//! Downstream call made while serving a view.
//!
//! The real service would call out to an ad or content backend here; the
//! default implementation only simulates its latency.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use viewmeter_core::error::{MeterError, Result};
use viewmeter_core::window;

#[async_trait]
pub trait Downstream: Send + Sync {
    /// One call per view. An error turns the response into a 400; the view
    /// counter has already been incremented by then.
    async fn call(&self) -> Result<()>;
}

/// Sleeps a uniformly random duration below `max_latency`, then succeeds
/// unless the configured failure draw hits.
#[derive(Debug, Clone)]
pub struct SimulatedDownstream {
    max_latency: Duration,
    failure_rate: f64,
}

impl Default for SimulatedDownstream {
    fn default() -> Self {
        Self::new(window::DOWNSTREAM_MAX_LATENCY, 0.0)
    }
}

impl SimulatedDownstream {
    pub fn new(max_latency: Duration, failure_rate: f64) -> Self {
        let failure_rate = if failure_rate.is_nan() { 0.0 } else { failure_rate.clamp(0.0, 1.0) };
        Self {
            max_latency,
            failure_rate,
        }
    }
}

#[async_trait]
impl Downstream for SimulatedDownstream {
    async fn call(&self) -> Result<()> {
        let (delay, fail) = {
            let mut rng = rand::thread_rng();
            let max = self.max_latency.as_millis() as u64;
            let delay = if max == 0 { 0 } else { rng.gen_range(0..max) };
            (Duration::from_millis(delay), rng.gen_bool(self.failure_rate))
        };
        tokio::time::sleep(delay).await;
        if fail {
            return Err(MeterError::Downstream("simulated failure".into()));
        }
        Ok(())
    }
}
