//! Periodic admission gate replenishment.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use viewmeter_core::AdmissionGate;

/// Return one unit to `gate` every `period`, whether or not anything was
/// taken. Releases into a full gate are dropped by the gate itself.
pub fn spawn_releaser(gate: Arc<AdmissionGate>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval_at(Instant::now() + period, period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tick.tick().await;
            if gate.release() {
                tracing::debug!(available = gate.available(), "admission unit released");
            }
        }
    })
}
