//! Shared application state for the viewmeter server.
//!
//! Owns the counter set, admission gate, persister, and drain scheduler. Every
//! handler and background task reaches core state through these handles; there
//! are no process-wide singletons.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use viewmeter_core::{window, AdmissionGate, CounterSet};

use crate::config::MeterConfig;
use crate::downstream::{Downstream, SimulatedDownstream};
use crate::drain::{DrainReport, DrainScheduler, Persister};
use crate::obs::MeterMetrics;
use crate::replenish;

#[derive(Clone)]
pub struct AppState {
    counters: Arc<CounterSet>,
    gate: Arc<AdmissionGate>,
    drain: Arc<DrainScheduler>,
    downstream: Arc<dyn Downstream>,
    persister: Arc<Persister>,
    metrics: Arc<MeterMetrics>,
}

/// Handles of the two periodic tasks started by [`AppState::spawn_background`].
pub struct BackgroundTasks {
    pub drain: JoinHandle<()>,
    pub releaser: JoinHandle<()>,
}

impl BackgroundTasks {
    pub fn abort(&self) {
        self.drain.abort();
        self.releaser.abort();
    }
}

impl AppState {
    /// Build state with the compile-time windows and the simulated downstream.
    pub fn new(cfg: MeterConfig) -> Self {
        Self::with_collect_timeout(cfg, window::COLLECT_TIMEOUT)
    }

    /// Same as [`AppState::new`] with a different persistence collection window.
    pub fn with_collect_timeout(cfg: MeterConfig, collect_timeout: Duration) -> Self {
        let metrics = Arc::new(MeterMetrics::default());
        let counters = Arc::new(CounterSet::new());
        let gate = Arc::new(AdmissionGate::new(window::ADMISSION_LIMIT));
        let persister = Arc::new(Persister::new(
            cfg.store.path,
            collect_timeout,
            Arc::clone(&metrics),
        ));
        let drain = Arc::new(DrainScheduler::new(
            Arc::clone(&counters),
            Arc::clone(&persister),
            Arc::clone(&metrics),
            window::DRAIN_PERIOD,
        ));

        Self {
            counters,
            gate,
            drain,
            downstream: Arc::new(SimulatedDownstream::default()),
            persister,
            metrics,
        }
    }

    /// Replace the downstream used by `/view/`.
    pub fn with_downstream(mut self, downstream: Arc<dyn Downstream>) -> Self {
        self.downstream = downstream;
        self
    }

    /// Start the drain loop and the admission releaser. Both run until aborted
    /// or the runtime shuts down.
    pub fn spawn_background(&self) -> BackgroundTasks {
        BackgroundTasks {
            drain: Arc::clone(&self.drain).spawn(),
            releaser: replenish::spawn_releaser(self.gate(), window::RELEASE_PERIOD),
        }
    }

    /// Run one drain tick to completion.
    pub async fn drain_and_persist(&self) -> DrainReport {
        self.drain.drain_and_persist().await
    }

    pub fn persister(&self) -> Arc<Persister> {
        Arc::clone(&self.persister)
    }

    pub fn counters(&self) -> Arc<CounterSet> {
        Arc::clone(&self.counters)
    }

    pub fn gate(&self) -> Arc<AdmissionGate> {
        Arc::clone(&self.gate)
    }

    pub fn downstream(&self) -> Arc<dyn Downstream> {
        Arc::clone(&self.downstream)
    }

    pub fn metrics(&self) -> Arc<MeterMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Point-in-time gauges appended to `/metrics`.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("viewmeter_gate_available", u64::from(self.gate.available())),
            ("viewmeter_gate_limit", u64::from(self.gate.limit())),
        ]
    }
}
