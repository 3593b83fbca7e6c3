use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use viewmeter_core::{Category, CounterSet};

use super::persister::{DrainReport, Persister};
use crate::obs::MeterMetrics;

/// Drives one drain per `period`. Ticks never wait for the previous tick's
/// persistence; overlapping ticks are safe because each category's
/// snapshot-and-reset is a single critical section.
pub struct DrainScheduler {
    counters: Arc<CounterSet>,
    persister: Arc<Persister>,
    metrics: Arc<MeterMetrics>,
    period: Duration,
}

impl DrainScheduler {
    pub fn new(
        counters: Arc<CounterSet>,
        persister: Arc<Persister>,
        metrics: Arc<MeterMetrics>,
        period: Duration,
    ) -> Self {
        Self {
            counters,
            persister,
            metrics,
            period,
        }
    }

    /// Run one full drain: one producer task per category, fanned in to the
    /// persister under its collection window.
    pub async fn drain_and_persist(&self) -> DrainReport {
        let started = Instant::now();
        self.metrics.drain_ticks.inc(&[]);
        self.metrics.drains_in_flight.inc(&[]);

        let (tx, rx) = mpsc::channel(Category::COUNT);
        for category in Category::ALL {
            let tx = tx.clone();
            let counters = Arc::clone(&self.counters);
            tokio::spawn(async move {
                let snapshot = counters.snapshot_and_reset(category);
                if tx.send(snapshot).await.is_err() {
                    tracing::debug!(%category, "drain collector closed; snapshot dropped");
                }
            });
        }
        drop(tx);

        let report = self.persister.collect(rx, Category::COUNT, started).await;
        self.metrics.drains_in_flight.dec(&[]);

        tracing::info!(
            expected = report.expected,
            received = report.received,
            persisted = report.persisted,
            failed = report.failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "drain tick complete"
        );
        report
    }

    /// Tick forever, spawning a drain per tick. The first drain fires one
    /// period after start.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut tick = tokio::time::interval_at(Instant::now() + self.period, self.period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tick.tick().await;
                let this = Arc::clone(&self);
                tokio::spawn(async move {
                    this.drain_and_persist().await;
                });
            }
        })
    }
}
