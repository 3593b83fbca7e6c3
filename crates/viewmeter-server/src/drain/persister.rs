//! Append-only snapshot log.
//!
//! Producers never touch the file: each drain tick hands its snapshots over a
//! channel and [`Persister::collect`] writes them through [`Persister::append`],
//! which holds the writer lock for the duration of one record. Every append is
//! bounded by the tick's collection deadline, so a stalled log target costs a
//! tick its records but never holds the lock past the window.
//!
//! The file is opened lazily and kept open. An I/O error or a cancelled write
//! drops the handle so the next append reopens it, and marks the log torn: the
//! next record starts with a newline so it never joins a partial line.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, Mutex};
use tokio::time::Instant;

use viewmeter_core::error::{MeterError, Result};
use viewmeter_core::CounterSnapshot;

use crate::obs::MeterMetrics;

/// Outcome of one drain tick's collection window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Snapshots the tick expected (one per category).
    pub expected: usize,
    /// Snapshots that arrived before the deadline.
    pub received: usize,
    /// Snapshots written to the log.
    pub persisted: usize,
    /// Snapshots that arrived but could not be written before the deadline.
    pub failed: usize,
}

impl DrainReport {
    /// Snapshots abandoned because the window closed first.
    pub fn dropped(&self) -> usize {
        self.expected.saturating_sub(self.received)
    }
}

pub struct Persister {
    path: PathBuf,
    collect_timeout: Duration,
    log: Mutex<LogHandle>,
    metrics: Arc<MeterMetrics>,
}

#[derive(Default)]
struct LogHandle {
    file: Option<File>,
    // last write may have left a partial line
    torn: bool,
}

impl Persister {
    pub fn new(
        path: impl Into<PathBuf>,
        collect_timeout: Duration,
        metrics: Arc<MeterMetrics>,
    ) -> Self {
        Self {
            path: path.into(),
            collect_timeout,
            log: Mutex::new(LogHandle::default()),
            metrics,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn collect_timeout(&self) -> Duration {
        self.collect_timeout
    }

    /// Write one record line. Serialized against every other append.
    ///
    /// Cancel-safe: dropping the future mid-write discards the handle and
    /// leaves the log marked torn.
    pub async fn append(&self, snapshot: &CounterSnapshot) -> Result<()> {
        let mut log = self.log.lock().await;
        let mut file = match log.file.take() {
            Some(file) => file,
            None => OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await
                .map_err(|e| {
                    MeterError::Persist(format!("open {} failed: {e}", self.path.display()))
                })?,
        };

        let mut record = String::new();
        if log.torn {
            record.push('\n');
        }
        record.push_str(&snapshot.to_record());
        record.push('\n');

        log.torn = true;
        write_line(&mut file, record.as_bytes()).await?;
        log.torn = false;
        log.file = Some(file);
        Ok(())
    }

    /// Receive up to `expected` snapshots, starting the window at `started`,
    /// and append each as it arrives. Whatever has not arrived when the window
    /// closes is dropped for this tick, and an append still running at the
    /// deadline is abandoned and counted as failed.
    pub async fn collect(
        &self,
        mut rx: mpsc::Receiver<CounterSnapshot>,
        expected: usize,
        started: Instant,
    ) -> DrainReport {
        let deadline = started + self.collect_timeout;
        let timeout_ms = self.collect_timeout.as_millis() as u64;
        let mut report = DrainReport {
            expected,
            ..DrainReport::default()
        };

        while report.received < expected {
            let snapshot = match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(Some(s)) => s,
                // every producer finished or bailed out
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        expected,
                        received = report.received,
                        timeout_ms,
                        "drain collection window closed; dropping late snapshots"
                    );
                    break;
                }
            };
            report.received += 1;

            let category = snapshot.category.as_str();
            match tokio::time::timeout_at(deadline, self.append(&snapshot)).await {
                Ok(Ok(())) => {
                    report.persisted += 1;
                    self.metrics.persisted_records.inc(&[("category", category)]);
                }
                Ok(Err(e)) => {
                    report.failed += 1;
                    self.metrics.persist_failures.inc(&[("category", category)]);
                    tracing::error!(
                        category,
                        views = snapshot.views,
                        clicks = snapshot.clicks,
                        error = %e,
                        "failed to persist snapshot"
                    );
                }
                Err(_) => {
                    report.failed += 1;
                    self.metrics.persist_failures.inc(&[("category", category)]);
                    tracing::warn!(
                        category,
                        views = snapshot.views,
                        clicks = snapshot.clicks,
                        timeout_ms,
                        path = %self.path.display(),
                        "log append did not finish within the drain window; snapshot dropped"
                    );
                }
            }
        }

        if report.dropped() > 0 {
            self.metrics.dropped_snapshots.add(&[], report.dropped() as u64);
        }
        report
    }
}

async fn write_line(file: &mut File, bytes: &[u8]) -> Result<()> {
    file.write_all(bytes)
        .await
        .map_err(|e| MeterError::Persist(format!("write failed: {e}")))?;
    file.flush()
        .await
        .map_err(|e| MeterError::Persist(format!("flush failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Local;
    use viewmeter_core::Category;

    fn snapshot(views: u64) -> CounterSnapshot {
        CounterSnapshot {
            category: Category::Sports,
            views,
            clicks: 0,
            timestamp: Local::now(),
        }
    }

    #[tokio::test]
    async fn torn_log_gets_a_fresh_line_before_the_next_record() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("store.txt");
        std::fs::write(&path, "business:2024-01-01 00:00:00 {views: 4").unwrap();

        let persister = Persister::new(&path, Duration::from_secs(1), Arc::default());
        persister.log.lock().await.torn = true;
        persister.append(&snapshot(2)).await.unwrap();
        persister.append(&snapshot(3)).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3, "{text:?}");
        assert!(lines[1].starts_with("sports:") && lines[1].ends_with("{views: 2, clicks: 0}"));
        assert!(lines[2].ends_with("{views: 3, clicks: 0}"));
        assert!(!persister.log.lock().await.torn);
    }

    #[tokio::test]
    async fn cancelled_append_marks_the_log_torn() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("store.txt");
        let persister = Persister::new(&path, Duration::from_secs(1), Arc::default());
        persister.append(&snapshot(1)).await.unwrap();

        // state left behind by an append dropped between `take` and `write_line`
        {
            let mut log = persister.log.lock().await;
            log.file = None;
            log.torn = true;
        }
        persister.append(&snapshot(5)).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("clicks: 0}\n\nsports:"), "{text:?}");
    }
}
