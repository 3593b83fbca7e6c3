//! Per-category view/click counters with atomic snapshot-and-reset.
//!
//! Each category has its own mutex around the `{views, clicks}` pair, so
//! contention is sharded by category and a reset can never split an increment:
//! every increment lands either in the snapshot being taken or in the next
//! window, never both and never neither.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local};

use crate::category::Category;

/// Timestamp layout used in persisted records.
pub const RECORD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Counter {
    views: u64,
    clicks: u64,
}

/// Counter values for one category at the moment of a drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub category: Category,
    pub views: u64,
    pub clicks: u64,
    pub timestamp: DateTime<Local>,
}

impl CounterSnapshot {
    /// Render as one log line (no trailing newline):
    /// `<category>:<YYYY-MM-DD HH:MM:SS> {views: <n>, clicks: <n>}`.
    pub fn to_record(&self) -> String {
        format!(
            "{}:{} {{views: {}, clicks: {}}}",
            self.category,
            self.timestamp.format(RECORD_TIME_FORMAT),
            self.views,
            self.clicks
        )
    }
}

/// Fixed set of counters, one per [`Category`].
/// Construct once at startup, then share via Arc.
#[derive(Debug, Default)]
pub struct CounterSet {
    slots: [Mutex<Counter>; Category::COUNT],
}

impl CounterSet {
    pub fn new() -> Self {
        Self::default()
    }

    // Counter is two integers and every critical section leaves it valid, so a
    // poisoned lock is still safe to use.
    fn slot(&self, category: Category) -> MutexGuard<'_, Counter> {
        self.slots[category.index()]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record_view(&self, category: Category) {
        let mut c = self.slot(category);
        c.views = c.views.saturating_add(1);
    }

    pub fn record_click(&self, category: Category) {
        let mut c = self.slot(category);
        c.clicks = c.clicks.saturating_add(1);
    }

    /// Read `(views, clicks)` and zero both in one critical section.
    pub fn snapshot_and_reset(&self, category: Category) -> CounterSnapshot {
        let taken = std::mem::take(&mut *self.slot(category));
        CounterSnapshot {
            category,
            views: taken.views,
            clicks: taken.clicks,
            timestamp: Local::now(),
        }
    }

    /// Snapshot every category in [`Category::ALL`] order. Categories are
    /// reset one at a time, not as a group.
    pub fn snapshot_and_reset_all(&self) -> Vec<CounterSnapshot> {
        Category::ALL
            .iter()
            .map(|&c| self.snapshot_and_reset(c))
            .collect()
    }

    /// Current `(views, clicks)` without resetting.
    pub fn peek(&self, category: Category) -> (u64, u64) {
        let c = self.slot(category);
        (c.views, c.clicks)
    }
}
