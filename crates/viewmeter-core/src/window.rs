//! Compile-time window sizes and limits.

use std::time::Duration;

/// Stats requests admitted per replenishment cycle when the pool is full.
pub const ADMISSION_LIMIT: u32 = 10;

/// One admission unit is returned to the gate on every tick of this period.
pub const RELEASE_PERIOD: Duration = Duration::from_secs(1);

/// Counters are snapshotted, reset, and persisted on every tick of this period.
pub const DRAIN_PERIOD: Duration = Duration::from_secs(5);

/// How long a drain tick waits for its snapshots before giving up on the rest.
pub const COLLECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Upper bound (exclusive) of the simulated downstream latency.
pub const DOWNSTREAM_MAX_LATENCY: Duration = Duration::from_millis(50);

/// Probability that a view is followed by a click.
pub const CLICK_PROBABILITY: f64 = 0.5;

/// Body of `GET /`.
pub const WELCOME_TEXT: &str = "Welcome to EQ Works 😎";
