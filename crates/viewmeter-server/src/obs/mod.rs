//! Lightweight in-process metrics.
//!
//! Request outcomes, drain progress, and persistence health are stored as
//! atomics and rendered by the `/metrics` handler in Prometheus text format.

pub mod metrics;

pub use metrics::MeterMetrics;
