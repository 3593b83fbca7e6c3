//! viewmeter server library entry.
//!
//! Wires the core counters and admission gate into HTTP routes, the periodic
//! drain/persist pipeline, and the gate releaser. Consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod downstream;
pub mod drain;
pub mod obs;
pub mod ops;
pub mod replenish;
pub mod router;
pub mod server;
