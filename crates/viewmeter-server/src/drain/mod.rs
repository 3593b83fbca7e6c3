//! Periodic drain: snapshot every counter, reset it, and persist the result.

pub mod persister;
pub mod scheduler;

pub use persister::{DrainReport, Persister};
pub use scheduler::DrainScheduler;
