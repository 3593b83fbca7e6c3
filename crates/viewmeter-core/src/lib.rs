//! viewmeter core: categories, per-category counters, and the admission gate.
//!
//! This crate owns all state that request handlers and background tasks share.
//! It carries no transport or async runtime dependencies; the server crate
//! wires these primitives into HTTP routes and periodic tasks.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Lock poisoning is
//! recovered (counter state is plain integers and always consistent), and
//! every fallible path surfaces as `MeterError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod admission;
pub mod category;
pub mod counters;
pub mod error;
pub mod window;

pub use admission::AdmissionGate;
pub use category::Category;
pub use counters::{CounterSet, CounterSnapshot};
/// Shared result type.
pub use error::{MeterError, Result};
