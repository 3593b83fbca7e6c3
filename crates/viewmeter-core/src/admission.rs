//! Bounded admission gate for the stats endpoint.
//!
//! The pool holds `available` units in `[0, limit]`. Request handlers take a
//! unit with [`AdmissionGate::try_admit`]; only the periodic releaser puts
//! units back with [`AdmissionGate::release`]. Both are single CAS loops on one
//! atomic, so neither ever blocks.

use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug)]
pub struct AdmissionGate {
    limit: u32,
    available: AtomicU32,
}

impl AdmissionGate {
    /// New gate starting full. A zero limit is raised to 1.
    pub fn new(limit: u32) -> Self {
        let limit = limit.max(1);
        Self {
            limit,
            available: AtomicU32::new(limit),
        }
    }

    /// Take one unit if any is available. Never blocks.
    pub fn try_admit(&self) -> bool {
        self.available
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Return one unit. A release into a full pool is dropped; returns whether
    /// a unit was actually returned.
    pub fn release(&self) -> bool {
        let limit = self.limit;
        let released = self
            .available
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < limit).then_some(n + 1)
            })
            .is_ok();
        if !released {
            tracing::trace!(limit, "admission gate already full; release dropped");
        }
        released
    }

    pub fn available(&self) -> u32 {
        self.available.load(Ordering::Acquire)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}
