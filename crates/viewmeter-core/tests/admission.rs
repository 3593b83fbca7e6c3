//! AdmissionGate capacity tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

use viewmeter_core::{window, AdmissionGate};

#[test]
fn admits_exactly_limit_then_one_after_release() {
    let gate = AdmissionGate::new(window::ADMISSION_LIMIT);
    let admitted = (0..=window::ADMISSION_LIMIT)
        .filter(|_| gate.try_admit())
        .count();
    assert_eq!(admitted, window::ADMISSION_LIMIT as usize);
    assert!(!gate.try_admit());

    assert!(gate.release());
    assert!(gate.try_admit());
    assert!(!gate.try_admit());
}

#[test]
fn release_into_full_pool_is_dropped() {
    let gate = AdmissionGate::new(3);
    assert!(!gate.release());
    assert_eq!(gate.available(), 3);

    assert!(gate.try_admit());
    assert!(gate.release());
    assert!(!gate.release());
    assert_eq!(gate.available(), gate.limit());
}

#[test]
fn zero_limit_is_raised_to_one() {
    let gate = AdmissionGate::new(0);
    assert_eq!(gate.limit(), 1);
    assert!(gate.try_admit());
    assert!(!gate.try_admit());
}

#[test]
fn concurrent_admits_never_exceed_limit() {
    let gate = AdmissionGate::new(10);
    let admitted = AtomicU32::new(0);

    thread::scope(|s| {
        for _ in 0..16 {
            s.spawn(|| {
                for _ in 0..100 {
                    if gate.try_admit() {
                        admitted.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
        s.spawn(|| {
            for _ in 0..5 {
                gate.release();
                thread::yield_now();
            }
        });
    });

    let admitted = admitted.load(Ordering::Relaxed);
    assert!((10..=15).contains(&admitted), "admitted {admitted}");
    assert!(gate.available() <= gate.limit());
}
