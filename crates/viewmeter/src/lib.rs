//! Top-level facade crate for viewmeter.
//!
//! Re-exports core types and the server library so users can depend on a single crate.

pub mod core {
    pub use viewmeter_core::*;
}

pub mod server {
    pub use viewmeter_server::*;
}
