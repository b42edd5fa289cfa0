//! Workspace umbrella crate.
//!
//! Re-exports the service façade so host applications can depend on
//! `ticktack-workspace` and toggle the desktop adapters with one feature flag
//! instead of wiring each crate individually.

pub use core_service::*;
