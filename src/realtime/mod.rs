//! Real-time integration layer: transport contracts and event wiring.

pub mod binder;
pub mod contracts;
pub mod discovery;
pub mod library;
pub mod readiness;
pub mod shared_slot;
pub mod simulated;

/// Returns the realtime module name for smoke checks.
pub fn module_name() -> &'static str {
    "realtime"
}
