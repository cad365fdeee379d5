//! Domain layer: core entities and business rules.

pub mod events;
pub mod page;
pub mod presence;
pub mod shell_state;
pub mod tag_filter;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
