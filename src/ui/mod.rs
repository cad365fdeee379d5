//! UI layer: rendering and interaction entry points (CLI/TUI).

mod event_source;
pub mod shell;
mod styles;
mod terminal;
mod view;

pub(crate) use event_source::{
    ChannelConnectionStateSource, CompositeEventSource, CrosstermEventSource,
    DiscoveredPresenceSource,
};

/// Returns the UI module name for smoke checks.
pub fn module_name() -> &'static str {
    "ui"
}
