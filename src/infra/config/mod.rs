mod adapter;
mod app_config;
mod file_config;
mod loader;

pub use adapter::FileConfigAdapter;
pub use app_config::{
    AppConfig, DiscoveryConfig, FeedConfig, LibraryConfig, LogConfig, MembershipConfig,
};
pub use loader::load;
