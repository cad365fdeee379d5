use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub library: LibraryConfig,
    pub discovery: DiscoveryConfig,
    pub membership: MembershipConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryConfig {
    /// Primary CDN location of the realtime client artifact.
    pub primary_url: String,
    /// Locally shipped fallback artifact.
    pub fallback_path: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            primary_url: "https://cdn.example.com/realtime/realtime-client.bin".to_owned(),
            fallback_path: "./realtime-client.bin".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoveryConfig {
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            max_attempts: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MembershipConfig {
    /// Facade polling has no attempt ceiling; only the interval is tunable.
    pub poll_interval_ms: u64,
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedConfig {
    /// Pace of the simulated presence feed.
    pub step_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { step_ms: 2_000 }
    }
}
