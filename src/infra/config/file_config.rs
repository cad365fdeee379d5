use serde::Deserialize;

use crate::infra::config::{
    AppConfig, DiscoveryConfig, FeedConfig, LibraryConfig, LogConfig, MembershipConfig,
};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub library: Option<FileLibraryConfig>,
    pub discovery: Option<FileDiscoveryConfig>,
    pub membership: Option<FileMembershipConfig>,
    pub feed: Option<FileFeedConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(library) = self.library {
            library.merge_into(&mut config.library);
        }

        if let Some(discovery) = self.discovery {
            discovery.merge_into(&mut config.discovery);
        }

        if let Some(membership) = self.membership {
            membership.merge_into(&mut config.membership);
        }

        if let Some(feed) = self.feed {
            feed.merge_into(&mut config.feed);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLibraryConfig {
    pub primary_url: Option<String>,
    pub fallback_path: Option<String>,
}

impl FileLibraryConfig {
    fn merge_into(self, config: &mut LibraryConfig) {
        if let Some(primary_url) = self.primary_url {
            config.primary_url = primary_url;
        }

        if let Some(fallback_path) = self.fallback_path {
            config.fallback_path = fallback_path;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileDiscoveryConfig {
    pub poll_interval_ms: Option<u64>,
    pub max_attempts: Option<u32>,
}

impl FileDiscoveryConfig {
    fn merge_into(self, config: &mut DiscoveryConfig) {
        if let Some(poll_interval_ms) = self.poll_interval_ms {
            config.poll_interval_ms = poll_interval_ms;
        }

        if let Some(max_attempts) = self.max_attempts {
            config.max_attempts = max_attempts;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileMembershipConfig {
    pub poll_interval_ms: Option<u64>,
}

impl FileMembershipConfig {
    fn merge_into(self, config: &mut MembershipConfig) {
        if let Some(poll_interval_ms) = self.poll_interval_ms {
            config.poll_interval_ms = poll_interval_ms;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileFeedConfig {
    pub step_ms: Option<u64>,
}

impl FileFeedConfig {
    fn merge_into(self, config: &mut FeedConfig) {
        if let Some(step_ms) = self.step_ms {
            config.step_ms = step_ms;
        }
    }
}
