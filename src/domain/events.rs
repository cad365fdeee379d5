use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Tick,
    QuitRequested,
    InputKey(KeyInput),
    Presence(PresenceEvent),
    ConnectionChanged(ConnectionState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>, ctrl: bool) -> Self {
        Self {
            key: key.into(),
            ctrl,
        }
    }
}

/// Push events delivered by the real-time feed.
///
/// No arrival-order guarantee exists between individual online/offline
/// flips and a full `OnlineUsers` list; consumers resolve conflicts by
/// treating the list as a full resync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceEvent {
    UserOnline(String),
    UserOffline(String),
    OnlineUsers(Vec<String>),
    OnlineCount(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Disconnected => "CONNECTION_DISCONNECTED",
            Self::Connecting => "CONNECTION_CONNECTING",
            Self::Connected => "CONNECTION_CONNECTED",
        }
    }
}

pub fn now_unix_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
