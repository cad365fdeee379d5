use std::{
    collections::HashSet,
    sync::{mpsc, Arc},
};

use crate::{
    domain::events::{ConnectionState, PresenceEvent},
    realtime::contracts::{ConnectionId, RealtimeConnection},
};

const BINDER_ATTACHED: &str = "REALTIME_BINDER_ATTACHED";
const BINDER_ALREADY_ATTACHED: &str = "REALTIME_BINDER_ALREADY_ATTACHED";
const BINDER_COUNT_REQUEST_FAILED: &str = "REALTIME_BINDER_COUNT_REQUEST_FAILED";

/// Attaches presence handlers to a discovered connection at most once.
///
/// The registration set is keyed by connection identity and owned here,
/// never stashed on the shared handle.
#[derive(Debug, Default)]
pub struct PresenceBinder {
    bound: HashSet<ConnectionId>,
}

impl PresenceBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to the connection's presence feed and returns the event
    /// receiver. A connection that is already bound yields `None`.
    ///
    /// If the connection is currently connected, the current online count
    /// is requested proactively; a failed request is logged and dropped.
    pub fn bind(
        &mut self,
        connection: &Arc<dyn RealtimeConnection>,
    ) -> Option<mpsc::Receiver<PresenceEvent>> {
        if !self.bound.insert(connection.id()) {
            tracing::debug!(
                code = BINDER_ALREADY_ATTACHED,
                connection_id = connection.id(),
                "presence handlers already attached to this connection"
            );
            return None;
        }

        let events = connection.subscribe();

        if connection.state() == ConnectionState::Connected {
            if let Err(error) = connection.request_online_count() {
                tracing::warn!(
                    code = BINDER_COUNT_REQUEST_FAILED,
                    connection_id = connection.id(),
                    error = %error,
                    "online count request failed, continuing without it"
                );
            }
        }

        tracing::info!(
            code = BINDER_ATTACHED,
            connection_id = connection.id(),
            "presence handlers attached"
        );

        Some(events)
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_bound(&self, connection_id: ConnectionId) -> bool {
        self.bound.contains(&connection_id)
    }
}
