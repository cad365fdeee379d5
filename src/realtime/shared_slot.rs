use std::sync::{Arc, Mutex};

use crate::realtime::contracts::{ConnectionProvider, RealtimeConnection};

const SLOT_PUBLISHED: &str = "REALTIME_SLOT_PUBLISHED";

/// In-process home of the shared connection handle. The integration that
/// owns the connection publishes it here; consumers only read.
#[derive(Clone, Default)]
pub struct SharedConnectionSlot {
    inner: Arc<Mutex<Option<Arc<dyn RealtimeConnection>>>>,
}

impl SharedConnectionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, connection: Arc<dyn RealtimeConnection>) {
        if let Ok(mut slot) = self.inner.lock() {
            tracing::debug!(
                code = SLOT_PUBLISHED,
                connection_id = connection.id(),
                "shared connection handle published"
            );
            *slot = Some(connection);
        }
    }
}

impl ConnectionProvider for SharedConnectionSlot {
    fn current(&self) -> Option<Arc<dyn RealtimeConnection>> {
        self.inner.lock().ok().and_then(|slot| slot.clone())
    }
}
