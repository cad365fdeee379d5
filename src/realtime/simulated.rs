use std::{
    collections::BTreeSet,
    sync::{
        mpsc::{self, Sender},
        Arc, Mutex,
    },
    time::Duration,
};

use tokio::{runtime::Runtime, sync::watch, time::sleep};

use crate::{
    domain::events::{ConnectionState, PresenceEvent},
    realtime::{
        contracts::{ConnectionId, InvokeError, RealtimeConnection},
        shared_slot::SharedConnectionSlot,
    },
};

const SIMULATED_FEED_STARTED: &str = "REALTIME_SIMULATED_FEED_STARTED";
const SIMULATED_FEED_STOPPED: &str = "REALTIME_SIMULATED_FEED_STOPPED";
const SIMULATED_FEED_STOP_SIGNALED: &str = "REALTIME_SIMULATED_FEED_STOP_SIGNALED";

/// In-process connection used when no live backend is composed in. Keeps
/// the set of currently online users so count requests answer from the
/// same source the scripted feed mutates.
pub struct SimulatedConnection {
    id: ConnectionId,
    inner: Mutex<SimulatedState>,
}

struct SimulatedState {
    state: ConnectionState,
    online: BTreeSet<String>,
    subscribers: Vec<mpsc::Sender<PresenceEvent>>,
}

impl SimulatedConnection {
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            inner: Mutex::new(SimulatedState {
                state: ConnectionState::Disconnected,
                online: BTreeSet::new(),
                subscribers: Vec::new(),
            }),
        }
    }

    pub fn set_state(&self, state: ConnectionState) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.state = state;
        }
    }

    pub fn emit(&self, event: PresenceEvent) {
        if let Ok(mut inner) = self.inner.lock() {
            match &event {
                PresenceEvent::UserOnline(user_id) => {
                    inner.online.insert(user_id.clone());
                }
                PresenceEvent::UserOffline(user_id) => {
                    inner.online.remove(user_id);
                }
                PresenceEvent::OnlineUsers(user_ids) => {
                    inner.online = user_ids.iter().cloned().collect();
                }
                PresenceEvent::OnlineCount(_) => {}
            }
            broadcast(&mut inner, event);
        }
    }
}

fn broadcast(inner: &mut SimulatedState, event: PresenceEvent) {
    inner
        .subscribers
        .retain(|subscriber| subscriber.send(event.clone()).is_ok());
}

impl RealtimeConnection for SimulatedConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn state(&self) -> ConnectionState {
        self.inner
            .lock()
            .map(|inner| inner.state)
            .unwrap_or(ConnectionState::Disconnected)
    }

    fn subscribe(&self) -> mpsc::Receiver<PresenceEvent> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut inner) = self.inner.lock() {
            inner.subscribers.push(tx);
        }
        rx
    }

    fn request_online_count(&self) -> Result<(), InvokeError> {
        let Ok(mut inner) = self.inner.lock() else {
            return Err(InvokeError::Transport("state lock poisoned".to_owned()));
        };

        if inner.state != ConnectionState::Connected {
            return Err(InvokeError::NotConnected);
        }

        let count = inner.online.len() as u64;
        broadcast(&mut inner, PresenceEvent::OnlineCount(count));
        Ok(())
    }
}

/// Drives a `SimulatedConnection` through a scripted presence sequence and
/// publishes the handle into the shared slot, so discovery and binding run
/// the same path a live integration would.
#[derive(Debug)]
pub struct SimulatedFeed {
    stop_tx: Option<watch::Sender<bool>>,
}

impl SimulatedFeed {
    pub fn start(
        runtime: &Runtime,
        connection: Arc<SimulatedConnection>,
        slot: SharedConnectionSlot,
        status_tx: Sender<ConnectionState>,
        step: Duration,
    ) -> Result<Self, SimulatedFeedStartError> {
        if std::env::var("ROSTER_SIMULATED_FEED_FAIL").ok().as_deref() == Some("1") {
            return Err(SimulatedFeedStartError::StartupRejected);
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        runtime.spawn(run_feed(connection, slot, status_tx, step, stop_rx));

        tracing::info!(code = SIMULATED_FEED_STARTED, "simulated presence feed started");

        Ok(Self {
            stop_tx: Some(stop_tx),
        })
    }
}

impl Drop for SimulatedFeed {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
            tracing::info!(
                code = SIMULATED_FEED_STOP_SIGNALED,
                "simulated presence feed stop signal sent"
            );
        }
    }
}

async fn run_feed(
    connection: Arc<SimulatedConnection>,
    slot: SharedConnectionSlot,
    status_tx: Sender<ConnectionState>,
    step: Duration,
    mut stop_rx: watch::Receiver<bool>,
) {
    connection.set_state(ConnectionState::Connecting);
    let _ = status_tx.send(ConnectionState::Connecting);

    if wait_or_stop(step, &mut stop_rx).await {
        return;
    }

    connection.set_state(ConnectionState::Connected);
    slot.publish(connection.clone());
    let _ = status_tx.send(ConnectionState::Connected);
    connection.emit(PresenceEvent::OnlineUsers(vec![
        "alice".to_owned(),
        "bob".to_owned(),
        "carol".to_owned(),
    ]));

    for event in scripted_steps().iter().cycle() {
        if wait_or_stop(step, &mut stop_rx).await {
            break;
        }

        connection.emit(event.clone());
        let _ = connection.request_online_count();
    }

    connection.set_state(ConnectionState::Disconnected);
    let _ = status_tx.send(ConnectionState::Disconnected);
    tracing::info!(code = SIMULATED_FEED_STOPPED, "simulated presence feed stopped");
}

async fn wait_or_stop(step: Duration, stop_rx: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        changed = stop_rx.changed() => changed.is_err() || *stop_rx.borrow(),
        () = sleep(step) => false,
    }
}

fn scripted_steps() -> Vec<PresenceEvent> {
    vec![
        PresenceEvent::UserOnline("dave".to_owned()),
        PresenceEvent::UserOffline("carol".to_owned()),
        PresenceEvent::UserOnline("carol".to_owned()),
        PresenceEvent::UserOffline("dave".to_owned()),
        PresenceEvent::OnlineUsers(vec!["alice".to_owned(), "bob".to_owned()]),
        PresenceEvent::UserOnline("carol".to_owned()),
    ]
}

#[derive(Debug)]
pub enum SimulatedFeedStartError {
    StartupRejected,
}

impl std::fmt::Display for SimulatedFeedStartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StartupRejected => f.write_str("startup rejected by test switch"),
        }
    }
}

impl std::error::Error for SimulatedFeedStartError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{realtime::contracts::ConnectionProvider, test_support::env_lock};

    #[test]
    fn emit_reaches_every_subscriber() {
        let connection = SimulatedConnection::new(1);
        let first = connection.subscribe();
        let second = connection.subscribe();

        connection.emit(PresenceEvent::UserOnline("alice".to_owned()));

        assert_eq!(
            first.try_recv(),
            Ok(PresenceEvent::UserOnline("alice".to_owned()))
        );
        assert_eq!(
            second.try_recv(),
            Ok(PresenceEvent::UserOnline("alice".to_owned()))
        );
    }

    #[test]
    fn count_request_answers_from_the_tracked_online_set() {
        let connection = SimulatedConnection::new(1);
        connection.set_state(ConnectionState::Connected);
        let events = connection.subscribe();

        connection.emit(PresenceEvent::OnlineUsers(vec![
            "alice".to_owned(),
            "bob".to_owned(),
        ]));
        connection.emit(PresenceEvent::UserOffline("bob".to_owned()));
        connection
            .request_online_count()
            .expect("count request should succeed while connected");

        let mut last_count = None;
        while let Ok(event) = events.try_recv() {
            if let PresenceEvent::OnlineCount(count) = event {
                last_count = Some(count);
            }
        }
        assert_eq!(last_count, Some(1));
    }

    #[test]
    fn count_request_fails_while_not_connected() {
        let connection = SimulatedConnection::new(1);

        let outcome = connection.request_online_count();

        assert_eq!(outcome, Err(InvokeError::NotConnected));
    }

    #[test]
    fn feed_publishes_the_handle_and_walks_to_connected() {
        let _guard = env_lock();
        let runtime = Runtime::new().expect("runtime should start");
        let connection = Arc::new(SimulatedConnection::new(7));
        let slot = SharedConnectionSlot::new();
        let (status_tx, status_rx) = mpsc::channel();

        let _feed = SimulatedFeed::start(
            &runtime,
            connection,
            slot.clone(),
            status_tx,
            Duration::from_millis(5),
        )
        .expect("feed should start");

        let first = status_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("first status should arrive");
        assert_eq!(first, ConnectionState::Connecting);

        let second = status_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("second status should arrive");
        assert_eq!(second, ConnectionState::Connected);

        let published = slot.current().expect("handle should be published");
        assert_eq!(published.id(), 7);
    }

    #[test]
    fn start_is_rejected_by_the_env_switch() {
        let _guard = env_lock();
        // SAFETY: env is guarded by the process-wide test mutex.
        unsafe { std::env::set_var("ROSTER_SIMULATED_FEED_FAIL", "1") };

        let runtime = Runtime::new().expect("runtime should start");
        let (status_tx, _status_rx) = mpsc::channel();
        let outcome = SimulatedFeed::start(
            &runtime,
            Arc::new(SimulatedConnection::new(1)),
            SharedConnectionSlot::new(),
            status_tx,
            Duration::from_millis(5),
        );

        // SAFETY: restoring env while the guard is held.
        unsafe { std::env::remove_var("ROSTER_SIMULATED_FEED_FAIL") };

        assert!(matches!(
            outcome,
            Err(SimulatedFeedStartError::StartupRejected)
        ));
    }
}
