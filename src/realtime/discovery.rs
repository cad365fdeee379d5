use std::{
    sync::{
        mpsc::{self, Receiver, RecvTimeoutError, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::realtime::contracts::{ConnectionProvider, RealtimeConnection};

const DISCOVERY_SHUTDOWN_FAILED: &str = "REALTIME_DISCOVERY_SHUTDOWN_FAILED";
const DISCOVERY_CONNECTION_FOUND: &str = "REALTIME_DISCOVERY_CONNECTION_FOUND";
const DISCOVERY_GAVE_UP: &str = "REALTIME_DISCOVERY_GAVE_UP";

/// Polls `probe` until it yields, the optional attempt ceiling is reached,
/// or the stop channel fires. The bounded and unbounded waits in this crate
/// are both this loop; only the ceiling differs.
pub(crate) fn poll_until<T>(
    probe: impl Fn() -> Option<T>,
    interval: Duration,
    max_attempts: Option<u32>,
    stop_rx: &Receiver<()>,
) -> Option<T> {
    let mut attempts: u32 = 0;
    loop {
        if let Some(found) = probe() {
            return Some(found);
        }

        attempts = attempts.saturating_add(1);
        if let Some(ceiling) = max_attempts {
            if attempts >= ceiling {
                return None;
            }
        }

        match stop_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return None,
        }
    }
}

/// Waits for another integration to publish the shared connection handle,
/// then delivers it once. If the attempt ceiling elapses first, the monitor
/// stops silently and presence wiring never activates for this run.
#[derive(Debug)]
pub struct ConnectionDiscovery {
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl ConnectionDiscovery {
    pub fn start(
        provider: Arc<dyn ConnectionProvider>,
        poll_interval: Duration,
        max_attempts: Option<u32>,
        found_tx: Sender<Arc<dyn RealtimeConnection>>,
    ) -> Result<Self, DiscoveryStartError> {
        if std::env::var("ROSTER_DISCOVERY_FAIL").ok().as_deref() == Some("1") {
            return Err(DiscoveryStartError::StartupRejected);
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let worker = thread::Builder::new()
            .name("roster-connection-discovery".to_owned())
            .spawn(move || run_discovery(provider, poll_interval, max_attempts, found_tx, stop_rx))
            .map_err(DiscoveryStartError::WorkerSpawn)?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        })
    }
}

impl Drop for ConnectionDiscovery {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(worker) = self.worker.take() {
            if let Err(error) = worker.join() {
                tracing::warn!(
                    code = DISCOVERY_SHUTDOWN_FAILED,
                    error = ?error,
                    "connection discovery worker panicked on shutdown"
                );
            }
        }
    }
}

fn run_discovery(
    provider: Arc<dyn ConnectionProvider>,
    poll_interval: Duration,
    max_attempts: Option<u32>,
    found_tx: Sender<Arc<dyn RealtimeConnection>>,
    stop_rx: Receiver<()>,
) {
    match poll_until(|| provider.current(), poll_interval, max_attempts, &stop_rx) {
        Some(connection) => {
            tracing::info!(
                code = DISCOVERY_CONNECTION_FOUND,
                connection_id = connection.id(),
                "shared realtime connection discovered"
            );
            let _ = found_tx.send(connection);
        }
        None => {
            tracing::debug!(
                code = DISCOVERY_GAVE_UP,
                "no shared connection appeared before the polling ceiling"
            );
        }
    }
}

#[derive(Debug)]
pub enum DiscoveryStartError {
    StartupRejected,
    WorkerSpawn(std::io::Error),
}

impl std::fmt::Display for DiscoveryStartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StartupRejected => f.write_str("startup rejected by test switch"),
            Self::WorkerSpawn(source) => write!(f, "worker spawn failed: {source}"),
        }
    }
}

impl std::error::Error for DiscoveryStartError {}
