use std::sync::{Arc, Mutex};

use crate::realtime::library::LibrarySource;

const LIBRARY_PRIMARY_LOAD_FAILED: &str = "REALTIME_LIBRARY_PRIMARY_LOAD_FAILED";
const LIBRARY_FALLBACK_LOAD_FAILED: &str = "REALTIME_LIBRARY_FALLBACK_LOAD_FAILED";
const LIBRARY_LOADED: &str = "REALTIME_LIBRARY_LOADED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    NotLoading,
    Loading,
    Loaded,
}

type ReadyCallback = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct GateState {
    load_state: LoadState,
    waiters: Vec<ReadyCallback>,
}

/// Gates consumers on the realtime client library being acquired.
///
/// `load` walks the primary then the fallback source; success fires the
/// one-shot ready signal to every queued callback. After both tiers fail
/// the gate resets to `NotLoading` and queued callbacks stay queued; they
/// only run if a later `load` succeeds.
#[derive(Clone)]
pub struct ReadinessGate {
    inner: Arc<Mutex<GateState>>,
    primary: Arc<dyn LibrarySource>,
    fallback: Arc<dyn LibrarySource>,
}

enum ReadyDisposition {
    RunNow(ReadyCallback),
    Queued { trigger_load: bool },
}

impl ReadinessGate {
    pub fn new(primary: Arc<dyn LibrarySource>, fallback: Arc<dyn LibrarySource>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(GateState::default())),
            primary,
            fallback,
        }
    }

    /// Gate over a library that is already present in the environment, e.g.
    /// a previously cached artifact.
    pub fn with_library_present(
        primary: Arc<dyn LibrarySource>,
        fallback: Arc<dyn LibrarySource>,
    ) -> Self {
        let gate = Self::new(primary, fallback);
        if let Ok(mut state) = gate.inner.lock() {
            state.load_state = LoadState::Loaded;
        }
        gate
    }

    pub fn is_loaded(&self) -> bool {
        self.inner
            .lock()
            .map(|state| state.load_state == LoadState::Loaded)
            .unwrap_or(false)
    }

    /// Idempotent: a call while loading or loaded is a no-op, so concurrent
    /// callers trigger at most one fetch per source tier.
    pub fn load(&self) {
        {
            let Ok(mut state) = self.inner.lock() else {
                return;
            };
            if state.load_state != LoadState::NotLoading {
                return;
            }
            state.load_state = LoadState::Loading;
        }

        // The lock is not held across fetches: sources may block, and
        // reentrant load()/ready() calls must observe `Loading`.
        let loaded = self.run_tiers();

        let waiters = {
            let Ok(mut state) = self.inner.lock() else {
                return;
            };
            if loaded {
                state.load_state = LoadState::Loaded;
                std::mem::take(&mut state.waiters)
            } else {
                state.load_state = LoadState::NotLoading;
                Vec::new()
            }
        };

        for waiter in waiters {
            waiter();
        }
    }

    /// Invokes `callback` synchronously if the library is loaded; otherwise
    /// queues it on the one-shot ready signal and ensures a load has been
    /// triggered.
    pub fn ready(&self, callback: impl FnOnce() + Send + 'static) {
        let disposition = {
            let Ok(mut state) = self.inner.lock() else {
                return;
            };
            match state.load_state {
                LoadState::Loaded => ReadyDisposition::RunNow(Box::new(callback)),
                LoadState::Loading => {
                    state.waiters.push(Box::new(callback));
                    ReadyDisposition::Queued { trigger_load: false }
                }
                LoadState::NotLoading => {
                    state.waiters.push(Box::new(callback));
                    ReadyDisposition::Queued { trigger_load: true }
                }
            }
        };

        match disposition {
            ReadyDisposition::RunNow(callback) => callback(),
            ReadyDisposition::Queued { trigger_load: true } => self.load(),
            ReadyDisposition::Queued { trigger_load: false } => {}
        }
    }

    fn run_tiers(&self) -> bool {
        match self.primary.fetch() {
            Ok(()) => {
                tracing::info!(
                    code = LIBRARY_LOADED,
                    source = %self.primary.describe(),
                    "realtime client library acquired"
                );
                return true;
            }
            Err(error) => {
                tracing::warn!(
                    code = LIBRARY_PRIMARY_LOAD_FAILED,
                    source = %self.primary.describe(),
                    error = %error,
                    "primary library source failed, trying fallback"
                );
            }
        }

        match self.fallback.fetch() {
            Ok(()) => {
                tracing::info!(
                    code = LIBRARY_LOADED,
                    source = %self.fallback.describe(),
                    "realtime client library acquired"
                );
                true
            }
            Err(error) => {
                tracing::warn!(
                    code = LIBRARY_FALLBACK_LOAD_FAILED,
                    source = %self.fallback.describe(),
                    error = %error,
                    "fallback library source failed, giving up"
                );
                false
            }
        }
    }
}
