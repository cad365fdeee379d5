use std::sync::Arc;

use crate::realtime::contracts::{
    FacadeProvider, InvokeError, NotificationFacade, QuestionFeedFacade,
};

#[cfg(test)]
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    mpsc, Mutex,
};

#[cfg(test)]
use crate::{
    domain::events::{ConnectionState, PresenceEvent},
    infra::{config::AppConfig, contracts::ConfigAdapter},
    realtime::contracts::{ConnectionId, RealtimeConnection},
};

#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct StubConfigAdapter;

#[cfg(test)]
impl ConfigAdapter for StubConfigAdapter {
    fn load(&self) -> anyhow::Result<AppConfig> {
        Ok(AppConfig::default())
    }
}

/// Notification façade that acknowledges joins and leaves without a
/// backend. Used when no live hub is composed in.
#[derive(Debug, Clone, Default)]
pub struct NoopNotificationFacade;

impl NotificationFacade for NoopNotificationFacade {
    fn join_group(&self, group: &str) -> Result<(), InvokeError> {
        tracing::debug!(group, "noop notification facade joined group");
        Ok(())
    }

    fn leave_group(&self, group: &str) -> Result<(), InvokeError> {
        tracing::debug!(group, "noop notification facade left group");
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct NoopQuestionFeed;

impl QuestionFeedFacade for NoopQuestionFeed {
    fn join_question(&self, question_id: i64) -> Result<(), InvokeError> {
        tracing::debug!(question_id, "noop question feed joined");
        Ok(())
    }

    fn leave_question(&self, question_id: i64) -> Result<(), InvokeError> {
        tracing::debug!(question_id, "noop question feed left");
        Ok(())
    }
}

/// Facade provider fixed at composition time.
#[derive(Clone, Default)]
pub struct StaticFacadeProvider {
    notifications: Option<Arc<dyn NotificationFacade>>,
    question_feed: Option<Arc<dyn QuestionFeedFacade>>,
}

impl StaticFacadeProvider {
    pub fn new(
        notifications: Option<Arc<dyn NotificationFacade>>,
        question_feed: Option<Arc<dyn QuestionFeedFacade>>,
    ) -> Self {
        Self {
            notifications,
            question_feed,
        }
    }
}

impl FacadeProvider for StaticFacadeProvider {
    fn notifications(&self) -> Option<Arc<dyn NotificationFacade>> {
        self.notifications.clone()
    }

    fn question_feed(&self) -> Option<Arc<dyn QuestionFeedFacade>> {
        self.question_feed.clone()
    }
}

/// Scriptable connection for exercising discovery and binding.
#[cfg(test)]
pub struct StubConnection {
    id: ConnectionId,
    state: Mutex<ConnectionState>,
    subscribers: Mutex<Vec<mpsc::Sender<PresenceEvent>>>,
    subscriptions: AtomicUsize,
    count_requests: AtomicUsize,
    fail_invocations: bool,
}

#[cfg(test)]
impl StubConnection {
    pub fn connected(id: ConnectionId) -> Self {
        Self::with_state(id, ConnectionState::Connected)
    }

    pub fn connecting(id: ConnectionId) -> Self {
        Self::with_state(id, ConnectionState::Connecting)
    }

    fn with_state(id: ConnectionId, state: ConnectionState) -> Self {
        Self {
            id,
            state: Mutex::new(state),
            subscribers: Mutex::new(Vec::new()),
            subscriptions: AtomicUsize::new(0),
            count_requests: AtomicUsize::new(0),
            fail_invocations: false,
        }
    }

    pub fn with_failing_invocations(mut self) -> Self {
        self.fail_invocations = true;
        self
    }

    pub fn subscribe_count(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    pub fn count_requests(&self) -> usize {
        self.count_requests.load(Ordering::SeqCst)
    }

    pub fn emit(&self, event: PresenceEvent) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|subscriber| subscriber.send(event.clone()).is_ok());
        }
    }
}

#[cfg(test)]
impl RealtimeConnection for StubConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn state(&self) -> ConnectionState {
        self.state
            .lock()
            .map(|state| *state)
            .unwrap_or(ConnectionState::Disconnected)
    }

    fn subscribe(&self) -> mpsc::Receiver<PresenceEvent> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    fn request_online_count(&self) -> Result<(), InvokeError> {
        self.count_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_invocations {
            return Err(InvokeError::Transport("stubbed invocation failure".to_owned()));
        }
        Ok(())
    }
}

/// Facade provider whose façades appear after a delay, for exercising the
/// membership helper's polling.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct SettableFacadeProvider {
    inner: Arc<Mutex<StaticFacadeProvider>>,
}

#[cfg(test)]
impl SettableFacadeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_notifications(&self, facade: Arc<dyn NotificationFacade>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.notifications = Some(facade);
        }
    }

    pub fn set_question_feed(&self, facade: Arc<dyn QuestionFeedFacade>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.question_feed = Some(facade);
        }
    }
}

#[cfg(test)]
impl FacadeProvider for SettableFacadeProvider {
    fn notifications(&self) -> Option<Arc<dyn NotificationFacade>> {
        self.inner.lock().ok().and_then(|inner| inner.notifications.clone())
    }

    fn question_feed(&self) -> Option<Arc<dyn QuestionFeedFacade>> {
        self.inner.lock().ok().and_then(|inner| inner.question_feed.clone())
    }
}

/// Records every join and leave for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingNotificationFacade {
    joined: Mutex<Vec<String>>,
    left: Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingNotificationFacade {
    pub fn joined(&self) -> Vec<String> {
        self.joined.lock().map(|joined| joined.clone()).unwrap_or_default()
    }

    pub fn left(&self) -> Vec<String> {
        self.left.lock().map(|left| left.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl NotificationFacade for RecordingNotificationFacade {
    fn join_group(&self, group: &str) -> Result<(), InvokeError> {
        if let Ok(mut joined) = self.joined.lock() {
            joined.push(group.to_owned());
        }
        Ok(())
    }

    fn leave_group(&self, group: &str) -> Result<(), InvokeError> {
        if let Ok(mut left) = self.left.lock() {
            left.push(group.to_owned());
        }
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingQuestionFeed {
    joined: Mutex<Vec<i64>>,
    left: Mutex<Vec<i64>>,
}

#[cfg(test)]
impl RecordingQuestionFeed {
    pub fn joined(&self) -> Vec<i64> {
        self.joined.lock().map(|joined| joined.clone()).unwrap_or_default()
    }

    pub fn left(&self) -> Vec<i64> {
        self.left.lock().map(|left| left.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl QuestionFeedFacade for RecordingQuestionFeed {
    fn join_question(&self, question_id: i64) -> Result<(), InvokeError> {
        if let Ok(mut joined) = self.joined.lock() {
            joined.push(question_id);
        }
        Ok(())
    }

    fn leave_question(&self, question_id: i64) -> Result<(), InvokeError> {
        if let Ok(mut left) = self.left.lock() {
            left.push(question_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_config_returns_defaults() {
        let adapter = StubConfigAdapter;
        let config = adapter.load().expect("stub config must load");

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn static_provider_hands_out_what_it_was_built_with() {
        let provider = StaticFacadeProvider::new(Some(Arc::new(NoopNotificationFacade)), None);

        assert!(provider.notifications().is_some());
        assert!(provider.question_feed().is_none());
    }

    #[test]
    fn settable_provider_starts_empty_and_fills_in() {
        let provider = SettableFacadeProvider::new();
        assert!(provider.notifications().is_none());

        provider.set_notifications(Arc::new(NoopNotificationFacade));

        assert!(provider.notifications().is_some());
    }
}
