use std::{
    sync::{mpsc::Receiver, Arc},
    time::Duration,
};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

use crate::{
    domain::events::{AppEvent, ConnectionState, KeyInput, PresenceEvent},
    realtime::{binder::PresenceBinder, contracts::RealtimeConnection},
    usecases::contracts::AppEventSource,
};

const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Default)]
pub struct CrosstermEventSource;

impl AppEventSource for CrosstermEventSource {
    fn next_event(&mut self) -> Result<Option<AppEvent>> {
        if !event::poll(EVENT_POLL_TIMEOUT)? {
            return Ok(Some(AppEvent::Tick));
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                return Ok(None);
            }

            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
                return Ok(Some(AppEvent::QuitRequested));
            }

            let mapped = match key.code {
                KeyCode::Char(ch) => Some(KeyInput::new(ch.to_string(), ctrl)),
                KeyCode::Backspace => Some(KeyInput::new("backspace", ctrl)),
                KeyCode::Esc => Some(KeyInput::new("esc", ctrl)),
                KeyCode::Tab => Some(KeyInput::new("tab", ctrl)),
                _ => None,
            };

            return Ok(mapped.map(AppEvent::InputKey));
        }

        Ok(None)
    }
}

/// Waits for discovery to deliver the shared connection, binds the presence
/// handlers once, and then drains the bound feed.
pub struct DiscoveredPresenceSource {
    found_rx: Receiver<Arc<dyn RealtimeConnection>>,
    binder: PresenceBinder,
    events: Option<Receiver<PresenceEvent>>,
}

impl DiscoveredPresenceSource {
    pub fn new(found_rx: Receiver<Arc<dyn RealtimeConnection>>, binder: PresenceBinder) -> Self {
        Self {
            found_rx,
            binder,
            events: None,
        }
    }
}

impl AppEventSource for DiscoveredPresenceSource {
    fn next_event(&mut self) -> Result<Option<AppEvent>> {
        if self.events.is_none() {
            if let Ok(connection) = self.found_rx.try_recv() {
                self.events = self.binder.bind(&connection);
            }
        }

        if let Some(events) = &self.events {
            if let Ok(event) = events.try_recv() {
                return Ok(Some(AppEvent::Presence(event)));
            }
        }

        Ok(None)
    }
}

pub struct ChannelConnectionStateSource {
    states: Receiver<ConnectionState>,
}

impl ChannelConnectionStateSource {
    pub fn new(states: Receiver<ConnectionState>) -> Self {
        Self { states }
    }
}

impl AppEventSource for ChannelConnectionStateSource {
    fn next_event(&mut self) -> Result<Option<AppEvent>> {
        Ok(self
            .states
            .try_recv()
            .ok()
            .map(AppEvent::ConnectionChanged))
    }
}

/// Polls its sources in order and yields the first event. Channel-backed
/// sources go in front of the keyboard source, whose tick would otherwise
/// starve them.
pub struct CompositeEventSource {
    sources: Vec<Box<dyn AppEventSource>>,
}

impl CompositeEventSource {
    pub fn new(sources: Vec<Box<dyn AppEventSource>>) -> Self {
        Self { sources }
    }
}

impl AppEventSource for CompositeEventSource {
    fn next_event(&mut self) -> Result<Option<AppEvent>> {
        for source in self.sources.iter_mut() {
            if let Some(event) = source.next_event()? {
                return Ok(Some(event));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
pub struct MockEventSource {
    queue: std::collections::VecDeque<AppEvent>,
}

#[cfg(test)]
impl MockEventSource {
    pub fn from(events: Vec<AppEvent>) -> Self {
        Self {
            queue: events.into(),
        }
    }
}

#[cfg(test)]
impl AppEventSource for MockEventSource {
    fn next_event(&mut self) -> Result<Option<AppEvent>> {
        Ok(self.queue.pop_front())
    }
}
