use super::{
    events::ConnectionState,
    presence::PresenceBoard,
    tag_filter::TagFilterState,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellState {
    running: bool,
    connection_state: ConnectionState,
    presence: PresenceBoard,
    tags: TagFilterState,
    last_presence_update_unix_ms: Option<i64>,
}

impl ShellState {
    pub fn new(presence: PresenceBoard, tags: TagFilterState) -> Self {
        Self {
            running: true,
            connection_state: ConnectionState::Connecting,
            presence,
            tags,
            last_presence_update_unix_ms: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection_state
    }

    pub fn set_connection_state(&mut self, state: ConnectionState) {
        self.connection_state = state;
    }

    pub fn presence(&self) -> &PresenceBoard {
        &self.presence
    }

    pub fn presence_mut(&mut self) -> &mut PresenceBoard {
        &mut self.presence
    }

    pub fn tags(&self) -> &TagFilterState {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut TagFilterState {
        &mut self.tags
    }

    pub fn last_presence_update_unix_ms(&self) -> Option<i64> {
        self.last_presence_update_unix_ms
    }

    pub fn note_presence_update(&mut self, at_unix_ms: i64) {
        self.last_presence_update_unix_ms = Some(at_unix_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tag_filter::TagCard;

    fn state() -> ShellState {
        ShellState::new(
            PresenceBoard::new(),
            TagFilterState::new(vec![TagCard::new("java", None)], ""),
        )
    }

    #[test]
    fn starts_running_and_connecting() {
        let state = state();

        assert!(state.is_running());
        assert_eq!(state.connection_state(), ConnectionState::Connecting);
        assert_eq!(state.last_presence_update_unix_ms(), None);
    }

    #[test]
    fn stop_halts_the_shell() {
        let mut state = state();

        state.stop();

        assert!(!state.is_running());
    }

    #[test]
    fn records_the_latest_presence_update_time() {
        let mut state = state();

        state.note_presence_update(1_000);
        state.note_presence_update(2_000);

        assert_eq!(state.last_presence_update_unix_ms(), Some(2_000));
    }
}
