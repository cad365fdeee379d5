use anyhow::Result;

use crate::domain::{
    events::{now_unix_ms, AppEvent, KeyInput, PresenceEvent},
    presence::Presence,
    shell_state::ShellState,
    tag_filter::SearchMode,
};

use super::contracts::ShellOrchestrator;

pub struct DefaultShellOrchestrator {
    state: ShellState,
}

impl DefaultShellOrchestrator {
    pub fn new(state: ShellState) -> Self {
        Self { state }
    }

    fn handle_key(&mut self, key: KeyInput) {
        // Tab always works so the user can leave the server form again;
        // everything else edits the instant filter only while it is shown.
        if key.key == "tab" {
            self.state.tags_mut().toggle_mode();
            return;
        }

        if self.state.tags().mode() == SearchMode::Server {
            return;
        }

        match key.key.as_str() {
            "backspace" => self.state.tags_mut().pop_char(),
            "esc" => self.state.tags_mut().clear(),
            _ => {
                if !key.ctrl {
                    let mut chars = key.key.chars();
                    if let (Some(ch), None) = (chars.next(), chars.next()) {
                        self.state.tags_mut().push_char(ch);
                    }
                }
            }
        }
    }

    fn handle_presence(&mut self, event: PresenceEvent) {
        match event {
            PresenceEvent::UserOnline(user_id) => {
                self.state.presence_mut().mark(&user_id, Presence::Online);
            }
            PresenceEvent::UserOffline(user_id) => {
                self.state.presence_mut().mark(&user_id, Presence::Offline);
            }
            PresenceEvent::OnlineUsers(user_ids) => {
                self.state.presence_mut().resync(&user_ids);
            }
            PresenceEvent::OnlineCount(count) => {
                self.state.presence_mut().set_count(count);
            }
        }

        self.state.note_presence_update(now_unix_ms());
    }
}

impl ShellOrchestrator for DefaultShellOrchestrator {
    fn state(&self) -> &ShellState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ShellState {
        &mut self.state
    }

    fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::Tick => {}
            AppEvent::QuitRequested => self.state.stop(),
            AppEvent::InputKey(key) => self.handle_key(key),
            AppEvent::Presence(event) => self.handle_presence(event),
            AppEvent::ConnectionChanged(state) => self.state.set_connection_state(state),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        events::ConnectionState,
        presence::{PresenceBoard, UserBadge},
        tag_filter::{TagCard, TagFilterState},
    };

    fn orchestrator() -> DefaultShellOrchestrator {
        let mut board = PresenceBoard::new();
        board.push_badge(UserBadge::new("alice", "alice").with_indicator());
        board.push_badge(UserBadge::new("bob", "bob"));
        board.push_count_display();

        let tags = TagFilterState::new(
            vec![
                TagCard::new("java", None),
                TagCard::new("python", Some("snake".to_owned())),
            ],
            "",
        );

        DefaultShellOrchestrator::new(ShellState::new(board, tags))
    }

    fn key(orchestrator: &mut DefaultShellOrchestrator, key: &str) {
        orchestrator
            .handle_event(AppEvent::InputKey(KeyInput::new(key, false)))
            .expect("key event must be handled");
    }

    #[test]
    fn stops_on_quit_event() {
        let mut orchestrator = orchestrator();

        orchestrator
            .handle_event(AppEvent::QuitRequested)
            .expect("event must be handled");

        assert!(!orchestrator.state().is_running());
    }

    #[test]
    fn keeps_running_on_tick() {
        let mut orchestrator = orchestrator();

        orchestrator
            .handle_event(AppEvent::Tick)
            .expect("event must be handled");

        assert!(orchestrator.state().is_running());
    }

    #[test]
    fn presence_flips_reach_the_board_and_stamp_the_update_time() {
        let mut orchestrator = orchestrator();

        orchestrator
            .handle_event(AppEvent::Presence(PresenceEvent::UserOnline(
                "alice".to_owned(),
            )))
            .expect("presence event must be handled");

        let state = orchestrator.state();
        assert_eq!(state.presence().badges()[0].presence(), Presence::Online);
        assert_eq!(state.presence().badges()[1].presence(), Presence::Offline);
        assert!(state.last_presence_update_unix_ms().is_some());
    }

    #[test]
    fn online_list_resyncs_the_whole_board() {
        let mut orchestrator = orchestrator();
        orchestrator
            .handle_event(AppEvent::Presence(PresenceEvent::UserOnline(
                "alice".to_owned(),
            )))
            .expect("presence event must be handled");

        orchestrator
            .handle_event(AppEvent::Presence(PresenceEvent::OnlineUsers(vec![
                "bob".to_owned(),
            ])))
            .expect("presence event must be handled");

        let board = orchestrator.state().presence();
        assert_eq!(board.badges()[0].presence(), Presence::Offline);
        assert_eq!(board.badges()[1].presence(), Presence::Online);
    }

    #[test]
    fn online_count_lands_in_every_readout() {
        let mut orchestrator = orchestrator();

        orchestrator
            .handle_event(AppEvent::Presence(PresenceEvent::OnlineCount(12)))
            .expect("presence event must be handled");

        assert_eq!(
            orchestrator.state().presence().count_displays(),
            ["12".to_owned()]
        );
    }

    #[test]
    fn connection_state_changes_are_reflected() {
        let mut orchestrator = orchestrator();

        orchestrator
            .handle_event(AppEvent::ConnectionChanged(ConnectionState::Connected))
            .expect("connection event must be handled");

        assert_eq!(
            orchestrator.state().connection_state(),
            ConnectionState::Connected
        );
    }

    #[test]
    fn typed_characters_filter_the_tag_list() {
        let mut orchestrator = orchestrator();

        key(&mut orchestrator, "p");
        key(&mut orchestrator, "y");

        let tags = orchestrator.state().tags();
        assert_eq!(tags.input(), "py");
        assert_eq!(tags.visible_count(), 1);
    }

    #[test]
    fn backspace_and_escape_edit_the_filter() {
        let mut orchestrator = orchestrator();
        key(&mut orchestrator, "p");
        key(&mut orchestrator, "y");

        key(&mut orchestrator, "backspace");
        assert_eq!(orchestrator.state().tags().input(), "p");

        key(&mut orchestrator, "esc");
        assert_eq!(orchestrator.state().tags().input(), "");
        assert_eq!(orchestrator.state().tags().visible_count(), 2);
    }

    #[test]
    fn tab_toggles_the_search_mode() {
        let mut orchestrator = orchestrator();

        key(&mut orchestrator, "tab");
        assert_eq!(orchestrator.state().tags().mode(), SearchMode::Server);

        key(&mut orchestrator, "tab");
        assert_eq!(orchestrator.state().tags().mode(), SearchMode::Instant);
    }

    #[test]
    fn typing_is_ignored_while_the_server_form_is_shown() {
        let mut orchestrator = orchestrator();
        key(&mut orchestrator, "tab");

        key(&mut orchestrator, "p");

        assert_eq!(orchestrator.state().tags().input(), "");
    }

    #[test]
    fn control_chords_do_not_land_in_the_filter() {
        let mut orchestrator = orchestrator();

        orchestrator
            .handle_event(AppEvent::InputKey(KeyInput::new("r", true)))
            .expect("key event must be handled");

        assert_eq!(orchestrator.state().tags().input(), "");
    }
}
