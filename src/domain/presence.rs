#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presence {
    Online,
    #[default]
    Offline,
}

impl Presence {
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

/// Nested status dot carried by some badges.
///
/// The dot keeps its own state and descriptive label so a badge and its dot
/// always flip together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorDot {
    presence: Presence,
    label: String,
}

impl IndicatorDot {
    fn new() -> Self {
        let presence = Presence::Offline;
        Self {
            presence,
            label: presence.as_label().to_owned(),
        }
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn apply(&mut self, presence: Presence) {
        self.presence = presence;
        self.label = presence.as_label().to_owned();
    }
}

/// One on-screen occurrence of a user. A user may appear on zero, one, or
/// many badges (e.g. as question author and as an answer author).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBadge {
    user_id: String,
    caption: String,
    presence: Presence,
    indicator: Option<IndicatorDot>,
}

impl UserBadge {
    pub fn new(user_id: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            caption: caption.into(),
            presence: Presence::Offline,
            indicator: None,
        }
    }

    pub fn with_indicator(mut self) -> Self {
        self.indicator = Some(IndicatorDot::new());
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    pub fn indicator(&self) -> Option<&IndicatorDot> {
        self.indicator.as_ref()
    }

    fn apply(&mut self, presence: Presence) {
        self.presence = presence;
        if let Some(indicator) = self.indicator.as_mut() {
            indicator.apply(presence);
        }
    }
}

/// Aggregate of every presence-reactive surface on the current page: user
/// badges plus the online-count readouts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PresenceBoard {
    badges: Vec<UserBadge>,
    count_displays: Vec<String>,
}

impl PresenceBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_badge(&mut self, badge: UserBadge) {
        self.badges.push(badge);
    }

    pub fn push_count_display(&mut self) {
        self.count_displays.push(String::new());
    }

    pub fn badges(&self) -> &[UserBadge] {
        &self.badges
    }

    pub fn count_displays(&self) -> &[String] {
        &self.count_displays
    }

    /// Applies `presence` to every badge tagged with `user_id`. Unknown ids
    /// touch nothing; repeated application is idempotent.
    pub fn mark(&mut self, user_id: &str, presence: Presence) {
        for badge in self
            .badges
            .iter_mut()
            .filter(|badge| badge.user_id == user_id)
        {
            badge.apply(presence);
        }
    }

    /// Full resync from an authoritative online list: every badge goes
    /// offline first, then each listed id is marked online. Last writer
    /// wins against interleaved single-user flips.
    pub fn resync(&mut self, online_ids: &[String]) {
        for badge in self.badges.iter_mut() {
            badge.apply(Presence::Offline);
        }

        for user_id in online_ids {
            self.mark(user_id, Presence::Online);
        }
    }

    /// Writes `count` as text into every count readout.
    pub fn set_count(&mut self, count: u64) {
        for display in self.count_displays.iter_mut() {
            *display = count.to_string();
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn online_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .badges
            .iter()
            .filter(|badge| badge.presence == Presence::Online)
            .map(|badge| badge.user_id.as_str())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(users: &[(&str, bool)]) -> PresenceBoard {
        let mut board = PresenceBoard::new();
        for (user_id, with_indicator) in users {
            let mut badge = UserBadge::new(*user_id, format!("user {user_id}"));
            if *with_indicator {
                badge = badge.with_indicator();
            }
            board.push_badge(badge);
        }
        board
    }

    #[test]
    fn new_badges_start_offline() {
        let board = board_with(&[("alice", true)]);

        let badge = &board.badges()[0];
        assert_eq!(badge.presence(), Presence::Offline);
        assert_eq!(
            badge.indicator().map(|dot| dot.label()),
            Some("offline")
        );
    }

    #[test]
    fn mark_flips_badge_and_nested_indicator_together() {
        let mut board = board_with(&[("alice", true)]);

        board.mark("alice", Presence::Online);

        let badge = &board.badges()[0];
        assert_eq!(badge.presence(), Presence::Online);
        let dot = badge.indicator().expect("badge should carry a dot");
        assert_eq!(dot.presence(), Presence::Online);
        assert_eq!(dot.label(), "online");
    }

    #[test]
    fn mark_is_idempotent() {
        let mut board = board_with(&[("alice", true)]);

        board.mark("alice", Presence::Online);
        let once = board.clone();
        board.mark("alice", Presence::Online);

        assert_eq!(board, once);
    }

    #[test]
    fn final_state_matches_last_mark_regardless_of_call_count() {
        let mut board = board_with(&[("alice", false)]);

        board.mark("alice", Presence::Online);
        board.mark("alice", Presence::Offline);
        board.mark("alice", Presence::Offline);
        board.mark("alice", Presence::Online);

        assert_eq!(board.badges()[0].presence(), Presence::Online);
    }

    #[test]
    fn mark_touches_every_badge_of_the_user_and_nothing_else() {
        let mut board = board_with(&[("alice", false), ("bob", false), ("alice", true)]);

        board.mark("alice", Presence::Online);

        assert_eq!(board.badges()[0].presence(), Presence::Online);
        assert_eq!(board.badges()[1].presence(), Presence::Offline);
        assert_eq!(board.badges()[2].presence(), Presence::Online);
    }

    #[test]
    fn mark_for_unknown_user_is_a_noop() {
        let mut board = board_with(&[("alice", false)]);
        let before = board.clone();

        board.mark("nobody", Presence::Online);

        assert_eq!(board, before);
    }

    #[test]
    fn resync_yields_exactly_the_listed_ids_online() {
        let mut board = board_with(&[("alice", false), ("bob", true), ("carol", false)]);
        board.mark("alice", Presence::Online);
        board.mark("carol", Presence::Online);

        board.resync(&["bob".to_owned(), "carol".to_owned()]);

        assert_eq!(board.online_ids(), vec!["bob", "carol"]);
    }

    #[test]
    fn resync_with_empty_list_resets_everyone_offline() {
        let mut board = board_with(&[("alice", false), ("bob", false)]);
        board.mark("alice", Presence::Online);
        board.mark("bob", Presence::Online);

        board.resync(&[]);

        assert!(board.online_ids().is_empty());
    }

    #[test]
    fn resync_ignores_ids_without_badges() {
        let mut board = board_with(&[("alice", false)]);

        board.resync(&["ghost".to_owned(), "alice".to_owned()]);

        assert_eq!(board.online_ids(), vec!["alice"]);
    }

    #[test]
    fn set_count_writes_into_every_readout() {
        let mut board = PresenceBoard::new();
        board.push_count_display();
        board.push_count_display();

        board.set_count(42);

        assert_eq!(board.count_displays(), ["42".to_owned(), "42".to_owned()]);
    }

    #[test]
    fn set_count_without_readouts_is_a_noop() {
        let mut board = board_with(&[("alice", false)]);
        let before = board.clone();

        board.set_count(7);

        assert_eq!(board, before);
    }
}
