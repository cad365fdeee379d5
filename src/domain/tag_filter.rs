#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCard {
    name: String,
    description: Option<String>,
}

impl TagCard {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn matches(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }

        self.name.to_lowercase().contains(term)
            || self
                .description
                .as_deref()
                .unwrap_or("")
                .to_lowercase()
                .contains(term)
    }
}

/// Which of the two mutually exclusive search surfaces is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Instant substring filter over the already-rendered cards.
    #[default]
    Instant,
    /// Server-driven search form; the instant filter is hidden.
    Server,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilterState {
    cards: Vec<TagCard>,
    visible: Vec<bool>,
    input: String,
    mode: SearchMode,
}

impl TagFilterState {
    /// A non-empty `initial_input` (restored search box) is applied before
    /// any user interaction.
    pub fn new(cards: Vec<TagCard>, initial_input: impl Into<String>) -> Self {
        let visible = vec![true; cards.len()];
        let mut state = Self {
            cards,
            visible,
            input: initial_input.into(),
            mode: SearchMode::Instant,
        };
        state.recompute();
        state
    }

    pub fn cards(&self) -> &[TagCard] {
        &self.cards
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.visible.get(index).copied().unwrap_or(false)
    }

    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|visible| **visible).count()
    }

    pub fn shows_no_results(&self) -> bool {
        self.visible_count() == 0 && !self.term().is_empty()
    }

    pub fn push_char(&mut self, ch: char) {
        self.input.push(ch);
        self.recompute();
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
        self.recompute();
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.recompute();
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            SearchMode::Instant => SearchMode::Server,
            SearchMode::Server => SearchMode::Instant,
        };
    }

    fn term(&self) -> String {
        self.input.trim().to_lowercase()
    }

    fn recompute(&mut self) {
        let term = self.term();
        for (index, card) in self.cards.iter().enumerate() {
            self.visible[index] = card.matches(&term);
        }
    }
}
