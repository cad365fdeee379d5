//! Style definitions for the UI components.

use ratatui::style::{Color, Modifier, Style};

/// Style for a badge whose user is online.
pub fn online_badge_style() -> Style {
    Style::default().fg(Color::Green)
}

/// Style for a badge whose user is offline (dimmed).
pub fn offline_badge_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Style for the badge caption (user name and role).
pub fn badge_caption_style() -> Style {
    Style::default().fg(Color::White)
}

/// Style for the online-count readout.
pub fn online_count_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// Style for tag names (bold, bright).
pub fn tag_name_style() -> Style {
    Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

/// Style for tag descriptions (dimmed).
pub fn tag_description_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Style for the "no tags found" line.
pub fn no_results_style() -> Style {
    Style::default().fg(Color::Yellow)
}

/// Style for the search prompt symbol.
pub fn input_prompt_style() -> Style {
    Style::default().fg(Color::Cyan)
}

/// Style for typed search text.
pub fn input_text_style() -> Style {
    Style::default().fg(Color::White)
}

/// Style for the connection readout in the status bar.
pub fn connection_style(connected: bool) -> Style {
    if connected {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Yellow)
    }
}

/// Style for the status bar hints.
pub fn status_hint_style() -> Style {
    Style::default().fg(Color::DarkGray)
}
