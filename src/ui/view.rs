use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::domain::{
    events::ConnectionState,
    presence::{Presence, PresenceBoard, UserBadge},
    shell_state::ShellState,
    tag_filter::{SearchMode, TagFilterState},
};

use super::styles;

/// Prompt symbol shown before the filter text.
const PROMPT_SYMBOL: &str = "> ";

const NO_RESULTS_TEXT: &str = "No tags match your filter.";

pub fn render(frame: &mut Frame<'_>, state: &ShellState) {
    let [content_area, status_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .areas(frame.area());

    let [presence_area, tags_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .areas(content_area);

    render_presence_panel(frame, presence_area, state.presence());
    render_tags_panel(frame, tags_area, state.tags());

    let status = Paragraph::new(status_line(state));
    frame.render_widget(status, status_area);
}

fn render_presence_panel(frame: &mut Frame<'_>, area: Rect, board: &PresenceBoard) {
    let mut items: Vec<ListItem<'static>> = Vec::new();

    for display in board.count_displays() {
        items.push(ListItem::new(count_line(display)));
    }

    for badge in board.badges() {
        items.push(ListItem::new(badge_line(badge)));
    }

    let list = List::new(items).block(
        Block::default()
            .title("Who's online")
            .borders(Borders::ALL),
    );
    frame.render_widget(list, area);
}

fn count_line(display: &str) -> Line<'static> {
    let text = if display.is_empty() {
        "online now: -".to_owned()
    } else {
        format!("online now: {display}")
    };
    Line::from(Span::styled(text, styles::online_count_style()))
}

fn badge_line(badge: &UserBadge) -> Line<'static> {
    let online = badge.presence() == Presence::Online;
    let badge_style = if online {
        styles::online_badge_style()
    } else {
        styles::offline_badge_style()
    };

    let mut spans = vec![
        Span::styled(if online { "● " } else { "○ " }, badge_style),
        Span::styled(badge.caption().to_owned(), styles::badge_caption_style()),
    ];

    if let Some(dot) = badge.indicator() {
        spans.push(Span::styled(format!(" ({})", dot.label()), badge_style));
    }

    Line::from(spans)
}

fn render_tags_panel(frame: &mut Frame<'_>, area: Rect, tags: &TagFilterState) {
    match tags.mode() {
        SearchMode::Instant => render_instant_filter(frame, area, tags),
        SearchMode::Server => render_server_form(frame, area),
    }
}

fn render_instant_filter(frame: &mut Frame<'_>, area: Rect, tags: &TagFilterState) {
    let [input_area, list_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .areas(area);

    let input_line = Line::from(vec![
        Span::styled(PROMPT_SYMBOL, styles::input_prompt_style()),
        Span::styled(tags.input().to_owned(), styles::input_text_style()),
    ]);
    let input = Paragraph::new(input_line).block(
        Block::default()
            .title("Filter tags")
            .borders(Borders::ALL),
    );
    frame.render_widget(input, input_area);

    // Inner width = area width - 2 (borders)
    let inner_width = list_area.width.saturating_sub(2) as usize;
    let items = build_tag_items(tags, inner_width);
    let title = format!("Tags ({})", tags.visible_count());
    let list = List::new(items).block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(list, list_area);
}

fn build_tag_items(tags: &TagFilterState, inner_width: usize) -> Vec<ListItem<'static>> {
    if tags.shows_no_results() {
        return vec![ListItem::new(Line::from(Span::styled(
            NO_RESULTS_TEXT,
            styles::no_results_style(),
        )))];
    }

    tags.cards()
        .iter()
        .enumerate()
        .filter(|(index, _)| tags.is_visible(*index))
        .map(|(_, card)| {
            let mut spans = vec![Span::styled(card.name().to_owned(), styles::tag_name_style())];

            if let Some(description) = card.description() {
                let room = inner_width.saturating_sub(card.name().width() + 2);
                spans.push(Span::styled(
                    format!("  {}", truncate_to_width(description, room)),
                    styles::tag_description_style(),
                ));
            }

            ListItem::new(Line::from(spans))
        })
        .collect()
}

fn render_server_form(frame: &mut Frame<'_>, area: Rect) {
    let lines = vec![
        Line::from("Server search"),
        Line::from(""),
        Line::from("The instant filter is off. Submit a query to search every tag on the server."),
        Line::from(Span::styled(
            "Press Tab to switch back to the instant filter.",
            styles::status_hint_style(),
        )),
    ];
    let form = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Search tags").borders(Borders::ALL));
    frame.render_widget(form, area);
}

fn status_line(state: &ShellState) -> Line<'static> {
    let connection_state = state.connection_state();
    let connected = connection_state == ConnectionState::Connected;
    let connection_text = match connection_state {
        ConnectionState::Connected => "connected",
        ConnectionState::Connecting => "connecting",
        ConnectionState::Disconnected => "disconnected",
    };

    let updated = match state.last_presence_update_unix_ms() {
        Some(timestamp_ms) => format!("last update {}", format_clock_time(timestamp_ms)),
        None => "no updates yet".to_owned(),
    };

    Line::from(vec![
        Span::styled(
            format!(" {connection_text} "),
            styles::connection_style(connected),
        ),
        Span::raw(format!("| {updated}")),
        Span::styled(
            "  Tab: search mode  Esc: clear  Ctrl-C: quit",
            styles::status_hint_style(),
        ),
    ])
}

fn format_clock_time(timestamp_ms: i64) -> String {
    use chrono::{Local, TimeZone};

    match Local.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(dt) => dt.format("%H:%M:%S").to_string(),
        chrono::LocalResult::Ambiguous(dt, _) => dt.format("%H:%M:%S").to_string(),
        chrono::LocalResult::None => "--:--:--".to_owned(),
    }
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_owned();
    }

    if max_width == 0 {
        return String::new();
    }

    let mut truncated = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let char_width = ch.width().unwrap_or(0);
        if used + char_width + 1 > max_width {
            break;
        }
        used += char_width;
        truncated.push(ch);
    }
    truncated.push('…');
    truncated
}
