//! Alert feed panel.

use std::time::Instant;

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::AlertEntry;

/// Age of an alert as shown in the feed.
pub fn format_age(entry: &AlertEntry, now: Instant) -> String {
    let secs = now.saturating_duration_since(entry.created_at).as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else {
        format!("{}m", secs / 60)
    }
}

/// Render the alert list, most recent first.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let feed = app.dashboard.alerts();
    let block = Block::default()
        .title(format!(" Alerts ({}) ", feed.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(app.theme.block_border());

    if feed.is_empty() {
        let paragraph = Paragraph::new("No alerts")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let now = Instant::now();
    let dim = Style::default().add_modifier(Modifier::DIM);
    let items: Vec<ListItem> = feed
        .entries()
        .map(|entry| {
            let style = app.theme.alert_style(entry.severity);
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>3} ", format_age(entry, now)), dim),
                Span::styled(format!("{:<7} ", entry.severity.label()), style),
                Span::styled(entry.message.clone(), style),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
