//! Common UI components shared across panels.
//!
//! This module contains the header bar, status bar, and help overlay.

use std::time::Instant;

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::thresholds::worst;
use crate::data::{Metric, SensorSnapshot};

use super::{MIN_HEIGHT, MIN_WIDTH};

const CONTROLS: &str = "1:relay on 0:relay off Tab:chart r:reconnect e:export ?:help q:quit";

/// Render the header bar with connection state and overall health.
///
/// Displays: connection indicator, transport, worst severity, alert count.
pub fn render_header(frame: &mut Frame, app: &App, snapshot: &SensorSnapshot, area: Rect) {
    let connected = app.dashboard.is_connected();
    let (dot_style, status) = if connected {
        (Style::default().fg(app.theme.normal), "Connected")
    } else {
        (Style::default().fg(app.theme.danger), "Disconnected")
    };

    let worst = worst(snapshot, app.dashboard.thresholds());
    let alert_count = app.dashboard.alerts().len();

    let line = Line::from(vec![
        Span::styled(" ● ", dot_style),
        Span::styled("SENSORDASH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(status, dot_style),
        Span::raw(" │ "),
        Span::styled(
            app.source_description().to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ),
        Span::raw(" │ "),
        Span::styled(worst.symbol(), app.theme.status_style(worst)),
        Span::raw(" │ "),
        if alert_count > 0 {
            Span::styled(
                format!("{}", alert_count),
                Style::default().add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" alerts"),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows: time since last message, data points, available controls.
/// Also displays temporary status messages.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let updated = match app.dashboard.last_message() {
        Some(at) => format!(
            "Updated {:.1}s ago",
            Instant::now().saturating_duration_since(at).as_secs_f64()
        ),
        None => "Waiting for data...".to_string(),
    };

    let status = format!(
        " {} | Data points: {} | {}",
        updated,
        app.dashboard.history_length(Metric::Temperature),
        CONTROLS,
    );

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Key bindings shown in the help overlay, grouped by section.
const KEY_HELP: &[(&str, &[(&str, &str)])] = &[
    ("Relay", &[("1", "Switch relay ON"), ("0", "Switch relay OFF")]),
    ("Chart", &[("Tab ←/→", "Cycle metric")]),
    (
        "General",
        &[("r", "Reconnect"), ("e", "Export to JSON"), ("q", "Quit")],
    ),
];

/// Render the help overlay with keyboard shortcuts and active thresholds.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::styled("Keyboard Shortcuts", app.theme.header)];

    for (section, keys) in KEY_HELP {
        lines.push(Line::raw(""));
        lines.push(Line::styled(format!(" {}", section), bold));
        lines.extend(
            keys.iter()
                .map(|(key, action)| Line::raw(format!("  {:<12}{}", key, action))),
        );
    }

    let thresholds = app.dashboard.thresholds();
    lines.push(Line::raw(""));
    lines.push(Line::styled(" Thresholds", bold));
    lines.push(Line::raw(format!("  Temperature > {}", thresholds.temp_warning)));
    lines.push(Line::raw(format!("  Gas         > {}", thresholds.gas_warning)));
    lines.push(Line::raw(format!("  Light       < {}", thresholds.light_low)));
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "Press any key to close",
        Style::default().add_modifier(Modifier::DIM),
    ));

    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let width = 40u16.min(area.width.saturating_sub(4));
    let overlay = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(Clear, overlay);
    frame.render_widget(Paragraph::new(lines).block(block), overlay);
}

/// Render a notice when the terminal is below the minimum size.
pub fn render_too_small(frame: &mut Frame, area: Rect) {
    let msg = format!(
        "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
        area.width, area.height, MIN_WIDTH, MIN_HEIGHT
    );
    let paragraph = Paragraph::new(msg)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    let height = 5.min(area.height);
    let centered = Rect::new(area.x, area.y + (area.height - height) / 2, area.width, height);
    frame.render_widget(paragraph, centered);
}
