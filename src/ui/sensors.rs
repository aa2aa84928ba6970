//! Sensor cards.
//!
//! One card per metric showing the latest value, its severity and, for the
//! time-series metrics, a gauge of the value against the sensor's range.

use std::time::Instant;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{classify, Metric, ReadingValue, SensorSnapshot, Severity};

/// Placeholder for absent or unusable values.
pub const NO_VALUE: &str = "--";

/// Full-scale value of each gauge.
pub fn gauge_scale(metric: Metric) -> Option<f64> {
    match metric {
        Metric::Temperature => Some(50.0),
        Metric::Humidity => Some(100.0),
        Metric::Light => Some(65535.0),
        Metric::Gas => Some(500.0),
        Metric::Motion | Metric::RelayState => None,
    }
}

/// Format a metric value for display, without its unit.
pub fn format_value(metric: Metric, value: Option<&ReadingValue>) -> String {
    let Some(value) = value else {
        return NO_VALUE.to_string();
    };

    match (metric, value) {
        (Metric::Motion, ReadingValue::Bool(true)) => "Detected".to_string(),
        (Metric::Motion, ReadingValue::Bool(false)) => "None".to_string(),
        (_, ReadingValue::Text(text)) if text.is_empty() => NO_VALUE.to_string(),
        (_, ReadingValue::Text(text)) => text.clone(),
        (_, ReadingValue::Bool(b)) => b.to_string(),
        (_, ReadingValue::Integer(Some(n))) => n.to_string(),
        (_, ReadingValue::Integer(None)) => NO_VALUE.to_string(),
        (Metric::Temperature, ReadingValue::Float(v)) if v.is_finite() => format!("{:.1}", v),
        (_, ReadingValue::Float(v)) if v.is_finite() => format!("{:.0}", v),
        (_, ReadingValue::Float(_)) => NO_VALUE.to_string(),
    }
}

/// Fill ratio of a metric's gauge, clamped to `[0, 1]`.
///
/// Absent and non-finite values give an empty gauge.
pub fn gauge_ratio(metric: Metric, value: Option<&ReadingValue>) -> Option<f64> {
    let scale = gauge_scale(metric)?;
    let ratio = value
        .and_then(ReadingValue::finite)
        .map_or(0.0, |v| (v / scale).clamp(0.0, 1.0));
    Some(ratio)
}

/// Render all sensor cards side by side.
pub fn render(frame: &mut Frame, app: &App, snapshot: &SensorSnapshot, area: Rect) {
    let columns = Layout::horizontal(Metric::ALL.map(|_| Constraint::Ratio(1, 6))).split(area);
    let now = Instant::now();

    for (metric, column) in Metric::ALL.iter().zip(columns.iter()) {
        render_card(frame, app, snapshot, *metric, *column, now);
    }
}

fn render_card(
    frame: &mut Frame,
    app: &App,
    snapshot: &SensorSnapshot,
    metric: Metric,
    area: Rect,
    now: Instant,
) {
    let severity = classify(metric, snapshot, app.dashboard.thresholds());
    let stale = app.is_stale(metric, now);
    let store = app.dashboard.store();
    let value = snapshot.value(metric);

    let mut border_style = match severity {
        Severity::Normal => app.theme.block_border(),
        _ => app.theme.status_style(severity),
    };
    if stale {
        border_style = border_style.add_modifier(Modifier::DIM);
    }

    let block = Block::default()
        .title(format!(" {} ", metric.label()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical([
        Constraint::Length(1), // Value
        Constraint::Length(1), // Severity / age
        Constraint::Length(1), // Gauge
        Constraint::Min(0),
    ])
    .split(inner);

    let text = format_value(metric, value);
    let mut value_style = app.theme.status_style(severity).add_modifier(Modifier::BOLD);
    if stale {
        value_style = value_style.add_modifier(Modifier::DIM);
    }
    let mut spans = vec![Span::styled(text.clone(), value_style)];
    if text != NO_VALUE && !metric.unit().is_empty() {
        spans.push(Span::raw(format!(" {}", metric.unit())));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), rows[0]);

    let status = match store.age(metric, now) {
        Some(age) if stale => format!("stale {}s", age.as_secs()),
        Some(_) => severity.label().to_string(),
        None => "no data".to_string(),
    };
    frame.render_widget(
        Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM)),
        rows[1],
    );

    if let Some(ratio) = gauge_ratio(metric, value) {
        let gauge = Gauge::default()
            .gauge_style(app.theme.status_style(severity))
            .ratio(ratio)
            .label(format!("{:.0}%", ratio * 100.0))
            .use_unicode(true);
        frame.render_widget(gauge, rows[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_numeric_values() {
        assert_eq!(
            format_value(Metric::Temperature, Some(&ReadingValue::Float(23.456))),
            "23.5"
        );
        assert_eq!(format_value(Metric::Humidity, Some(&ReadingValue::Float(61.2))), "61");
        assert_eq!(
            format_value(Metric::Light, Some(&ReadingValue::Integer(Some(830)))),
            "830"
        );
        assert_eq!(format_value(Metric::Gas, Some(&ReadingValue::Integer(Some(-3)))), "-3");
    }

    #[test]
    fn test_format_missing_values() {
        assert_eq!(format_value(Metric::Temperature, None), NO_VALUE);
        assert_eq!(
            format_value(Metric::Temperature, Some(&ReadingValue::Float(f64::NAN))),
            NO_VALUE
        );
        assert_eq!(
            format_value(Metric::Humidity, Some(&ReadingValue::Float(f64::INFINITY))),
            NO_VALUE
        );
        assert_eq!(format_value(Metric::Gas, Some(&ReadingValue::Integer(None))), NO_VALUE);
        assert_eq!(format_value(Metric::RelayState, None), NO_VALUE);
        assert_eq!(
            format_value(Metric::RelayState, Some(&ReadingValue::Text(String::new()))),
            NO_VALUE
        );
    }

    #[test]
    fn test_format_motion_and_relay() {
        assert_eq!(format_value(Metric::Motion, Some(&ReadingValue::Bool(true))), "Detected");
        assert_eq!(format_value(Metric::Motion, Some(&ReadingValue::Bool(false))), "None");
        assert_eq!(
            format_value(Metric::RelayState, Some(&ReadingValue::Text("ON".into()))),
            "ON"
        );
    }

    #[test]
    fn test_gauge_ratio() {
        assert_eq!(gauge_ratio(Metric::Temperature, Some(&ReadingValue::Float(25.0))), Some(0.5));
        assert_eq!(gauge_ratio(Metric::Humidity, Some(&ReadingValue::Float(150.0))), Some(1.0));
        assert_eq!(gauge_ratio(Metric::Gas, Some(&ReadingValue::Integer(Some(-10)))), Some(0.0));
        assert_eq!(gauge_ratio(Metric::Light, Some(&ReadingValue::Integer(None))), Some(0.0));
        assert_eq!(gauge_ratio(Metric::Light, None), Some(0.0));
        assert_eq!(gauge_ratio(Metric::Motion, Some(&ReadingValue::Bool(true))), None);
    }
}
