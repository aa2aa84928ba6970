//! History chart for the selected time-series metric.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::Line,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Tabs},
    Frame,
};

use crate::app::App;
use crate::data::{classify, Metric, SensorSnapshot};

/// Chart points for a history copy: `(index, value)`, non-finite values skipped.
pub fn chart_points(history: &[f64]) -> Vec<(f64, f64)> {
    history
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, v)| (i as f64, *v))
        .collect()
}

/// Pad history bounds into Y axis bounds; `[0, 1]` when there is nothing to chart.
pub fn y_bounds(bounds: Option<(f64, f64)>) -> [f64; 2] {
    let Some((min, max)) = bounds else {
        return [0.0, 1.0];
    };
    let pad = ((max - min) * 0.1).max(1.0);
    [min - pad, max + pad]
}

/// Render the chart tabs and the chart itself.
pub fn render(frame: &mut Frame, app: &App, snapshot: &SensorSnapshot, area: Rect) {
    let block = Block::default()
        .title(" History ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(app.theme.block_border());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).split(inner);

    render_tabs(frame, app, chunks[0]);

    let metric = app.chart_metric;
    let Some(buffer) = app.dashboard.store().buffer(metric) else {
        return;
    };
    let history = buffer.to_vec();
    let points = chart_points(&history);

    if points.is_empty() {
        let paragraph = Paragraph::new(format!("No {} data yet", metric.label().to_lowercase()))
            .style(Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(paragraph, chunks[1]);
        return;
    }

    let [y_min, y_max] = y_bounds(buffer.bounds());
    let x_max = (history.len().max(2) - 1) as f64;
    let severity = classify(metric, snapshot, app.dashboard.thresholds());

    let dataset = Dataset::default()
        .name(metric.label())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(app.theme.status_style(severity))
        .data(&points);

    let label_style = Style::default().add_modifier(Modifier::DIM);
    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .style(label_style)
                .bounds([0.0, x_max])
                .labels(["oldest", "latest"]),
        )
        .y_axis(
            Axis::default()
                .title(metric.unit())
                .style(label_style)
                .bounds([y_min, y_max])
                .labels([format!("{:.0}", y_min), format!("{:.0}", y_max)]),
        );

    frame.render_widget(chart, chunks[1]);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Metric::SERIES
        .iter()
        .map(|m| Line::from(format!(" {} ", m.label())))
        .collect();

    let selected = Metric::SERIES
        .iter()
        .position(|m| *m == app.chart_metric)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::HistoryBuffer;

    #[test]
    fn test_chart_points_skip_non_finite() {
        let points = chart_points(&[20.0, f64::NAN, 22.0, f64::INFINITY]);
        assert_eq!(points, vec![(0.0, 20.0), (2.0, 22.0)]);
    }

    #[test]
    fn test_y_bounds() {
        assert_eq!(y_bounds(None), [0.0, 1.0]);
        assert_eq!(y_bounds(Some((10.0, 10.0))), [9.0, 11.0]);
        assert_eq!(y_bounds(Some((0.0, 100.0))), [-10.0, 110.0]);
    }

    #[test]
    fn test_y_bounds_from_history() {
        let mut buffer = HistoryBuffer::new();
        for v in [20.0, f64::NAN, 30.0] {
            buffer.push(v);
        }
        assert_eq!(y_bounds(buffer.bounds()), [19.0, 31.0]);
    }
}
