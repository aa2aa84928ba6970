//! Terminal UI rendering using ratatui.
//!
//! Each panel is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`sensors`]: Sensor cards with values, severity colors and gauges
//! - [`charts`]: Line chart of the selected metric's rolling history
//! - [`alerts`]: Alert feed, most recent first
//! - [`common`]: Shared components (header, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Sensor cards (sensors::render)       │
//! ├────────────────────────┬─────────────┤
//! │ Chart (charts::render) │ Alerts      │
//! │                        │ (alerts::   │
//! │                        │  render)    │
//! ├────────────────────────┴─────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlay rendered on top:
//!    - common::render_help
//! ```

pub mod alerts;
pub mod charts;
pub mod common;
pub mod sensors;
pub mod theme;

use ratatui::layout::{Constraint, Layout};
use ratatui::Frame;

pub use theme::Theme;

use crate::app::App;

/// Minimum terminal size for usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 16;

/// Draw the whole dashboard.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        common::render_too_small(frame, area);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(8), // Sensor cards
        Constraint::Min(6),    // Chart and alerts
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    // One copy of the sensor state per frame
    let snapshot = app.dashboard.snapshot();

    common::render_header(frame, app, &snapshot, chunks[0]);
    sensors::render(frame, app, &snapshot, chunks[1]);

    let bottom = Layout::horizontal([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[2]);
    charts::render(frame, app, &snapshot, bottom[0]);
    alerts::render(frame, app, bottom[1]);

    common::render_status_bar(frame, app, chunks[3]);

    if app.show_help {
        common::render_help(frame, app, area);
    }
}
