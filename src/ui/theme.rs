//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{AlertSeverity, Severity};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for normal readings and success alerts.
    pub normal: Color,
    /// Color for warning readings and alerts.
    pub warning: Color,
    /// Color for danger readings and alerts.
    pub danger: Color,
    /// Color for informational alerts.
    pub info: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for panel titles.
    pub header: Style,
    /// Style for the active chart tab.
    pub tab_active: Style,
    /// Style for inactive chart tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            normal: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
            info: Color::Blue,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            normal: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
            info: Color::Blue,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get style for a reading severity
    pub fn status_style(&self, severity: Severity) -> Style {
        match severity {
            Severity::Normal => Style::default().fg(self.normal),
            Severity::Warning => Style::default().fg(self.warning),
            Severity::Danger => Style::default().fg(self.danger).add_modifier(Modifier::BOLD),
        }
    }

    /// Get style for an alert entry
    pub fn alert_style(&self, severity: AlertSeverity) -> Style {
        match severity {
            AlertSeverity::Info => Style::default().fg(self.info),
            AlertSeverity::Success => Style::default().fg(self.normal),
            AlertSeverity::Warning => Style::default().fg(self.warning),
            AlertSeverity::Danger => Style::default().fg(self.danger).add_modifier(Modifier::BOLD),
        }
    }

    /// Border style for panels.
    pub fn block_border(&self) -> Style {
        Style::default().fg(self.border)
    }
}
