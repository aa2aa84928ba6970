use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, RELAY_OFF, RELAY_ON};

/// File written by the export key.
pub const EXPORT_PATH: &str = "sensordash_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // Relay
        KeyCode::Char('1') => app.set_relay(RELAY_ON),
        KeyCode::Char('0') => app.set_relay(RELAY_OFF),

        // Chart selection
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_chart();
            } else {
                app.next_chart();
            }
        }
        KeyCode::BackTab => app.prev_chart(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_chart(),
        KeyCode::Right | KeyCode::Char('l') => app.next_chart(),

        // Reconnect
        KeyCode::Char('r') => {
            app.reconnect();
            app.set_status_message("Reconnecting...".to_string());
        }

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        // Export
        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_PATH);
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        // Scroll wheel cycles the chart
        MouseEventKind::ScrollUp => app.prev_chart(),
        MouseEventKind::ScrollDown => app.next_chart(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use crossterm::event::{KeyEventKind, KeyEventState, MouseButton};
    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;
    use crate::config::{Topics, UiConfig};
    use crate::data::{AlertSeverity, Dashboard, Metric, Thresholds};
    use crate::source::{ChannelConnector, ChannelHandle, TransportEvent};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn connected_app() -> (UnboundedReceiver<ChannelHandle>, ChannelHandle, App) {
        let (mut handles, connector) = ChannelConnector::create("test");
        let dashboard = Dashboard::new(Topics::default(), Thresholds::default());
        let mut app = App::new(Box::new(connector), dashboard, UiConfig::default());
        app.connect();
        let handle = handles.try_recv().unwrap();
        handle.events.send(TransportEvent::Connected).unwrap();
        app.pump(Instant::now());
        (handles, handle, app)
    }

    #[test]
    fn test_relay_keys_publish_commands() {
        let (_handles, mut handle, mut app) = connected_app();

        handle_key_event(&mut app, key(KeyCode::Char('1')));
        handle_key_event(&mut app, key(KeyCode::Char('0')));

        let on = handle.published.try_recv().unwrap();
        assert_eq!(on.topic, "esp32/relay/cmd");
        assert_eq!(on.payload, "ON");
        let off = handle.published.try_recv().unwrap();
        assert_eq!(off.payload, "OFF");

        let latest = app.dashboard.alerts().entries().next().unwrap();
        assert_eq!(latest.message, "Relay command sent: OFF");
        assert_eq!(latest.severity, AlertSeverity::Info);
    }

    #[test]
    fn test_help_swallows_next_key() {
        let (_handles, _handle, mut app) = connected_app();

        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);

        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);

        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn test_chart_navigation_keys() {
        let (_handles, _handle, mut app) = connected_app();

        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.chart_metric, Metric::Humidity);
        handle_key_event(&mut app, key(KeyCode::Left));
        assert_eq!(app.chart_metric, Metric::Temperature);
        handle_key_event(&mut app, key(KeyCode::BackTab));
        assert_eq!(app.chart_metric, Metric::Gas);

        let scroll = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse_event(&mut app, scroll);
        assert_eq!(app.chart_metric, Metric::Temperature);

        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            ..scroll
        };
        handle_mouse_event(&mut app, click);
        assert_eq!(app.chart_metric, Metric::Temperature);
    }

    #[test]
    fn test_reconnect_key_replaces_transport() {
        let (mut handles, old, mut app) = connected_app();

        handle_key_event(&mut app, key(KeyCode::Char('r')));

        assert!(old.is_closed());
        let new = handles.try_recv().unwrap();
        assert!(!new.is_closed());
        assert!(!app.dashboard.is_connected());
        assert_eq!(app.get_status_message(), Some("Reconnecting..."));
    }
}
