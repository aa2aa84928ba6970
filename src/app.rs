//! Application state and command routing.
//!
//! [`App`] hosts the [`Dashboard`] core: it owns the broker transport, feeds
//! transport events into the core's handlers, drives the refresh tick, and
//! routes operator commands (relay, reconnect, export) through the core.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{info, warn};

use crate::config::UiConfig;
use crate::data::{AlertSeverity, Dashboard, Metric};
use crate::error::DashboardError;
use crate::source::{Connector, Transport, TransportEvent};
use crate::ui::Theme;

/// Payload published to switch the relay on.
pub const RELAY_ON: &str = "ON";
/// Payload published to switch the relay off.
pub const RELAY_OFF: &str = "OFF";

/// How long a status bar message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Step to the next time-series metric for the chart panel.
fn next_series(metric: Metric) -> Metric {
    match metric {
        Metric::Temperature => Metric::Humidity,
        Metric::Humidity => Metric::Light,
        Metric::Light => Metric::Gas,
        _ => Metric::Temperature,
    }
}

/// Step to the previous time-series metric for the chart panel.
fn prev_series(metric: Metric) -> Metric {
    match metric {
        Metric::Humidity => Metric::Temperature,
        Metric::Light => Metric::Humidity,
        Metric::Gas => Metric::Light,
        _ => Metric::Gas,
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    /// Metric shown in the chart panel.
    pub chart_metric: Metric,

    // Core and transport
    pub dashboard: Dashboard,
    connector: Box<dyn Connector>,
    transport: Option<Box<dyn Transport>>,

    // UI
    pub ui: UiConfig,
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App. No connection is made until [`App::connect`].
    pub fn new(connector: Box<dyn Connector>, dashboard: Dashboard, ui: UiConfig) -> Self {
        Self {
            running: true,
            show_help: false,
            chart_metric: Metric::Temperature,
            dashboard,
            connector,
            transport: None,
            ui,
            theme: Theme::dark(),
            status_message: None,
        }
    }

    /// Use a specific theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Returns a description of the current transport.
    pub fn source_description(&self) -> &str {
        self.transport.as_ref().map_or("not connected", |t| t.description())
    }

    /// Whether a transport is currently held.
    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    /// Open a broker connection.
    ///
    /// Any existing connection is closed first.
    pub fn connect(&mut self) {
        self.disconnect();

        match self.connector.connect() {
            Ok(transport) => {
                info!("Transport opened: {}", transport.description());
                self.transport = Some(transport);
            }
            Err(e) => {
                warn!("Failed to initialize MQTT: {}", e);
                self.dashboard.on_error(&e.to_string(), Instant::now());
            }
        }
    }

    /// Close the current connection, if any.
    pub fn disconnect(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
    }

    /// Tear down the connection and open a new one.
    pub fn reconnect(&mut self) {
        info!("Reconnecting...");
        self.disconnect();
        self.dashboard.on_reconnect(Instant::now());
        self.connect();
    }

    /// Feed every pending transport event into the dashboard.
    ///
    /// Returns the number of events processed.
    pub fn pump(&mut self, now: Instant) -> usize {
        let Some(transport) = self.transport.as_mut() else {
            return 0;
        };

        let mut processed = 0;
        while let Some(event) = transport.poll() {
            processed += 1;
            match event {
                TransportEvent::Connected => self.dashboard.on_connect(now),
                TransportEvent::Message { topic, payload } => {
                    self.dashboard.on_message(&topic, &payload, now);
                }
                TransportEvent::Error(err) => self.dashboard.on_error(&err, now),
                TransportEvent::Offline => self.dashboard.on_offline(now),
            }
        }
        processed
    }

    /// Refresh tick: expire alerts.
    pub fn tick(&mut self, now: Instant) {
        self.dashboard.on_tick(now);
    }

    /// Ask the device to switch the relay.
    ///
    /// The relay state shown on screen only changes once the device reports
    /// it on the relay state topic.
    pub fn set_relay(&mut self, state: &str) {
        let now = Instant::now();
        let command = match self.dashboard.relay_command(state, now) {
            Ok(command) => command,
            Err(e) => {
                self.set_status_message(e.to_string());
                return;
            }
        };

        let qos = self.connector.qos();
        let result = match self.transport.as_mut() {
            Some(transport) => transport.publish(&command.topic, &command.payload, qos),
            None => Err(DashboardError::NotConnected),
        };

        if let Err(e) = result {
            warn!("Relay command failed: {}", e);
            self.dashboard.push_alert(
                format!("Relay command failed: {}", e),
                AlertSeverity::Warning,
                now,
            );
        }
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Show the next metric in the chart panel.
    pub fn next_chart(&mut self) {
        self.chart_metric = next_series(self.chart_metric);
    }

    /// Show the previous metric in the chart panel.
    pub fn prev_chart(&mut self) {
        self.chart_metric = prev_series(self.chart_metric);
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Whether a metric's last value is older than the configured limit.
    pub fn is_stale(&self, metric: Metric, now: Instant) -> bool {
        self.dashboard.store().is_stale(metric, now, self.ui.stale_after())
    }

    /// Close the connection and stop the main loop.
    pub fn quit(&mut self) {
        self.disconnect();
        self.running = false;
    }

    /// Export current state to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        use std::io::Write;

        let snapshot = self.dashboard.snapshot();

        let sensors: serde_json::Map<String, serde_json::Value> = self
            .dashboard
            .severities()
            .into_iter()
            .map(|(metric, severity)| {
                let key = serde_json::to_value(metric)?
                    .as_str()
                    .unwrap_or(metric.label())
                    .to_string();
                let value = serde_json::json!({
                    "value": snapshot.value(metric),
                    "severity": severity,
                    "history_length": self.dashboard.history_length(metric),
                });
                Ok((key, value))
            })
            .collect::<Result<_, serde_json::Error>>()?;

        let alerts: Vec<serde_json::Value> = self
            .dashboard
            .alerts()
            .entries()
            .map(|a| {
                serde_json::json!({
                    "message": a.message,
                    "severity": a.severity,
                })
            })
            .collect();

        let export = serde_json::json!({
            "connected": self.dashboard.is_connected(),
            "source": self.source_description(),
            "thresholds": self.dashboard.thresholds(),
            "sensors": sensors,
            "alerts": alerts,
        });

        let json = serde_json::to_string_pretty(&export)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Topics;
    use crate::data::Thresholds;
    use crate::source::ChannelConnector;

    fn app() -> (tokio::sync::mpsc::UnboundedReceiver<crate::source::ChannelHandle>, App) {
        let (handles, connector) = ChannelConnector::create("test");
        let dashboard = Dashboard::new(Topics::default(), Thresholds::default());
        (handles, App::new(Box::new(connector), dashboard, UiConfig::default()))
    }

    #[test]
    fn test_chart_cycles_through_series() {
        let (_handles, mut app) = app();
        assert_eq!(app.chart_metric, Metric::Temperature);

        for expected in [Metric::Humidity, Metric::Light, Metric::Gas, Metric::Temperature] {
            app.next_chart();
            assert_eq!(app.chart_metric, expected);
        }

        app.prev_chart();
        assert_eq!(app.chart_metric, Metric::Gas);
    }

    #[test]
    fn test_pump_without_transport() {
        let (_handles, mut app) = app();
        assert_eq!(app.pump(Instant::now()), 0);
        assert_eq!(app.source_description(), "not connected");
    }

    #[test]
    fn test_status_message() {
        let (_handles, mut app) = app();
        assert!(app.get_status_message().is_none());
        app.set_status_message("hello".to_string());
        assert_eq!(app.get_status_message(), Some("hello"));
    }

    #[test]
    fn test_quit_closes_transport() {
        let (mut handles, mut app) = app();
        app.connect();
        let handle = handles.try_recv().unwrap();

        app.quit();
        assert!(!app.running);
        assert!(!app.has_transport());
        assert!(handle.is_closed());
    }

    #[test]
    fn test_export_state() {
        let (mut handles, mut app) = app();
        app.connect();
        let handle = handles.try_recv().unwrap();
        handle.events.send(TransportEvent::Connected).unwrap();
        handle
            .events
            .send(TransportEvent::Message {
                topic: "esp32/sensor/gas".into(),
                payload: "150".into(),
            })
            .unwrap();
        app.pump(Instant::now());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        app.export_state(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["connected"], true);
        assert_eq!(json["sensors"]["gas"]["value"], 150);
        assert_eq!(json["sensors"]["gas"]["severity"], "danger");
        assert_eq!(json["sensors"]["temperature"]["value"], serde_json::Value::Null);
        assert_eq!(json["thresholds"]["gas_warning"], 100.0);
        assert_eq!(json["alerts"][0]["severity"], "success");
    }
}
