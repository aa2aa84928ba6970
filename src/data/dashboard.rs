//! The dashboard core: one explicit state object with event handlers.
//!
//! The hosting runtime calls the `on_*` handlers as events arrive (inbound
//! messages, refresh ticks, connection changes). Every handler takes `&mut
//! self` and runs to completion, so readers never observe a half-applied
//! update. Handlers take the current instant explicitly, which keeps expiry
//! deterministic under test.

use std::time::Instant;

use tracing::{debug, info, warn};

use super::alerts::{AlertEntry, AlertFeed, AlertSeverity};
use super::reading::{normalize, AlertSignal, Metric, Normalized, Reading};
use super::store::{SensorSnapshot, SensorStore};
use super::thresholds::{classify, worst, Severity, Thresholds};
use crate::config::Topics;
use crate::error::{DashboardError, Result};

/// An outbound relay command ready to be published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayCommand {
    pub topic: String,
    pub payload: String,
}

/// Sensor state, alerts and connection status for one dashboard session.
#[derive(Debug, Clone)]
pub struct Dashboard {
    topics: Topics,
    thresholds: Thresholds,
    store: SensorStore,
    alerts: AlertFeed,
    connected: bool,
    last_tick: Option<Instant>,
    last_message: Option<Instant>,
}

impl Dashboard {
    /// Create an empty dashboard.
    pub fn new(topics: Topics, thresholds: Thresholds) -> Self {
        Self {
            topics,
            thresholds,
            store: SensorStore::new(),
            alerts: AlertFeed::new(),
            connected: false,
            last_tick: None,
            last_message: None,
        }
    }

    /// Handle an inbound message: normalize it and dispatch the result.
    pub fn on_message(&mut self, topic: &str, payload: &str, now: Instant) -> Normalized {
        debug!("{} = {}", topic, payload);

        let normalized = normalize(&self.topics, topic, payload, now);
        match &normalized {
            Normalized::Reading(reading) => {
                self.last_message = Some(now);
                self.on_reading(reading.clone());
            }
            Normalized::Alert(signal) => {
                self.last_message = Some(now);
                self.on_alert_signal(signal, now);
            }
            Normalized::Unrecognized => {}
        }
        normalized
    }

    /// Apply a decoded reading to the store.
    pub fn on_reading(&mut self, reading: Reading) {
        self.store.apply_reading(reading);
    }

    /// Turn an alert signal into a feed entry.
    pub fn on_alert_signal(&mut self, signal: &AlertSignal, now: Instant) -> AlertEntry {
        info!("Alert signal received: {}", signal.code());
        let (message, severity) = signal.alert();
        self.push_alert(message, severity, now)
    }

    /// Refresh tick: expire due alerts.
    ///
    /// Returns the number of alerts removed.
    pub fn on_tick(&mut self, now: Instant) -> usize {
        self.last_tick = Some(now);
        self.alerts.expire_due(now)
    }

    pub fn on_connect(&mut self, now: Instant) {
        info!("Connected to broker");
        self.connected = true;
        self.push_alert("Connected to MQTT broker", AlertSeverity::Success, now);
    }

    pub fn on_error(&mut self, err: &str, now: Instant) {
        warn!("Connection error: {}", err);
        self.connected = false;
        self.push_alert("MQTT connection error", AlertSeverity::Danger, now);
    }

    pub fn on_offline(&mut self, now: Instant) {
        warn!("Broker connection lost");
        self.connected = false;
        self.push_alert("MQTT connection lost", AlertSeverity::Warning, now);
    }

    /// Note an operator-requested reconnect.
    pub fn on_reconnect(&mut self, now: Instant) {
        info!("Reconnecting");
        self.connected = false;
        self.push_alert("Reconnecting...", AlertSeverity::Info, now);
    }

    /// Build a relay command for publishing.
    ///
    /// Rejected locally while disconnected: a warning alert is raised and no
    /// command is produced.
    pub fn relay_command(&mut self, state: &str, now: Instant) -> Result<RelayCommand> {
        if !self.connected {
            self.push_alert("Not connected to MQTT broker", AlertSeverity::Warning, now);
            return Err(DashboardError::NotConnected);
        }

        info!("Setting relay to: {}", state);
        self.push_alert(format!("Relay command sent: {}", state), AlertSeverity::Info, now);
        Ok(RelayCommand {
            topic: self.topics.relay_command.clone(),
            payload: state.to_string(),
        })
    }

    /// Add an alert to the feed.
    pub fn push_alert(
        &mut self,
        message: impl Into<String>,
        severity: AlertSeverity,
        now: Instant,
    ) -> AlertEntry {
        let entry = self.alerts.push(message, severity, now);
        debug!("[{}] {}", severity.label(), entry.message);
        entry
    }

    pub fn snapshot(&self) -> SensorSnapshot {
        self.store.current_snapshot()
    }

    pub fn store(&self) -> &SensorStore {
        &self.store
    }

    pub fn history_length(&self, metric: Metric) -> usize {
        self.store.history_length(metric)
    }

    /// Classify a metric's current value.
    pub fn classify(&self, metric: Metric) -> Severity {
        classify(metric, &self.store.current_snapshot(), &self.thresholds)
    }

    /// Classify every metric against one snapshot.
    pub fn severities(&self) -> Vec<(Metric, Severity)> {
        let snapshot = self.store.current_snapshot();
        Metric::ALL.iter().map(|m| (*m, classify(*m, &snapshot, &self.thresholds))).collect()
    }

    /// Worst severity across all metrics.
    pub fn overall_severity(&self) -> Severity {
        worst(&self.store.current_snapshot(), &self.thresholds)
    }

    pub fn alerts(&self) -> &AlertFeed {
        &self.alerts
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn last_tick(&self) -> Option<Instant> {
        self.last_tick
    }

    pub fn last_message(&self) -> Option<Instant> {
        self.last_message
    }
}
