//! # sensordash
//!
//! A terminal dashboard and library for ESP32 sensor nodes that publish over
//! MQTT.
//!
//! The node publishes temperature, humidity, light, gas, motion and relay state
//! on their own topics, plus alert codes on an alert topic. This crate
//! subscribes to those topics, keeps the latest value and a rolling history
//! per metric, classifies values against thresholds, maintains a short-lived
//! alert feed, and can switch the relay by publishing a command.
//!
//! ## Architecture
//!
//! ```text
//!  broker ──▶ Transport::poll() ──▶ App::pump() ──▶ Dashboard::on_*()
//!                                                        │
//!  keys ──▶ events ──▶ App::set_relay() ──▶ Transport::publish()
//!                                                        │
//!  refresh tick ──▶ App::tick() ──▶ ui::render() ◀── snapshot, alerts
//! ```
//!
//! - **[`data`]**: The dashboard core: payload normalization, latest values,
//!   rolling history, threshold classification and the alert feed
//! - **[`source`]**: Broker transport abstraction ([`Transport`] and
//!   [`Connector`] traits) with an MQTT and an in-memory implementation
//! - **[`config`]**: Layered configuration (defaults, file, environment)
//! - **[`app`]**: Hosts the core, pumps transport events into it and routes
//!   operator commands
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Public HiveMQ broker over secure websockets
//! sensordash
//!
//! # Local broker with a custom gas limit
//! sensordash --broker mqtt://localhost:1883 --gas-warning 150
//! ```
//!
//! ### As a library with the dashboard core only
//!
//! ```
//! use std::time::Instant;
//! use sensordash::{Dashboard, Metric, Severity, Thresholds, Topics};
//!
//! let mut dashboard = Dashboard::new(Topics::default(), Thresholds::default());
//! dashboard.on_message("esp32/sensor/temp", "41.5", Instant::now());
//! assert_eq!(dashboard.classify(Metric::Temperature), Severity::Danger);
//! ```
//!
//! ### As a library with a channel transport (for embedding)
//!
//! ```
//! use std::time::Instant;
//! use sensordash::{App, ChannelConnector, Dashboard, Thresholds, Topics, TransportEvent};
//! use sensordash::config::UiConfig;
//!
//! let (mut handles, connector) = ChannelConnector::create("embedded");
//! let dashboard = Dashboard::new(Topics::default(), Thresholds::default());
//! let mut app = App::new(Box::new(connector), dashboard, UiConfig::default());
//!
//! app.connect();
//! let handle = handles.try_recv().unwrap();
//! handle.events.send(TransportEvent::Connected).unwrap();
//! app.pump(Instant::now());
//! assert!(app.dashboard.is_connected());
//! ```
//!
//! ### As a library with a live broker
//!
//! ```no_run
//! use sensordash::{AppConfig, Connector, MqttConnector};
//!
//! # tokio_test::block_on(async {
//! let config = AppConfig::load(None).unwrap();
//! let mut connector = MqttConnector::new(
//!     config.broker,
//!     config.topics,
//!     tokio::runtime::Handle::current(),
//! );
//! let transport = connector.connect().unwrap();
//! println!("{}", transport.description());
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::{AppConfig, BrokerConfig, Topics};
pub use data::{
    AlertFeed, AlertSeverity, Dashboard, Metric, ReadingValue, SensorSnapshot, Severity,
    Thresholds,
};
pub use error::DashboardError;
pub use source::{
    ChannelConnector, ChannelTransport, Connector, MqttConnector, Transport, TransportEvent,
};
