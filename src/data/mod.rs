//! Sensor data models and processing.
//!
//! This module is the core of the dashboard: it turns raw topic messages into
//! typed readings, keeps the latest value and a rolling history per metric,
//! classifies values against thresholds, and maintains the alert feed.
//!
//! ## Submodules
//!
//! - [`reading`]: Metrics, typed readings and payload normalization
//! - [`history`]: Fixed-capacity rolling buffers for charting
//! - [`store`]: Latest-value store and point-in-time snapshots
//! - [`thresholds`]: Severity classification ([`Thresholds`], [`Severity`])
//! - [`alerts`]: Capacity-bounded alert feed with expiry tokens
//! - [`dashboard`]: The [`Dashboard`] state object and its event handlers
//!
//! ## Data Flow
//!
//! ```text
//! (topic, payload)
//!        │
//!        ▼
//! Dashboard::on_message() ──▶ normalize()
//!        │
//!        ├──▶ Reading ──▶ SensorStore::apply_reading() (value + history)
//!        │
//!        └──▶ AlertSignal ──▶ AlertFeed::push()
//!
//! refresh tick ──▶ Dashboard::on_tick() ──▶ AlertFeed::expire_due()
//! ```

pub mod alerts;
pub mod dashboard;
pub mod history;
pub mod reading;
pub mod store;
pub mod thresholds;

pub use alerts::{AlertEntry, AlertFeed, AlertId, AlertSeverity, ExpiryToken};
pub use dashboard::{Dashboard, RelayCommand};
pub use history::HistoryBuffer;
pub use reading::{normalize, AlertSignal, Metric, Normalized, Reading, ReadingValue};
pub use store::{SensorSnapshot, SensorStore};
pub use thresholds::{classify, Severity, Thresholds};
