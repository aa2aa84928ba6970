//! Error types for the dashboard core and transports.

use thiserror::Error;

/// Errors surfaced by the dashboard core and its transports.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// A command was issued while the broker connection is down.
    #[error("Not connected to MQTT broker")]
    NotConnected,

    /// The broker URL could not be understood.
    #[error("Invalid broker endpoint: {0}")]
    InvalidEndpoint(String),

    /// QoS level outside 0..=2.
    #[error("Invalid QoS level: {0}")]
    InvalidQos(u8),

    /// The transport refused an outbound publish.
    #[error("Publish failed: {0}")]
    Publish(String),

    /// The transport has already been closed.
    #[error("Transport closed")]
    Closed,
}

/// Convenience result alias for dashboard operations.
pub type Result<T> = std::result::Result<T, DashboardError>;
