//! Transport abstraction for talking to the broker.
//!
//! A [`Transport`] delivers inbound events without blocking and accepts
//! fire-and-forget publishes. A [`Connector`] creates transports, which is how
//! reconnect works: the old transport is closed and dropped before the
//! connector is asked for a new one.

mod channel;
mod mqtt;

pub use channel::{ChannelConnector, ChannelHandle, ChannelTransport, OutboundMessage};
pub use mqtt::{MqttConnector, MqttTransport};

use std::fmt::Debug;

use rumqttc::QoS;

use crate::error::Result;

/// Something that happened on the broker connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Session established (sent again after every automatic reconnect).
    Connected,
    /// A message arrived on a subscribed topic.
    Message { topic: String, payload: String },
    /// The connection attempt failed.
    Error(String),
    /// An established connection was lost.
    Offline,
}

/// Trait for exchanging messages with the broker.
///
/// # Example
///
/// ```
/// use sensordash::source::{ChannelTransport, Transport, TransportEvent};
///
/// let (handle, mut transport) = ChannelTransport::create("test");
/// handle.events.send(TransportEvent::Connected).unwrap();
/// assert_eq!(transport.poll(), Some(TransportEvent::Connected));
/// ```
pub trait Transport: Send + Debug {
    /// Take the next pending event, if any.
    ///
    /// This method must not block.
    fn poll(&mut self) -> Option<TransportEvent>;

    /// Queue a message for publishing without waiting for acknowledgement.
    fn publish(&mut self, topic: &str, payload: &str, qos: QoS) -> Result<()>;

    /// Tear down the connection. Calling it twice is harmless.
    fn close(&mut self);

    /// Returns a human-readable description of the transport.
    ///
    /// Used for display in the TUI header.
    fn description(&self) -> &str;
}

/// Factory for transports.
pub trait Connector: Send + Debug {
    /// Open a new connection.
    fn connect(&mut self) -> Result<Box<dyn Transport>>;

    /// QoS used for outbound publishes.
    fn qos(&self) -> QoS {
        QoS::AtLeastOnce
    }
}
