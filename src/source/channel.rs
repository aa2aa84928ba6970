//! Channel-based transport.
//!
//! Events are pushed through a tokio mpsc channel and publishes are echoed to
//! another one. Useful for embedding the dashboard behind a different client
//! and for tests, where the "broker" is just the other end of the channels.

use rumqttc::QoS;
use tokio::sync::mpsc;

use super::{Connector, Transport, TransportEvent};
use crate::error::{DashboardError, Result};

/// A message handed to [`Transport::publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub topic: String,
    pub payload: String,
    pub qos: QoS,
}

/// The far end of a [`ChannelTransport`].
#[derive(Debug)]
pub struct ChannelHandle {
    /// Push events to the transport.
    pub events: mpsc::UnboundedSender<TransportEvent>,
    /// Messages the transport published.
    pub published: mpsc::UnboundedReceiver<OutboundMessage>,
}

impl ChannelHandle {
    /// Whether the transport side has been closed or dropped.
    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}

/// A transport backed by in-memory channels.
///
/// # Example
///
/// ```
/// use sensordash::source::{ChannelTransport, Transport};
/// use rumqttc::QoS;
///
/// let (mut handle, mut transport) = ChannelTransport::create("test");
/// transport.publish("esp32/relay/cmd", "ON", QoS::AtLeastOnce).unwrap();
/// assert_eq!(handle.published.try_recv().unwrap().payload, "ON");
/// ```
#[derive(Debug)]
pub struct ChannelTransport {
    events: Option<mpsc::UnboundedReceiver<TransportEvent>>,
    outbound: Option<mpsc::UnboundedSender<OutboundMessage>>,
    description: String,
}

impl ChannelTransport {
    /// Create a transport and the handle that drives it.
    pub fn create(source_description: &str) -> (ChannelHandle, Self) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();

        let handle = ChannelHandle {
            events: event_tx,
            published: out_rx,
        };
        let transport = Self {
            events: Some(event_rx),
            outbound: Some(out_tx),
            description: format!("channel: {}", source_description),
        };
        (handle, transport)
    }
}

impl Transport for ChannelTransport {
    fn poll(&mut self) -> Option<TransportEvent> {
        self.events.as_mut()?.try_recv().ok()
    }

    fn publish(&mut self, topic: &str, payload: &str, qos: QoS) -> Result<()> {
        let outbound = self.outbound.as_ref().ok_or(DashboardError::Closed)?;
        outbound
            .send(OutboundMessage {
                topic: topic.to_string(),
                payload: payload.to_string(),
                qos,
            })
            .map_err(|e| DashboardError::Publish(e.to_string()))
    }

    fn close(&mut self) {
        self.events = None;
        self.outbound = None;
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Connector that hands out a fresh [`ChannelTransport`] per connection.
///
/// The matching [`ChannelHandle`] for each connection is sent on the
/// receiver returned by [`ChannelConnector::create`].
#[derive(Debug)]
pub struct ChannelConnector {
    handles: mpsc::UnboundedSender<ChannelHandle>,
    description: String,
    connections: usize,
}

impl ChannelConnector {
    pub fn create(source_description: &str) -> (mpsc::UnboundedReceiver<ChannelHandle>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connector = Self {
            handles: tx,
            description: source_description.to_string(),
            connections: 0,
        };
        (rx, connector)
    }

    /// Number of transports created so far.
    pub fn connections(&self) -> usize {
        self.connections
    }
}

impl Connector for ChannelConnector {
    fn connect(&mut self) -> Result<Box<dyn Transport>> {
        let (handle, transport) = ChannelTransport::create(&self.description);
        self.handles.send(handle).map_err(|_| DashboardError::Closed)?;
        self.connections += 1;
        Ok(Box::new(transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_transport_poll() {
        let (handle, mut transport) = ChannelTransport::create("test");

        assert!(transport.poll().is_none());

        handle.events.send(TransportEvent::Connected).unwrap();
        handle
            .events
            .send(TransportEvent::Message {
                topic: "esp32/sensor/temp".into(),
                payload: "21.0".into(),
            })
            .unwrap();

        assert_eq!(transport.poll(), Some(TransportEvent::Connected));
        assert!(matches!(transport.poll(), Some(TransportEvent::Message { .. })));
        assert!(transport.poll().is_none());
    }

    #[test]
    fn test_channel_transport_close() {
        let (handle, mut transport) = ChannelTransport::create("test");
        assert!(!handle.is_closed());

        transport.close();
        assert!(handle.is_closed());
        assert!(transport.poll().is_none());
        assert_eq!(
            transport.publish("t", "p", QoS::AtLeastOnce),
            Err(DashboardError::Closed)
        );

        // Closing twice is fine
        transport.close();
    }

    #[test]
    fn test_connector_hands_out_handles() {
        let (mut handles, mut connector) = ChannelConnector::create("test");

        let first = connector.connect().unwrap();
        let second = connector.connect().unwrap();
        assert_eq!(connector.connections(), 2);
        assert_eq!(first.description(), "channel: test");

        let first_handle = handles.try_recv().unwrap();
        let second_handle = handles.try_recv().unwrap();
        drop(first);
        assert!(first_handle.is_closed());
        assert!(!second_handle.is_closed());
        drop(second);
    }
}
