//! MQTT transport backed by rumqttc.
//!
//! The client's event loop runs in a tokio task. Connection changes and
//! inbound publishes are forwarded over an unbounded channel that the UI
//! thread drains with [`Transport::poll`]. Every `ConnAck` (the first one and
//! those after automatic reconnects) re-subscribes to all configured topics.

use std::time::Duration;

use rumqttc::{
    AsyncClient, ConnectionError, Event, EventLoop, Outgoing, Packet, QoS, SubscribeFilter,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::{Connector, Transport, TransportEvent};
use crate::config::{BrokerConfig, Topics};
use crate::error::{DashboardError, Result};

/// Capacity of the client request queue.
const REQUEST_CAPACITY: usize = 16;

/// How long a closing connection may take to send its DISCONNECT.
const DISCONNECT_GRACE: Duration = Duration::from_millis(500);

/// A live broker connection.
#[derive(Debug)]
pub struct MqttTransport {
    client: AsyncClient,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    task: Option<JoinHandle<()>>,
    runtime: Handle,
    description: String,
}

impl MqttTransport {
    /// Start connecting to the broker on the given runtime.
    ///
    /// Returns immediately; the outcome is reported as a
    /// [`TransportEvent::Connected`] or [`TransportEvent::Error`].
    pub fn connect(broker: &BrokerConfig, topics: &Topics, runtime: &Handle) -> Result<Self> {
        let options = broker.mqtt_options()?;
        let subscriptions = topics.subscriptions(broker.qos()?);
        let reconnect_period = broker.reconnect_period();

        info!("Connecting to: {}", broker.url);
        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
        let (tx, rx) = mpsc::unbounded_channel();

        let task = runtime.spawn(run_event_loop(
            eventloop,
            client.clone(),
            subscriptions,
            tx,
            reconnect_period,
        ));

        Ok(Self {
            client,
            events: rx,
            task: Some(task),
            runtime: runtime.clone(),
            description: format!("mqtt: {}", broker.url),
        })
    }
}

impl Transport for MqttTransport {
    fn poll(&mut self) -> Option<TransportEvent> {
        self.events.try_recv().ok()
    }

    fn publish(&mut self, topic: &str, payload: &str, qos: QoS) -> Result<()> {
        if self.task.is_none() {
            return Err(DashboardError::Closed);
        }
        self.client
            .try_publish(topic, qos, false, payload.as_bytes().to_vec())
            .map_err(|e| DashboardError::Publish(e.to_string()))
    }

    fn close(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        debug!("Closing broker connection");

        if self.client.try_disconnect().is_err() {
            task.abort();
            return;
        }

        // The event loop stops once DISCONNECT is flushed; a session that is
        // down or backing off never gets there and is aborted instead.
        let abort = task.abort_handle();
        self.runtime.spawn(async move {
            if tokio::time::timeout(DISCONNECT_GRACE, task).await.is_err() {
                abort.abort();
            }
        });
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl Drop for MqttTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Drive the client event loop until the receiver goes away.
async fn run_event_loop(
    mut eventloop: EventLoop,
    client: AsyncClient,
    subscriptions: Vec<SubscribeFilter>,
    tx: mpsc::UnboundedSender<TransportEvent>,
    reconnect_period: Option<Duration>,
) {
    let mut connected = false;

    loop {
        let event = match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                connected = true;
                for filter in &subscriptions {
                    info!("Subscribed: {}", filter.path);
                }
                if let Err(e) = client.subscribe_many(subscriptions.clone()).await {
                    warn!("Failed to subscribe: {}", e);
                }
                TransportEvent::Connected
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => TransportEvent::Message {
                topic: publish.topic,
                payload: String::from_utf8_lossy(&publish.payload).into_owned(),
            },
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                debug!("Disconnected from broker");
                break;
            }
            Ok(event) => {
                trace!("MQTT event: {:?}", event);
                continue;
            }
            Err(ConnectionError::RequestsDone) => {
                debug!("Client dropped, stopping event loop");
                break;
            }
            Err(e) => {
                warn!("MQTT error: {:?}", e);
                let event = if connected {
                    TransportEvent::Offline
                } else {
                    TransportEvent::Error(e.to_string())
                };
                connected = false;

                if tx.send(event).is_err() {
                    break;
                }
                match reconnect_period {
                    Some(period) => {
                        tokio::time::sleep(period).await;
                        continue;
                    }
                    None => break,
                }
            }
        };

        if tx.send(event).is_err() {
            // Transport dropped
            break;
        }
    }
}

/// Connector that opens MQTT transports on a tokio runtime.
#[derive(Debug, Clone)]
pub struct MqttConnector {
    broker: BrokerConfig,
    topics: Topics,
    runtime: Handle,
}

impl MqttConnector {
    pub fn new(broker: BrokerConfig, topics: Topics, runtime: Handle) -> Self {
        Self {
            broker,
            topics,
            runtime,
        }
    }
}

impl Connector for MqttConnector {
    fn connect(&mut self) -> Result<Box<dyn Transport>> {
        let transport = MqttTransport::connect(&self.broker, &self.topics, &self.runtime)?;
        Ok(Box::new(transport))
    }

    fn qos(&self) -> QoS {
        self.broker.qos().unwrap_or(QoS::AtLeastOnce)
    }
}
