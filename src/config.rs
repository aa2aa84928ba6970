//! Dashboard configuration.
//!
//! Settings are layered: built-in defaults, then an optional config file,
//! then `SENSORDASH_*` environment variables (`__` separates nested keys,
//! e.g. `SENSORDASH_BROKER__URL`).
//!
//! ```toml
//! [broker]
//! url = "wss://broker.hivemq.com:8884/mqtt"
//! keep_alive_secs = 30
//!
//! [topics]
//! temperature = "esp32/sensor/temp"
//!
//! [thresholds]
//! temp_warning = 40.0
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use rand::{distributions::Alphanumeric, Rng};
use rumqttc::{MqttOptions, QoS, SubscribeFilter, Transport as WireTransport};
use serde::{Deserialize, Serialize};

use crate::data::{Metric, Thresholds};
use crate::error::{DashboardError, Result};

/// Largest packet the MQTT protocol can encode (remaining length limit).
///
/// Payloads are accepted at any size the broker delivers.
pub const MAX_PACKET_SIZE: usize = 268_435_455;

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "SENSORDASH";

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub broker: BrokerConfig,
    pub topics: Topics,
    pub thresholds: Thresholds,
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from defaults, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Self>()?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialization alone cannot.
    pub fn validate(&self) -> Result<()> {
        self.broker.endpoint()?;
        self.broker.qos()?;
        Ok(())
    }
}

/// Broker connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Broker URL: `ws://`, `wss://`, `mqtt://` (`tcp://`) or `mqtts://` (`ssl://`).
    pub url: String,
    /// Client identifier; generated when not set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub keep_alive_secs: u64,
    /// Delay between automatic reconnect attempts; 0 disables them.
    pub reconnect_period_ms: u64,
    pub clean_session: bool,
    /// Empty username means no credentials are sent.
    pub username: String,
    pub password: String,
    pub qos: u8,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: "wss://broker.hivemq.com:8884/mqtt".to_string(),
            client_id: None,
            keep_alive_secs: 30,
            reconnect_period_ms: 5000,
            clean_session: true,
            username: String::new(),
            password: String::new(),
            qos: 1,
        }
    }
}

/// Wire scheme of a broker endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Ws,
    Wss,
    Tcp,
    Tls,
}

impl Scheme {
    fn default_port(self) -> u16 {
        match self {
            Scheme::Ws => 80,
            Scheme::Wss => 443,
            Scheme::Tcp => 1883,
            Scheme::Tls => 8883,
        }
    }
}

/// A parsed broker URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
}

/// Split a broker URL into scheme, host and port.
pub fn parse_endpoint(url: &str) -> Result<Endpoint> {
    let invalid = || DashboardError::InvalidEndpoint(url.to_string());

    let (scheme, rest) = url.split_once("://").ok_or_else(invalid)?;
    let scheme = match scheme.to_ascii_lowercase().as_str() {
        "ws" => Scheme::Ws,
        "wss" => Scheme::Wss,
        "mqtt" | "tcp" => Scheme::Tcp,
        "mqtts" | "ssl" => Scheme::Tls,
        _ => return Err(invalid()),
    };

    let authority = rest.split('/').next().unwrap_or_default();
    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => (host, port.parse::<u16>().map_err(|_| invalid())?),
        None => (authority, scheme.default_port()),
    };

    if host.is_empty() {
        return Err(invalid());
    }

    Ok(Endpoint {
        scheme,
        host: host.to_string(),
        port,
    })
}

fn generate_client_id() -> String {
    let r: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("sensordash_{r}")
}

impl BrokerConfig {
    pub fn endpoint(&self) -> Result<Endpoint> {
        parse_endpoint(&self.url)
    }

    pub fn qos(&self) -> Result<QoS> {
        match self.qos {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            other => Err(DashboardError::InvalidQos(other)),
        }
    }

    /// Delay between reconnect attempts, if automatic reconnect is enabled.
    pub fn reconnect_period(&self) -> Option<Duration> {
        (self.reconnect_period_ms > 0).then(|| Duration::from_millis(self.reconnect_period_ms))
    }

    /// Build client options for this broker.
    ///
    /// Websocket transports take the full URL as the host, as the client
    /// library expects.
    pub fn mqtt_options(&self) -> Result<MqttOptions> {
        let endpoint = self.endpoint()?;
        let client_id = self.client_id.clone().unwrap_or_else(generate_client_id);

        let mut options = match endpoint.scheme {
            Scheme::Ws | Scheme::Wss => {
                MqttOptions::new(client_id, self.url.clone(), endpoint.port)
            }
            Scheme::Tcp | Scheme::Tls => MqttOptions::new(client_id, endpoint.host, endpoint.port),
        };

        match endpoint.scheme {
            Scheme::Ws => {
                options.set_transport(WireTransport::Ws);
            }
            Scheme::Wss => {
                options.set_transport(WireTransport::wss_with_default_config());
            }
            Scheme::Tls => {
                options.set_transport(WireTransport::tls_with_default_config());
            }
            Scheme::Tcp => {}
        }

        options.set_keep_alive(Duration::from_secs(self.keep_alive_secs));
        options.set_clean_session(self.clean_session);
        options.set_max_packet_size(MAX_PACKET_SIZE, MAX_PACKET_SIZE);
        if !self.username.is_empty() {
            options.set_credentials(self.username.clone(), self.password.clone());
        }

        Ok(options)
    }
}

/// MQTT topic names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topics {
    pub temperature: String,
    pub humidity: String,
    pub light: String,
    pub gas: String,
    pub motion: String,
    pub relay_state: String,
    pub relay_command: String,
    pub alert: String,
}

impl Default for Topics {
    fn default() -> Self {
        Self {
            temperature: "esp32/sensor/temp".to_string(),
            humidity: "esp32/sensor/humidity".to_string(),
            light: "esp32/sensor/light".to_string(),
            gas: "esp32/sensor/gas".to_string(),
            motion: "esp32/sensor/motion".to_string(),
            relay_state: "esp32/relay/state".to_string(),
            relay_command: "esp32/relay/cmd".to_string(),
            alert: "esp32/alert".to_string(),
        }
    }
}

impl Topics {
    /// Topic carrying a metric.
    pub fn topic_for(&self, metric: Metric) -> &str {
        match metric {
            Metric::Temperature => &self.temperature,
            Metric::Humidity => &self.humidity,
            Metric::Light => &self.light,
            Metric::Gas => &self.gas,
            Metric::Motion => &self.motion,
            Metric::RelayState => &self.relay_state,
        }
    }

    /// Metric carried by a topic, first match in display order.
    pub fn metric_for(&self, topic: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| self.topic_for(*m) == topic)
    }

    /// All eight configured topics.
    pub fn all(&self) -> Vec<&str> {
        let mut topics: Vec<&str> = Metric::ALL.iter().map(|m| self.topic_for(*m)).collect();
        topics.push(&self.relay_command);
        topics.push(&self.alert);
        topics
    }

    /// Subscription filters for every configured topic.
    pub fn subscriptions(&self, qos: QoS) -> Vec<SubscribeFilter> {
        self.all().into_iter().map(|t| SubscribeFilter::new(t.to_string(), qos)).collect()
    }
}

/// Terminal UI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Refresh tick interval in milliseconds.
    pub refresh_ms: u64,
    /// Age after which a metric is shown as stale.
    pub stale_after_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_ms: 1000,
            stale_after_secs: 30,
        }
    }
}

impl UiConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.max(1))
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }
}
