//! Typed sensor readings and payload normalization.
//!
//! Raw MQTT payloads are plain strings. This module turns a `(topic, payload)`
//! pair into a typed [`Reading`], an [`AlertSignal`], or nothing at all when
//! the topic is not one of the configured sensor topics.
//!
//! Numeric coercion is lenient on purpose: a payload that does not parse
//! still produces a reading, carrying a non-finite value that the rest of the
//! system treats as "unknown".

use std::fmt;
use std::time::Instant;

use serde::Serialize;

use crate::config::Topics;

/// One of the measurable or controllable quantities on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Temperature,
    Humidity,
    Light,
    Gas,
    Motion,
    RelayState,
}

impl Metric {
    /// Every metric, in display order.
    pub const ALL: [Metric; 6] = [
        Metric::Temperature,
        Metric::Humidity,
        Metric::Light,
        Metric::Gas,
        Metric::Motion,
        Metric::RelayState,
    ];

    /// Metrics that keep a rolling history.
    pub const SERIES: [Metric; 4] = [
        Metric::Temperature,
        Metric::Humidity,
        Metric::Light,
        Metric::Gas,
    ];

    /// Whether this metric keeps a rolling history buffer.
    pub fn is_series(self) -> bool {
        Self::SERIES.contains(&self)
    }

    /// Returns the display label for this metric.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature",
            Metric::Humidity => "Humidity",
            Metric::Light => "Light",
            Metric::Gas => "Gas",
            Metric::Motion => "Motion",
            Metric::RelayState => "Relay",
        }
    }

    /// Returns the display unit, empty for unitless metrics.
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Temperature => "°C",
            Metric::Humidity => "%",
            Metric::Light => "lux",
            Metric::Gas => "ppm",
            Metric::Motion | Metric::RelayState => "",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A decoded payload value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReadingValue {
    /// Floating point measurement; NaN when the payload did not parse.
    Float(f64),
    /// Integer measurement; `None` when the payload did not parse.
    Integer(Option<i64>),
    /// On/off state.
    Bool(bool),
    /// Verbatim text.
    Text(String),
}

impl ReadingValue {
    /// Numeric view of the value.
    ///
    /// Unparsable integers come back as NaN so callers can apply a single
    /// `is_finite` check. Boolean and text values have no numeric view.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ReadingValue::Float(v) => Some(*v),
            ReadingValue::Integer(v) => Some(v.map_or(f64::NAN, |v| v as f64)),
            ReadingValue::Bool(_) | ReadingValue::Text(_) => None,
        }
    }

    /// Returns the numeric value only when it is usable for display.
    pub fn finite(&self) -> Option<f64> {
        self.as_f64().filter(|v| v.is_finite())
    }
}

/// One decoded value with its arrival time.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub metric: Metric,
    pub value: ReadingValue,
    pub timestamp: Instant,
}

impl Reading {
    pub fn new(metric: Metric, value: ReadingValue, timestamp: Instant) -> Self {
        Self {
            metric,
            value,
            timestamp,
        }
    }
}

/// Out-of-band classification code received on the alert topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSignal {
    code: String,
}

impl AlertSignal {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    /// The raw code, exactly as received.
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// Result of normalizing one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Reading(Reading),
    Alert(AlertSignal),
    /// Topic is not a configured input; ignored.
    Unrecognized,
}

/// Convert a raw `(topic, payload)` pair into a typed reading or alert signal.
///
/// Topics are matched by exact string comparison, sensor topics first and the
/// alert topic last.
pub fn normalize(topics: &Topics, topic: &str, payload: &str, now: Instant) -> Normalized {
    if let Some(metric) = topics.metric_for(topic) {
        let value = match metric {
            Metric::Temperature | Metric::Humidity => {
                ReadingValue::Float(parse_float_prefix(payload))
            }
            Metric::Light | Metric::Gas => ReadingValue::Integer(parse_int_prefix(payload)),
            Metric::Motion => ReadingValue::Bool(payload == "1"),
            Metric::RelayState => ReadingValue::Text(payload.to_string()),
        };
        return Normalized::Reading(Reading::new(metric, value, now));
    }

    if topic == topics.alert {
        return Normalized::Alert(AlertSignal::new(payload));
    }

    Normalized::Unrecognized
}

/// Parse the longest decimal prefix of `payload`, returning NaN if there is none.
///
/// Leading whitespace is skipped and trailing garbage ignored, so `"23.5C"`
/// reads as 23.5. A signed `Infinity` literal is accepted.
pub fn parse_float_prefix(payload: &str) -> f64 {
    let s = payload.trim_start();
    let bytes = s.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        // A bare dot still belongs to the number when digits precede it
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

/// Parse the leading integer of `payload`, returning `None` if there is none.
///
/// Leading whitespace and an optional sign are accepted, a `0x` prefix
/// switches to hexadecimal, and parsing stops at the first non-digit.
/// A digit run too large for `i64` is treated as unparsable.
pub fn parse_int_prefix(payload: &str) -> Option<i64> {
    let s = payload.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let hex = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X"));
    let magnitude = match hex {
        Some(digits) => {
            let len = digits.bytes().take_while(u8::is_ascii_hexdigit).count();
            if len == 0 {
                return None;
            }
            i64::from_str_radix(&digits[..len], 16).ok()?
        }
        None => {
            let len = count_digits(rest.as_bytes());
            if len == 0 {
                return None;
            }
            rest[..len].parse::<i64>().ok()?
        }
    };

    Some(if negative { -magnitude } else { magnitude })
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(topic: &str, payload: &str) -> Reading {
        match normalize(&Topics::default(), topic, payload, Instant::now()) {
            Normalized::Reading(r) => r,
            other => panic!("expected a reading, got {:?}", other),
        }
    }

    #[test]
    fn test_temperature_parses_float() {
        let r = reading("esp32/sensor/temp", "23.5");
        assert_eq!(r.metric, Metric::Temperature);
        assert_eq!(r.value, ReadingValue::Float(23.5));
    }

    #[test]
    fn test_invalid_temperature_is_non_finite() {
        let r = reading("esp32/sensor/temp", "invalid");
        assert!(r.value.as_f64().unwrap().is_nan());
        assert_eq!(r.value.finite(), None);
    }

    #[test]
    fn test_humidity_uses_float_rule() {
        let r = reading("esp32/sensor/humidity", " 61.25%");
        assert_eq!(r.metric, Metric::Humidity);
        assert_eq!(r.value, ReadingValue::Float(61.25));
    }

    #[test]
    fn test_light_and_gas_parse_integer_prefix() {
        let light = reading("esp32/sensor/light", "512.9");
        assert_eq!(light.value, ReadingValue::Integer(Some(512)));

        let gas = reading("esp32/sensor/gas", "abc");
        assert_eq!(gas.value, ReadingValue::Integer(None));
        assert!(gas.value.as_f64().unwrap().is_nan());
    }

    #[test]
    fn test_motion_is_true_only_for_literal_one() {
        assert_eq!(reading("esp32/sensor/motion", "1").value, ReadingValue::Bool(true));
        assert_eq!(reading("esp32/sensor/motion", "0").value, ReadingValue::Bool(false));
        assert_eq!(reading("esp32/sensor/motion", "true").value, ReadingValue::Bool(false));
        assert_eq!(reading("esp32/sensor/motion", " 1").value, ReadingValue::Bool(false));
    }

    #[test]
    fn test_relay_state_is_verbatim() {
        let r = reading("esp32/relay/state", " ON ");
        assert_eq!(r.metric, Metric::RelayState);
        assert_eq!(r.value, ReadingValue::Text(" ON ".to_string()));
        assert_eq!(r.value.as_f64(), None);
    }

    #[test]
    fn test_alert_topic_yields_signal() {
        let result = normalize(&Topics::default(), "esp32/alert", "GAS_HIGH", Instant::now());
        assert_eq!(result, Normalized::Alert(AlertSignal::new("GAS_HIGH")));
    }

    #[test]
    fn test_unknown_and_command_topics_are_ignored() {
        let topics = Topics::default();
        let now = Instant::now();
        assert_eq!(normalize(&topics, "esp32/other", "1", now), Normalized::Unrecognized);
        assert_eq!(normalize(&topics, "esp32/relay/cmd", "ON", now), Normalized::Unrecognized);
        // Exact match only
        assert_eq!(normalize(&topics, "esp32/sensor/temp/", "1", now), Normalized::Unrecognized);
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("42"), 42.0);
        assert_eq!(parse_float_prefix("  -3.5e2xyz"), -350.0);
        assert_eq!(parse_float_prefix("1e"), 1.0);
        assert_eq!(parse_float_prefix(".5"), 0.5);
        assert_eq!(parse_float_prefix("7."), 7.0);
        assert_eq!(parse_float_prefix("1.e5"), 100000.0);
        assert_eq!(parse_float_prefix("2.E-1"), 0.2);
        assert_eq!(parse_float_prefix("3.e"), 3.0);
        assert_eq!(parse_float_prefix("Infinity"), f64::INFINITY);
        assert_eq!(parse_float_prefix("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_float_prefix("").is_nan());
        assert!(parse_float_prefix(".").is_nan());
        assert!(parse_float_prefix("-").is_nan());
        assert!(parse_float_prefix("nan").is_nan());
    }

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("120"), Some(120));
        assert_eq!(parse_int_prefix("  -15ppm"), Some(-15));
        assert_eq!(parse_int_prefix("+8"), Some(8));
        assert_eq!(parse_int_prefix("0x1A"), Some(26));
        assert_eq!(parse_int_prefix("0xZZ"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("-"), None);
        assert_eq!(parse_int_prefix("99999999999999999999"), None);
    }
}
