//! Latest-value store with per-metric rolling history.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use super::history::HistoryBuffer;
use super::reading::{Metric, Reading, ReadingValue};

/// Point-in-time copy of the sensor state.
///
/// Owns its data: mutating a snapshot never reaches back into the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorSnapshot {
    readings: BTreeMap<Metric, Reading>,
    history: BTreeMap<Metric, Vec<f64>>,
}

impl SensorSnapshot {
    /// Latest reading for a metric, if one has arrived.
    pub fn reading(&self, metric: Metric) -> Option<&Reading> {
        self.readings.get(&metric)
    }

    /// Latest value for a metric, if one has arrived.
    pub fn value(&self, metric: Metric) -> Option<&ReadingValue> {
        self.readings.get(&metric).map(|r| &r.value)
    }

    /// Numeric view of the latest value (NaN for unparsable numbers).
    pub fn numeric(&self, metric: Metric) -> Option<f64> {
        self.value(metric).and_then(ReadingValue::as_f64)
    }

    /// Copied history for a time-series metric, oldest first.
    pub fn history(&self, metric: Metric) -> &[f64] {
        self.history.get(&metric).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Build a snapshot from explicit values, stamped with `at`.
    ///
    /// Handy for classification without going through a store.
    pub fn from_values<I>(values: I, at: Instant) -> Self
    where
        I: IntoIterator<Item = (Metric, ReadingValue)>,
    {
        let readings = values
            .into_iter()
            .map(|(metric, value)| (metric, Reading::new(metric, value, at)))
            .collect();
        Self {
            readings,
            history: BTreeMap::new(),
        }
    }
}

/// Holds the latest reading per metric and history for time-series metrics.
#[derive(Debug, Clone)]
pub struct SensorStore {
    readings: BTreeMap<Metric, Reading>,
    history: BTreeMap<Metric, HistoryBuffer>,
}

impl Default for SensorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        let history = Metric::SERIES.iter().map(|m| (*m, HistoryBuffer::new())).collect();
        Self {
            readings: BTreeMap::new(),
            history,
        }
    }

    /// Record a reading.
    ///
    /// Overwrites the metric's slot and, for time-series metrics, appends the
    /// numeric value to its history.
    pub fn apply_reading(&mut self, reading: Reading) {
        if let Some(buffer) = self.history.get_mut(&reading.metric) {
            if let Some(value) = reading.value.as_f64() {
                buffer.push(value);
            }
        }
        self.readings.insert(reading.metric, reading);
    }

    /// Copy of the current state, including history.
    pub fn current_snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            readings: self.readings.clone(),
            history: self.history.iter().map(|(m, b)| (*m, b.to_vec())).collect(),
        }
    }

    /// Number of buffered points for a metric (0 for non-series metrics).
    pub fn history_length(&self, metric: Metric) -> usize {
        self.history.get(&metric).map_or(0, HistoryBuffer::len)
    }

    /// Copy of a metric's history, oldest first.
    pub fn history(&self, metric: Metric) -> Vec<f64> {
        self.history.get(&metric).map(HistoryBuffer::to_vec).unwrap_or_default()
    }

    /// Borrow a metric's history buffer (None for non-series metrics).
    pub fn buffer(&self, metric: Metric) -> Option<&HistoryBuffer> {
        self.history.get(&metric)
    }

    /// Latest reading for a metric.
    pub fn reading(&self, metric: Metric) -> Option<&Reading> {
        self.readings.get(&metric)
    }

    /// Time since the metric was last updated.
    pub fn age(&self, metric: Metric, now: Instant) -> Option<Duration> {
        self.readings.get(&metric).map(|r| now.saturating_duration_since(r.timestamp))
    }

    /// Whether the metric has a value older than `max_age`.
    ///
    /// Metrics that never reported are not stale; they are absent.
    pub fn is_stale(&self, metric: Metric, now: Instant, max_age: Duration) -> bool {
        self.age(metric, now).is_some_and(|age| age > max_age)
    }
}
