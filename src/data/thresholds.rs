//! Threshold-based severity classification.
//!
//! Each metric's latest value is compared against configured boundaries to
//! decide whether its card should be shown as normal, warning or danger.

use serde::{Deserialize, Serialize};

use super::reading::Metric;
use super::store::SensorSnapshot;

/// Margin below the temperature limit that already counts as a warning.
const TEMP_WARNING_MARGIN: f64 = 5.0;

/// Fraction of the gas limit that already counts as a warning.
const GAS_WARNING_RATIO: f64 = 0.7;

/// Alert boundaries for the classified metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Temperature above which the reading is dangerous.
    pub temp_warning: f64,
    /// Gas level above which the reading is dangerous.
    pub gas_warning: f64,
    /// Light level below which the reading is a warning.
    pub light_low: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temp_warning: 40.0,
            gas_warning: 100.0,
            light_low: 200.0,
        }
    }
}

/// Classification tier for a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Normal,
    Warning,
    Danger,
}

impl Severity {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Normal => "OK",
            Severity::Warning => "WARN",
            Severity::Danger => "DANGER",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Normal => "Normal",
            Severity::Warning => "Warning",
            Severity::Danger => "Danger",
        }
    }
}

/// Classify a metric's current value against the thresholds.
///
/// Absent and non-finite values are always `Normal`; missing data is never
/// reported as a problem.
pub fn classify(metric: Metric, snapshot: &SensorSnapshot, thresholds: &Thresholds) -> Severity {
    let Some(value) = snapshot.numeric(metric).filter(|v| v.is_finite()) else {
        return Severity::Normal;
    };

    match metric {
        Metric::Temperature => {
            if value > thresholds.temp_warning {
                Severity::Danger
            } else if value > thresholds.temp_warning - TEMP_WARNING_MARGIN {
                Severity::Warning
            } else {
                Severity::Normal
            }
        }
        Metric::Gas => {
            if value > thresholds.gas_warning {
                Severity::Danger
            } else if value > thresholds.gas_warning * GAS_WARNING_RATIO {
                Severity::Warning
            } else {
                Severity::Normal
            }
        }
        Metric::Light => {
            if value < thresholds.light_low {
                Severity::Warning
            } else {
                Severity::Normal
            }
        }
        Metric::Humidity | Metric::Motion | Metric::RelayState => Severity::Normal,
    }
}

/// The worst severity across all metrics.
pub fn worst(snapshot: &SensorSnapshot, thresholds: &Thresholds) -> Severity {
    Metric::ALL
        .iter()
        .map(|m| classify(*m, snapshot, thresholds))
        .max()
        .unwrap_or(Severity::Normal)
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::data::reading::ReadingValue;

    fn snapshot(metric: Metric, value: ReadingValue) -> SensorSnapshot {
        SensorSnapshot::from_values([(metric, value)], Instant::now())
    }

    fn classify_float(metric: Metric, value: f64, thresholds: &Thresholds) -> Severity {
        classify(metric, &snapshot(metric, ReadingValue::Float(value)), thresholds)
    }

    fn classify_int(metric: Metric, value: i64, thresholds: &Thresholds) -> Severity {
        classify(metric, &snapshot(metric, ReadingValue::Integer(Some(value))), thresholds)
    }

    #[test]
    fn test_temperature_tiers() {
        let t = Thresholds {
            temp_warning: 40.0,
            ..Default::default()
        };
        assert_eq!(classify_float(Metric::Temperature, 45.0, &t), Severity::Danger);
        assert_eq!(classify_float(Metric::Temperature, 37.0, &t), Severity::Warning);
        assert_eq!(classify_float(Metric::Temperature, 10.0, &t), Severity::Normal);
        // Boundaries are strict
        assert_eq!(classify_float(Metric::Temperature, 40.0, &t), Severity::Warning);
        assert_eq!(classify_float(Metric::Temperature, 35.0, &t), Severity::Normal);
    }

    #[test]
    fn test_gas_tiers() {
        let t = Thresholds {
            gas_warning: 100.0,
            ..Default::default()
        };
        assert_eq!(classify_int(Metric::Gas, 150, &t), Severity::Danger);
        assert_eq!(classify_int(Metric::Gas, 75, &t), Severity::Warning);
        assert_eq!(classify_int(Metric::Gas, 50, &t), Severity::Normal);
        assert_eq!(classify_int(Metric::Gas, 70, &t), Severity::Normal);
    }

    #[test]
    fn test_light_has_no_danger_tier() {
        let t = Thresholds::default();
        assert_eq!(classify_int(Metric::Light, 0, &t), Severity::Warning);
        assert_eq!(classify_int(Metric::Light, 199, &t), Severity::Warning);
        assert_eq!(classify_int(Metric::Light, 200, &t), Severity::Normal);
    }

    #[test]
    fn test_unclassified_metrics_are_normal() {
        let t = Thresholds::default();
        assert_eq!(classify_float(Metric::Humidity, 100.0, &t), Severity::Normal);
        assert_eq!(
            classify(Metric::Motion, &snapshot(Metric::Motion, ReadingValue::Bool(true)), &t),
            Severity::Normal
        );
        assert_eq!(
            classify(
                Metric::RelayState,
                &snapshot(Metric::RelayState, ReadingValue::Text("ON".into())),
                &t
            ),
            Severity::Normal
        );
    }

    #[test]
    fn test_absent_or_non_finite_is_normal() {
        let t = Thresholds::default();
        let empty = SensorSnapshot::default();
        for metric in Metric::ALL {
            assert_eq!(classify(metric, &empty, &t), Severity::Normal);
        }

        assert_eq!(classify_float(Metric::Temperature, f64::NAN, &t), Severity::Normal);
        assert_eq!(classify_float(Metric::Temperature, f64::INFINITY, &t), Severity::Normal);
        assert_eq!(
            classify(Metric::Light, &snapshot(Metric::Light, ReadingValue::Integer(None)), &t),
            Severity::Normal
        );
    }

    #[test]
    fn test_worst_severity() {
        let t = Thresholds::default();
        let snap = SensorSnapshot::from_values(
            [
                (Metric::Temperature, ReadingValue::Float(37.0)),
                (Metric::Gas, ReadingValue::Integer(Some(150))),
            ],
            Instant::now(),
        );
        assert_eq!(worst(&snap, &t), Severity::Danger);
        assert_eq!(worst(&SensorSnapshot::default(), &t), Severity::Normal);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Danger > Severity::Warning);
        assert!(Severity::Warning > Severity::Normal);
    }
}
