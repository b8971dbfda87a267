//! Semantic classification of SNMP values.
//!
//! Classification decides how a sample is aggregated downstream: counters
//! contribute to rates, gauges are point-in-time readings. Matching is on the
//! exact wire class, never on payload compatibility; `Counter64` and
//! `CounterBasedGauge64` carry the same integer but land in different classes.

use crate::value::SnmpValue;

/// Semantic kind of a collected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricClass {
    /// Monotonically increasing; submitted as a rate-contributing sample.
    Counter,
    /// Point-in-time reading; submitted as-is.
    Gauge,
    /// Not a metric-bearing class; dropped with a diagnostic.
    Unsupported,
}

/// Maps a wire value to exactly one metric class. Total over all variants.
pub fn classify(value: &SnmpValue) -> MetricClass {
    match value {
        SnmpValue::Counter32(_) | SnmpValue::Counter64(_) | SnmpValue::ZeroBasedCounter64(_) => {
            MetricClass::Counter
        }
        SnmpValue::Gauge32(_) | SnmpValue::Unsigned32(_) | SnmpValue::CounterBasedGauge64(_) => {
            MetricClass::Gauge
        }
        _ => MetricClass::Unsupported,
    }
}
