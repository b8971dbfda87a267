//! Metric emission seam.
//!
//! The poller never aggregates samples itself; it hands them to a
//! `MetricSink`. The bundled sinks are `LogSink` (tracing output, used by the
//! daemon and the `check` command) and `MemorySink` (recording sink for tests
//! and summaries).

use std::fmt;
use std::sync::Mutex;

use tracing::{debug, info, warn};

/// Outcome of one poll cycle as reported through the service check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Ok,
    Critical,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceStatus::Ok => write!(f, "OK"),
            ServiceStatus::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// How a submitted sample should be aggregated downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    /// Monotonic counter reading; contributes to a rate.
    Rate,
    /// Point-in-time reading.
    Gauge,
}

/// One submitted metric sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub kind: SampleKind,
    pub name: String,
    pub value: f64,
    pub tags: Vec<String>,
}

/// One emitted service check.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCheck {
    pub name: String,
    pub status: ServiceStatus,
    pub tags: Vec<String>,
    pub message: Option<String>,
}

/// Consumer of samples and service checks produced by a poll cycle.
pub trait MetricSink {
    /// Submits a monotonic counter reading.
    fn rate(&self, name: &str, value: f64, tags: &[String]);

    /// Submits a point-in-time reading.
    fn gauge(&self, name: &str, value: f64, tags: &[String]);

    /// Emits the per-cycle health signal.
    fn service_check(
        &self,
        name: &str,
        status: ServiceStatus,
        tags: &[String],
        message: Option<&str>,
    );
}

/// Sink that writes every submission to the tracing log.
#[derive(Debug, Default)]
pub struct LogSink;

impl MetricSink for LogSink {
    fn rate(&self, name: &str, value: f64, tags: &[String]) {
        debug!(metric = name, value, ?tags, "rate");
    }

    fn gauge(&self, name: &str, value: f64, tags: &[String]) {
        debug!(metric = name, value, ?tags, "gauge");
    }

    fn service_check(
        &self,
        name: &str,
        status: ServiceStatus,
        tags: &[String],
        message: Option<&str>,
    ) {
        match status {
            ServiceStatus::Ok => info!(check = name, %status, ?tags, "service check"),
            ServiceStatus::Critical => {
                warn!(check = name, %status, ?tags, message, "service check")
            }
        }
    }
}

/// Sink that records every submission for later inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    samples: Mutex<Vec<Sample>>,
    service_checks: Mutex<Vec<ServiceCheck>>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    pub fn samples(&self) -> Vec<Sample> {
        self.samples.lock().expect("sink poisoned").clone()
    }

    pub fn service_checks(&self) -> Vec<ServiceCheck> {
        self.service_checks.lock().expect("sink poisoned").clone()
    }
}

impl MetricSink for MemorySink {
    fn rate(&self, name: &str, value: f64, tags: &[String]) {
        self.samples.lock().expect("sink poisoned").push(Sample {
            kind: SampleKind::Rate,
            name: name.to_string(),
            value,
            tags: tags.to_vec(),
        });
    }

    fn gauge(&self, name: &str, value: f64, tags: &[String]) {
        self.samples.lock().expect("sink poisoned").push(Sample {
            kind: SampleKind::Gauge,
            name: name.to_string(),
            value,
            tags: tags.to_vec(),
        });
    }

    fn service_check(
        &self,
        name: &str,
        status: ServiceStatus,
        tags: &[String],
        message: Option<&str>,
    ) {
        self.service_checks
            .lock()
            .expect("sink poisoned")
            .push(ServiceCheck {
                name: name.to_string(),
                status,
                tags: tags.to_vec(),
                message: message.map(str::to_string),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.rate("snmp.ifInOctets", 500.0, &["interface:eth0".into()]);
        sink.gauge("snmp.tcpCurrEstab", 3.0, &[]);

        let samples = sink.samples();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].kind, SampleKind::Rate);
        assert_eq!(samples[0].name, "snmp.ifInOctets");
        assert_eq!(samples[1].kind, SampleKind::Gauge);
        assert_eq!(samples[1].value, 3.0);
    }

    #[test]
    fn test_memory_sink_records_service_checks() {
        let sink = MemorySink::new();
        sink.service_check(
            "snmp.can_check",
            ServiceStatus::Critical,
            &["snmp_device:10.0.0.1".into()],
            Some("timeout for instance 10.0.0.1"),
        );

        let checks = sink.service_checks();
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].status, ServiceStatus::Critical);
        assert_eq!(
            checks[0].message.as_deref(),
            Some("timeout for instance 10.0.0.1")
        );
    }
}
