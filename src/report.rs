//! Metric reporting.
//!
//! Takes the cycle's collected `ResultSet` and the query plan's bookkeeping
//! and submits classified, tagged samples to the sink. Every failure here is
//! isolated to its own metric: a missing OID, an invalid reply or an
//! unexpected row count is a warning and a skip, never a cycle failure.

use tracing::warn;

use crate::classify::{classify, MetricClass};
use crate::oid::ObjectId;
use crate::plan::{RawRequest, TableRequest};
use crate::results::ResultSet;
use crate::sink::MetricSink;
use crate::tags::TagPlan;
use crate::value::SnmpValue;

/// Default name for raw-OID metrics configured without one.
pub const UNNAMED_METRIC: &str = "unnamed_metric";

/// Per-cycle submission bookkeeping, surfaced in the cycle report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportStats {
    pub submitted: usize,
    pub skipped: usize,
}

impl ReportStats {
    pub fn merge(&mut self, other: ReportStats) {
        self.submitted += other.submitted;
        self.skipped += other.skipped;
    }
}

/// Normalizes a metric name the way the downstream aggregator expects and
/// prefixes it with `snmp.`.
///
/// Illegal characters (`,+*-/()[]{}` and whitespace) become `_`, runs of `_`
/// collapse, `._` and `_.` collapse to `.`, leading and trailing `_` drop.
pub fn normalize_name(name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len());
    let mut prev_underscore = false;
    for c in name.chars() {
        let mapped = if c.is_ascii_alphanumeric() || c == '.' {
            Some(c)
        } else if c == '_' || c.is_whitespace() || ",+*-/()[]{}".contains(c) {
            Some('_')
        } else {
            // Anything else is dropped outright.
            None
        };
        match mapped {
            Some('_') if prev_underscore => {}
            Some(ch) => {
                cleaned.push(ch);
                prev_underscore = ch == '_';
            }
            None => {}
        }
    }
    let cleaned = cleaned.replace("._", ".").replace("_.", ".");
    format!("snmp.{}", cleaned.trim_matches('_'))
}

/// Reports the raw-OID metrics from an unresolved walk.
///
/// The device may answer from one or more index levels below the configured
/// root, so matching is by component-wise OID prefix. When several collected
/// OIDs match one request, the smallest in OID order wins, which keeps
/// repeated cycles deterministic.
pub fn report_raw_metrics(
    sink: &dyn MetricSink,
    requests: &[RawRequest],
    results: &ResultSet,
    base_tags: &[String],
) -> ReportStats {
    let mut stats = ReportStats::default();

    // Parse once; raw result keys are always dotted OIDs.
    let mut collected: Vec<(ObjectId, &str)> = results
        .names()
        .filter_map(|name| name.parse::<ObjectId>().ok().map(|oid| (oid, name)))
        .collect();
    collected.sort();

    for request in requests {
        let matched = collected
            .iter()
            .find(|(oid, _)| oid.starts_with(&request.oid));
        let (_, key) = match matched {
            Some(entry) => entry,
            None => {
                warn!("No matching results found for oid {}", request.oid);
                stats.skipped += 1;
                continue;
            }
        };

        let name = request.name.as_deref().unwrap_or(UNNAMED_METRIC);
        for value in results.rows(key).into_iter().flat_map(|rows| rows.values()) {
            submit_metric(sink, name, value, base_tags, &mut stats);
        }
    }

    stats
}

/// Reports the table metrics from a resolved walk: every configured symbol,
/// every collected row, with the row's resolved tags appended to the base
/// tags.
pub fn report_table_metrics(
    sink: &dyn MetricSink,
    tables: &[TableRequest],
    results: &ResultSet,
    base_tags: &[String],
) -> ReportStats {
    let mut stats = ReportStats::default();

    for table in tables {
        // Split the tag specs once per table, not once per row.
        let tag_plan = TagPlan::from_specs(&table.tags);

        for symbol in &table.symbols {
            let rows = match results.rows(symbol) {
                Some(rows) => rows,
                None => {
                    warn!("No rows collected for symbol {}", symbol);
                    stats.skipped += 1;
                    continue;
                }
            };
            for (index, value) in rows {
                let mut tags = base_tags.to_vec();
                tags.extend(tag_plan.resolve(index, results));
                submit_metric(sink, symbol, value, &tags, &mut stats);
            }
        }
    }

    stats
}

/// Reports scalar symbols (single-row tables). A scalar resolving to more
/// than one row is a configuration/device mismatch: nothing is submitted,
/// because picking an arbitrary row would hide the problem.
pub fn report_scalar_metrics(
    sink: &dyn MetricSink,
    scalars: &[String],
    results: &ResultSet,
    base_tags: &[String],
) -> ReportStats {
    let mut stats = ReportStats::default();

    for symbol in scalars {
        let rows = match results.rows(symbol) {
            Some(rows) => rows,
            None => {
                warn!("No rows collected for scalar {}", symbol);
                stats.skipped += 1;
                continue;
            }
        };
        if rows.len() > 1 {
            warn!(
                "Several rows corresponding while the metric {} is supposed to be a scalar",
                symbol
            );
            stats.skipped += 1;
            continue;
        }
        if let Some(value) = rows.values().next() {
            submit_metric(sink, symbol, value, base_tags, &mut stats);
        }
    }

    stats
}

/// Shared submission path: sentinel check, classification, emission.
fn submit_metric(
    sink: &dyn MetricSink,
    name: &str,
    value: &SnmpValue,
    tags: &[String],
    stats: &mut ReportStats,
) {
    if value.is_invalid_reply() {
        // Object not present on the device; never interpret as 0.
        warn!("No such Mib available: {}", name);
        stats.skipped += 1;
        return;
    }

    let metric_name = normalize_name(name);
    let metric_value = match value.metric_value() {
        Some(v) => v,
        None => {
            warn!(
                "Unsupported metric type {} for {}",
                value.type_name(),
                name
            );
            stats.skipped += 1;
            return;
        }
    };

    match classify(value) {
        MetricClass::Counter => sink.rate(&metric_name, metric_value, tags),
        MetricClass::Gauge => sink.gauge(&metric_name, metric_value, tags),
        MetricClass::Unsupported => {
            warn!(
                "Unsupported metric type {} for {}",
                value.type_name(),
                name
            );
            stats.skipped += 1;
            return;
        }
    }
    stats.submitted += 1;
}
