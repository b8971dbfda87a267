//! Poll-cycle orchestration.
//!
//! One cycle steps through `Idle → Planning → Querying → Reporting → Done`,
//! landing in `Failed` when a walk returns its fatal indication. Whatever
//! happens, the finalizer emits exactly one `snmp.can_check` service check:
//! OK when no fatal error occurred, CRITICAL with the captured message
//! otherwise. Per-metric problems never reach here; they are warnings inside
//! the components that found them.

use tracing::debug;

use crate::config::{InitConfig, Instance};
use crate::mib::MibRegistry;
use crate::plan::plan_queries;
use crate::report::{
    report_raw_metrics, report_scalar_metrics, report_table_metrics, ReportStats,
};
use crate::session::SnmpSession;
use crate::sink::{MetricSink, ServiceStatus};
use crate::walker::{walk, WalkError};

/// Name of the per-cycle health signal.
pub const SERVICE_CHECK_NAME: &str = "snmp.can_check";

/// Where a cycle ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Planning,
    Querying,
    Reporting,
    Done,
    Failed,
}

/// Outcome of one poll cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub phase: Phase,
    pub status: ServiceStatus,
    pub stats: ReportStats,
    pub error: Option<String>,
}

impl CycleReport {
    pub fn is_ok(&self) -> bool {
        self.status == ServiceStatus::Ok
    }
}

/// Runs poll cycles. Owns the MIB registry, which is built once per
/// init-config; sessions and sinks are handed in per call.
pub struct Orchestrator {
    registry: MibRegistry,
}

impl Orchestrator {
    /// Builds the registry from the embedded base table plus any extension
    /// files in `init_config.mibs_folder`.
    pub fn new(init_config: &InitConfig) -> Self {
        Orchestrator {
            registry: MibRegistry::with_extensions(init_config.mibs_folder.as_deref()),
        }
    }

    pub fn registry(&self) -> &MibRegistry {
        &self.registry
    }

    /// Runs one poll cycle against one device.
    ///
    /// The finalizer behavior: regardless of how the body ends, exactly one
    /// service check is emitted before this returns.
    pub async fn run_cycle<S: SnmpSession>(
        &self,
        instance: &Instance,
        session: &mut S,
        sink: &dyn MetricSink,
    ) -> CycleReport {
        let mut phase = Phase::Idle;
        let mut stats = ReportStats::default();
        let outcome = self
            .run_phases(instance, session, sink, &mut phase, &mut stats)
            .await;

        let (status, error) = match outcome {
            Ok(()) => (ServiceStatus::Ok, None),
            Err(e) => {
                phase = Phase::Failed;
                (ServiceStatus::Critical, Some(e.message))
            }
        };

        sink.service_check(
            SERVICE_CHECK_NAME,
            status,
            &[instance.device_tag()],
            error.as_deref(),
        );

        CycleReport {
            phase,
            status,
            stats,
            error,
        }
    }

    /// The cycle body; only a fatal `WalkError` escapes it.
    async fn run_phases<S: SnmpSession>(
        &self,
        instance: &Instance,
        session: &mut S,
        sink: &dyn MetricSink,
        phase: &mut Phase,
        stats: &mut ReportStats,
    ) -> Result<(), WalkError> {
        *phase = Phase::Planning;
        debug!(device = %instance.ip_address, "planning queries");
        let plan = plan_queries(&instance.metrics, &self.registry);

        let mut base_tags = instance.tags.clone();
        base_tags.push(instance.device_tag());

        if plan.has_resolved_queries() {
            *phase = Phase::Querying;
            let results = walk(
                session,
                &plan.table_roots,
                true,
                &self.registry,
                &instance.ip_address,
            )
            .await?;

            *phase = Phase::Reporting;
            stats.merge(report_table_metrics(
                sink,
                &plan.tables,
                &results,
                &base_tags,
            ));
            stats.merge(report_scalar_metrics(
                sink,
                &plan.scalars,
                &results,
                &base_tags,
            ));
        }

        if plan.has_raw_queries() {
            *phase = Phase::Querying;
            let results = walk(
                session,
                &plan.raw_roots,
                false,
                &self.registry,
                &instance.ip_address,
            )
            .await?;

            *phase = Phase::Reporting;
            stats.merge(report_raw_metrics(sink, &plan.raw, &results, &base_tags));
        }

        *phase = Phase::Done;
        Ok(())
    }
}
