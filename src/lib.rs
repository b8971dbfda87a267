//! SNMP polling engine.
//!
//! Polls remote devices with get-next table walks, resolves returned OIDs
//! into named metrics through a precompiled MIB symbol registry, classifies
//! each value as a counter or a gauge, attaches tags derived from table
//! indexes and sibling columns, and emits normalized samples plus one
//! service-health check per poll cycle.
//!
//! # Overview
//!
//! One poll cycle is Planner → Walker → Reporter:
//!
//! - [`plan::plan_queries`] splits the configured metrics into MIB-resolved
//!   roots and raw-OID roots.
//! - [`walker::walk`] runs a get-next walk through a [`session::SnmpSession`]
//!   and aggregates the streamed rows into a [`results::ResultSet`].
//! - [`report`] classifies values, resolves per-row tags and submits samples
//!   to a [`sink::MetricSink`].
//! - [`check::Orchestrator`] ties the cycle together and always emits exactly
//!   one `snmp.can_check` service check.
//!
//! ```no_run
//! use snmp_poller::check::Orchestrator;
//! use snmp_poller::config::{load_config, validate_config};
//! use snmp_poller::session::UdpSession;
//! use snmp_poller::sink::LogSink;
//!
//! # async fn poll() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config(None)?;
//! let validated = validate_config(&config);
//! let orchestrator = Orchestrator::new(&config.init_config);
//!
//! for instance in &validated.instances {
//!     let mut session = UdpSession::connect(instance).await?;
//!     let report = orchestrator.run_cycle(instance, &mut session, &LogSink).await;
//!     println!("{}: {}", instance.ip_address, report.status);
//! }
//! # Ok(())
//! # }
//! ```

pub mod check;
pub mod classify;
pub mod cli;
pub mod commands;
pub mod config;
pub mod mib;
pub mod oid;
pub mod plan;
pub mod report;
pub mod results;
pub mod session;
pub mod sink;
pub mod tags;
pub mod value;
pub mod walker;

// Re-export the main types for convenience
pub use check::{CycleReport, Orchestrator, Phase, SERVICE_CHECK_NAME};
pub use classify::{classify, MetricClass};
pub use config::{load_config, validate_config, Config, Instance, MetricSpec, TagSpec};
pub use oid::ObjectId;
pub use results::{ResultSet, RowIndex};
pub use sink::{MemorySink, MetricSink, Sample, ServiceStatus};
pub use value::SnmpValue;
