//! Run command implementation.
//!
//! Polls every configured instance at the collection interval until a
//! shutdown signal arrives. One session per instance is opened lazily and
//! reused across cycles; a session that cannot be opened is retried on the
//! next tick.

use std::time::Duration;

use ahash::AHashMap as HashMap;
use tokio::signal;
use tracing::{error, info, warn};

use crate::check::Orchestrator;
use crate::config::{Config, Instance};
use crate::session::UdpSession;
use crate::sink::LogSink;

/// Polls all instances continuously at the collection interval.
pub async fn command_run(
    interval_override: Option<u64>,
    config: &Config,
    instances: &[Instance],
) -> Result<(), Box<dyn std::error::Error>> {
    if instances.is_empty() {
        return Err("no instances configured".into());
    }

    let interval = match interval_override {
        Some(secs) => Duration::from_secs(secs),
        None => config.init_config.collection_interval(),
    };

    let orchestrator = Orchestrator::new(&config.init_config);
    let sink = LogSink;
    let mut sessions: HashMap<String, UdpSession> = HashMap::new();

    info!(
        "Polling {} instances every {}s ({} MIB symbols loaded)",
        instances.len(),
        interval.as_secs(),
        orchestrator.registry().len()
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let shutdown_signal = async {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    };
    tokio::pin!(shutdown_signal);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                poll_all(&orchestrator, instances, &mut sessions, &sink).await;
            }
            _ = &mut shutdown_signal => {
                info!("Shutdown signal received, exiting...");
                break;
            }
        }
    }

    info!("snmp-poller stopped gracefully");
    Ok(())
}

/// One tick: every instance polled sequentially, each with its own session.
async fn poll_all(
    orchestrator: &Orchestrator,
    instances: &[Instance],
    sessions: &mut HashMap<String, UdpSession>,
    sink: &LogSink,
) {
    for instance in instances {
        let endpoint = instance.endpoint();
        if !sessions.contains_key(&endpoint) {
            match UdpSession::connect(instance).await {
                Ok(session) => {
                    sessions.insert(endpoint.clone(), session);
                }
                Err(e) => {
                    error!("Cannot open session to {}: {}", endpoint, e);
                    continue;
                }
            }
        }
        let session = sessions
            .get_mut(&endpoint)
            .expect("session inserted above");

        let report = orchestrator.run_cycle(instance, session, sink).await;
        if report.is_ok() {
            info!(
                device = %instance.ip_address,
                submitted = report.stats.submitted,
                skipped = report.stats.skipped,
                "poll cycle complete"
            );
        } else {
            warn!(
                device = %instance.ip_address,
                error = report.error.as_deref().unwrap_or("unknown"),
                "poll cycle failed"
            );
        }
    }
}
