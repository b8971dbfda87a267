//! Check command implementation.
//!
//! Runs one poll cycle per configured instance and prints what was
//! collected. Useful for validating a new device entry before running the
//! poller as a daemon.

use crate::check::Orchestrator;
use crate::config::{Config, Instance};
use crate::session::UdpSession;
use crate::sink::{MemorySink, SampleKind};

/// Runs one poll cycle per instance and prints the results.
pub async fn command_check(
    instance_filter: Option<String>,
    verbose: bool,
    config: &Config,
    instances: &[Instance],
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 SNMP Poller - Check");
    println!("======================");

    let selected: Vec<&Instance> = instances
        .iter()
        .filter(|i| {
            instance_filter
                .as_ref()
                .map(|ip| *ip == i.ip_address)
                .unwrap_or(true)
        })
        .collect();

    if selected.is_empty() {
        match &instance_filter {
            Some(ip) => println!("❌ No configured instance matches {}", ip),
            None => println!("❌ No instances configured"),
        }
        return Err("nothing to check".into());
    }

    let orchestrator = Orchestrator::new(&config.init_config);
    println!(
        "📚 MIB registry: {} symbols loaded\n",
        orchestrator.registry().len()
    );

    let mut all_ok = true;
    for instance in selected {
        println!("📡 {}", instance.endpoint());

        let mut session = match UdpSession::connect(instance).await {
            Ok(session) => session,
            Err(e) => {
                println!("   ❌ Cannot open session: {}", e);
                all_ok = false;
                continue;
            }
        };

        let sink = MemorySink::new();
        let report = orchestrator.run_cycle(instance, &mut session, &sink).await;

        if report.is_ok() {
            println!(
                "   ✅ OK — {} samples submitted, {} skipped",
                report.stats.submitted, report.stats.skipped
            );
        } else {
            println!(
                "   ❌ CRITICAL — {}",
                report.error.as_deref().unwrap_or("unknown error")
            );
            all_ok = false;
        }

        if verbose {
            for sample in sink.samples() {
                let kind = match sample.kind {
                    SampleKind::Rate => "rate ",
                    SampleKind::Gauge => "gauge",
                };
                println!(
                    "      {} {} = {} [{}]",
                    kind,
                    sample.name,
                    sample.value,
                    sample.tags.join(", ")
                );
            }
        }
    }

    if all_ok {
        Ok(())
    } else {
        Err("one or more instances failed".into())
    }
}
