//! End-to-end poll cycles over a scripted fake session.

use std::time::Duration;

use snmp_poller::check::{Orchestrator, Phase};
use snmp_poller::config::{Auth, InitConfig, Instance, MetricSpec, TagSpec};
use snmp_poller::session::{FakeSession, SessionError};
use snmp_poller::sink::{MemorySink, SampleKind, ServiceStatus};
use snmp_poller::value::SnmpValue;

fn instance(tags: Vec<&str>, metrics: Vec<MetricSpec>) -> Instance {
    Instance {
        ip_address: "192.168.34.10".into(),
        port: 161,
        auth: Auth::Community("public".into()),
        timeout: Duration::from_secs(1),
        retries: 5,
        tags: tags.into_iter().map(str::to_string).collect(),
        metrics,
    }
}

fn orchestrator() -> Orchestrator {
    Orchestrator::new(&InitConfig::default())
}

fn if_table_spec() -> MetricSpec {
    MetricSpec::Table {
        mib: "IF-MIB".into(),
        table: "ifTable".into(),
        symbols: vec!["ifInOctets".into()],
        tags: vec![TagSpec::Column {
            key: "interface".into(),
            column: "ifDescr".into(),
        }],
    }
}

fn if_table_reply() -> snmp_poller::session::WalkReply {
    FakeSession::reply(&[
        (
            "1.3.6.1.2.1.2.2.1.2.1",
            SnmpValue::OctetString(b"eth0".to_vec()),
        ),
        (
            "1.3.6.1.2.1.2.2.1.2.2",
            SnmpValue::OctetString(b"eth1".to_vec()),
        ),
        ("1.3.6.1.2.1.2.2.1.10.1", SnmpValue::Counter32(500)),
        ("1.3.6.1.2.1.2.2.1.10.2", SnmpValue::Counter32(120)),
    ])
}

#[tokio::test]
async fn table_cycle_submits_tagged_rates_and_ok_check() {
    let mut session = FakeSession::new(vec![Ok(if_table_reply())]);
    let sink = MemorySink::new();

    let report = orchestrator()
        .run_cycle(
            &instance(vec!["env:prod"], vec![if_table_spec()]),
            &mut session,
            &sink,
        )
        .await;

    assert_eq!(report.phase, Phase::Done);
    assert_eq!(report.stats.submitted, 2);

    let samples = sink.samples();
    assert_eq!(samples.len(), 2);
    for sample in &samples {
        assert_eq!(sample.name, "snmp.ifInOctets");
        assert_eq!(sample.kind, SampleKind::Rate);
    }
    assert_eq!(
        samples[0].tags,
        vec![
            "env:prod".to_string(),
            "snmp_device:192.168.34.10".into(),
            "interface:eth0".into(),
        ]
    );
    assert_eq!(samples[1].tags.last().unwrap(), "interface:eth1");

    let checks = sink.service_checks();
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].name, "snmp.can_check");
    assert_eq!(checks[0].status, ServiceStatus::Ok);
    // The service check carries the device tag only, not the instance tags.
    assert_eq!(checks[0].tags, vec!["snmp_device:192.168.34.10".to_string()]);
}

#[tokio::test]
async fn raw_cycle_matches_deeper_oid_by_prefix() {
    // Device answers one index level below the configured root.
    let mut session = FakeSession::new(vec![Ok(FakeSession::reply(&[(
        "1.3.6.1.2.1.2.2.1.10.1",
        SnmpValue::Counter32(500),
    )]))]);
    let sink = MemorySink::new();

    let report = orchestrator()
        .run_cycle(
            &instance(
                vec![],
                vec![MetricSpec::RawOid {
                    oid: "1.3.6.1.2.1.2.2.1.10".into(),
                    name: Some("bytes_in".into()),
                }],
            ),
            &mut session,
            &sink,
        )
        .await;

    assert!(report.is_ok());
    let samples = sink.samples();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].name, "snmp.bytes_in");
    assert_eq!(samples[0].value, 500.0);
}

#[tokio::test]
async fn scalar_single_row_submits_one_sample() {
    let mut session = FakeSession::new(vec![Ok(FakeSession::reply(&[(
        "1.3.6.1.2.1.6.9.0",
        SnmpValue::Gauge32(17),
    )]))]);
    let sink = MemorySink::new();

    let report = orchestrator()
        .run_cycle(
            &instance(
                vec![],
                vec![MetricSpec::Symbol {
                    mib: "TCP-MIB".into(),
                    symbol: "tcpCurrEstab".into(),
                }],
            ),
            &mut session,
            &sink,
        )
        .await;

    assert_eq!(report.stats.submitted, 1);
    assert_eq!(sink.samples()[0].name, "snmp.tcpCurrEstab");
    assert_eq!(sink.samples()[0].kind, SampleKind::Gauge);
}

#[tokio::test]
async fn scalar_with_several_rows_submits_nothing() {
    // A device/config mismatch: the "scalar" resolves to a whole column.
    let mut session = FakeSession::new(vec![Ok(FakeSession::reply(&[
        ("1.3.6.1.2.1.6.9.1", SnmpValue::Gauge32(17)),
        ("1.3.6.1.2.1.6.9.2", SnmpValue::Gauge32(18)),
    ]))]);
    let sink = MemorySink::new();

    let report = orchestrator()
        .run_cycle(
            &instance(
                vec![],
                vec![MetricSpec::Symbol {
                    mib: "TCP-MIB".into(),
                    symbol: "tcpCurrEstab".into(),
                }],
            ),
            &mut session,
            &sink,
        )
        .await;

    assert!(report.is_ok());
    assert_eq!(report.stats.submitted, 0);
    assert!(sink.samples().is_empty());
}

#[tokio::test]
async fn fatal_indication_emits_one_critical_and_stops() {
    let mut session = FakeSession::new(vec![Err(SessionError::Snmp(
        "no response received".into(),
    ))]);
    let sink = MemorySink::new();

    // Both query sets are planned; the raw set must never run.
    let report = orchestrator()
        .run_cycle(
            &instance(
                vec![],
                vec![
                    if_table_spec(),
                    MetricSpec::RawOid {
                        oid: "1.3.6.1.2.1.1.3.0".into(),
                        name: Some("uptime".into()),
                    },
                ],
            ),
            &mut session,
            &sink,
        )
        .await;

    assert_eq!(report.phase, Phase::Failed);
    assert_eq!(session.requests().len(), 1);
    assert!(sink.samples().is_empty());

    let checks = sink.service_checks();
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].status, ServiceStatus::Critical);
    assert_eq!(
        checks[0].message.as_deref(),
        Some("SNMP error: no response received for instance 192.168.34.10")
    );
}

#[tokio::test]
async fn empty_metrics_query_nothing_and_report_ok() {
    let mut session = FakeSession::new(vec![]);
    let sink = MemorySink::new();

    let report = orchestrator()
        .run_cycle(&instance(vec![], vec![]), &mut session, &sink)
        .await;

    assert_eq!(report.phase, Phase::Done);
    assert!(session.requests().is_empty());
    assert!(sink.samples().is_empty());
    assert_eq!(sink.service_checks().len(), 1);
    assert_eq!(sink.service_checks()[0].status, ServiceStatus::Ok);
}

#[tokio::test]
async fn mixed_cycle_walks_both_query_sets() {
    let mut session = FakeSession::new(vec![
        Ok(if_table_reply()),
        Ok(FakeSession::reply(&[(
            "1.3.6.1.2.1.1.3.0",
            SnmpValue::Gauge32(123456),
        )])),
    ]);
    let sink = MemorySink::new();

    let report = orchestrator()
        .run_cycle(
            &instance(
                vec![],
                vec![
                    if_table_spec(),
                    MetricSpec::RawOid {
                        oid: "1.3.6.1.2.1.1.3.0".into(),
                        name: Some("uptime".into()),
                    },
                ],
            ),
            &mut session,
            &sink,
        )
        .await;

    assert!(report.is_ok());
    assert_eq!(session.requests().len(), 2);
    assert_eq!(report.stats.submitted, 3);

    // The raw root is walked with the trailing .0 stripped.
    assert_eq!(
        session.requests()[1],
        vec!["1.3.6.1.2.1.1.3".parse().unwrap()]
    );
}

#[tokio::test]
async fn rerunning_an_unchanged_snapshot_is_idempotent() {
    let metrics = vec![if_table_spec()];
    let orchestrator = orchestrator();

    let mut first_session = FakeSession::new(vec![Ok(if_table_reply())]);
    let first_sink = MemorySink::new();
    orchestrator
        .run_cycle(
            &instance(vec!["env:prod"], metrics.clone()),
            &mut first_session,
            &first_sink,
        )
        .await;

    let mut second_session = FakeSession::new(vec![Ok(if_table_reply())]);
    let second_sink = MemorySink::new();
    orchestrator
        .run_cycle(
            &instance(vec!["env:prod"], metrics),
            &mut second_session,
            &second_sink,
        )
        .await;

    assert_eq!(first_sink.samples(), second_sink.samples());
    assert_eq!(first_sink.service_checks(), second_sink.service_checks());
}

#[tokio::test]
async fn unknown_symbols_are_omitted_but_cycle_stays_ok() {
    let mut session = FakeSession::new(vec![]);
    let sink = MemorySink::new();

    let report = orchestrator()
        .run_cycle(
            &instance(
                vec![],
                vec![MetricSpec::Symbol {
                    mib: "NO-SUCH-MIB".into(),
                    symbol: "noSuchSymbol".into(),
                }],
            ),
            &mut session,
            &sink,
        )
        .await;

    // Nothing plannable, so nothing queried; health is still reported.
    assert!(report.is_ok());
    assert!(session.requests().is_empty());
    assert_eq!(sink.service_checks().len(), 1);
}
