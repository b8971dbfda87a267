//! Query planning.
//!
//! Turns the configured metric specs of one instance into the two walkable
//! OID sets: MIB-resolved objects (tables and scalar symbols) and raw OIDs.
//! Planning never fails; entries that cannot be mapped are skipped with a
//! warning so one bad metric does not stop the rest of the cycle.

use tracing::warn;

use crate::config::{MetricSpec, TagSpec};
use crate::mib::MibRegistry;
use crate::oid::ObjectId;

/// Reporter bookkeeping for one configured table.
#[derive(Debug, Clone)]
pub struct TableRequest {
    pub symbols: Vec<String>,
    pub tags: Vec<TagSpec>,
}

/// Reporter bookkeeping for one configured raw OID. `oid` keeps the
/// configured form (including any trailing `.0`) for result matching.
#[derive(Debug, Clone)]
pub struct RawRequest {
    pub oid: ObjectId,
    pub name: Option<String>,
}

/// The two query sets of one poll cycle plus what the reporter needs to
/// interpret their results.
#[derive(Debug, Clone, Default)]
pub struct QueryPlan {
    /// Walk roots resolved through the MIB registry.
    pub table_roots: Vec<ObjectId>,
    /// Walk roots queried verbatim, trailing `.0` stripped.
    pub raw_roots: Vec<ObjectId>,
    pub tables: Vec<TableRequest>,
    pub scalars: Vec<String>,
    pub raw: Vec<RawRequest>,
}

impl QueryPlan {
    pub fn has_resolved_queries(&self) -> bool {
        !self.table_roots.is_empty()
    }

    pub fn has_raw_queries(&self) -> bool {
        !self.raw_roots.is_empty()
    }
}

/// Builds the query plan for one instance. Either set may come out empty;
/// a fully empty plan means the cycle performs no network query at all.
pub fn plan_queries(metrics: &[MetricSpec], registry: &MibRegistry) -> QueryPlan {
    let mut plan = QueryPlan::default();

    for spec in metrics {
        match spec {
            MetricSpec::Table {
                mib,
                table,
                symbols,
                tags,
            } => match registry.lookup(mib, table) {
                Some(oid) => {
                    plan.table_roots.push(oid.clone());
                    plan.tables.push(TableRequest {
                        symbols: symbols.clone(),
                        tags: tags.clone(),
                    });
                }
                None => warn!("Can't generate MIB object for variable {}::{}", mib, table),
            },
            MetricSpec::Symbol { mib, symbol } => match registry.lookup(mib, symbol) {
                Some(oid) => {
                    plan.table_roots.push(oid.clone());
                    plan.scalars.push(symbol.clone());
                }
                None => warn!("Can't generate MIB object for variable {}::{}", mib, symbol),
            },
            MetricSpec::RawOid { oid, name } => match oid.parse::<ObjectId>() {
                Ok(parsed) => {
                    // Get-next needs a non-terminal root.
                    plan.raw_roots.push(parsed.strip_scalar_index());
                    plan.raw.push(RawRequest {
                        oid: parsed,
                        name: name.clone(),
                    });
                }
                Err(e) => warn!("Skipping raw OID entry: {}", e),
            },
            MetricSpec::Unrecognized { raw } => {
                warn!("Unsupported metric in config file: {}", raw);
            }
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetricSpec;

    fn registry() -> MibRegistry {
        MibRegistry::builtin()
    }

    fn oid(s: &str) -> ObjectId {
        s.parse().unwrap()
    }

    #[test]
    fn test_plan_splits_resolved_and_raw_sets() {
        let metrics = vec![
            MetricSpec::Table {
                mib: "IF-MIB".into(),
                table: "ifTable".into(),
                symbols: vec!["ifInOctets".into()],
                tags: vec![],
            },
            MetricSpec::Symbol {
                mib: "TCP-MIB".into(),
                symbol: "tcpCurrEstab".into(),
            },
            MetricSpec::RawOid {
                oid: "1.3.6.1.2.1.2.2.1.10".into(),
                name: Some("bytes_in".into()),
            },
        ];

        let plan = plan_queries(&metrics, &registry());
        assert_eq!(
            plan.table_roots,
            vec![oid("1.3.6.1.2.1.2.2"), oid("1.3.6.1.2.1.6.9")]
        );
        assert_eq!(plan.raw_roots, vec![oid("1.3.6.1.2.1.2.2.1.10")]);
        assert_eq!(plan.tables.len(), 1);
        assert_eq!(plan.scalars, vec!["tcpCurrEstab".to_string()]);
        assert_eq!(plan.raw.len(), 1);
        assert!(plan.has_resolved_queries());
        assert!(plan.has_raw_queries());
    }

    #[test]
    fn test_unknown_symbol_is_omitted() {
        let metrics = vec![
            MetricSpec::Symbol {
                mib: "IF-MIB".into(),
                symbol: "ifBogus".into(),
            },
            MetricSpec::Symbol {
                mib: "UDP-MIB".into(),
                symbol: "udpInDatagrams".into(),
            },
        ];
        let plan = plan_queries(&metrics, &registry());
        assert_eq!(plan.table_roots, vec![oid("1.3.6.1.2.1.7.1")]);
        assert_eq!(plan.scalars, vec!["udpInDatagrams".to_string()]);
    }

    #[test]
    fn test_trailing_zero_stripped_from_raw_root_only() {
        let metrics = vec![MetricSpec::RawOid {
            oid: "1.3.6.1.2.1.1.3.0".into(),
            name: None,
        }];
        let plan = plan_queries(&metrics, &registry());
        assert_eq!(plan.raw_roots, vec![oid("1.3.6.1.2.1.1.3")]);
        // The request keeps the configured form for matching.
        assert_eq!(plan.raw[0].oid, oid("1.3.6.1.2.1.1.3.0"));
    }

    #[test]
    fn test_garbage_oid_and_unrecognized_are_skipped() {
        let metrics = vec![
            MetricSpec::RawOid {
                oid: "not.an.oid".into(),
                name: None,
            },
            MetricSpec::Unrecognized {
                raw: "{\"MIB\":\"IF-MIB\"}".into(),
            },
        ];
        let plan = plan_queries(&metrics, &registry());
        assert!(!plan.has_resolved_queries());
        assert!(!plan.has_raw_queries());
        assert!(plan.raw.is_empty());
    }

    #[test]
    fn test_empty_metrics_make_empty_plan() {
        let plan = plan_queries(&[], &registry());
        assert!(!plan.has_resolved_queries());
        assert!(!plan.has_raw_queries());
    }
}
