//! Precompiled MIB symbol registry.
//!
//! The registry maps `(MIB, symbol)` names to OIDs for query planning and
//! resolves response OIDs back to `(MIB, symbol, row index)` by longest
//! prefix. A built-in table covering the common IETF MIBs is embedded from
//! TOML at compile time; extension files with the same schema can be merged
//! in from a configured folder.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use ahash::AHashMap as HashMap;
use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::oid::ObjectId;
use crate::results::RowIndex;
use crate::value::SnmpValue;

/// Textual convention refining a wire type the encoding alone cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueClass {
    ZeroBasedCounter64,
    CounterBasedGauge64,
    Unsigned32,
}

impl ValueClass {
    /// Rewrites `value` into the declared class when the wire type admits it.
    /// Values with a different wire type pass through unchanged.
    pub fn refine(self, value: SnmpValue) -> SnmpValue {
        match (self, value) {
            (ValueClass::ZeroBasedCounter64, SnmpValue::Counter64(v)) => {
                SnmpValue::ZeroBasedCounter64(v)
            }
            (ValueClass::CounterBasedGauge64, SnmpValue::Counter64(v)) => {
                SnmpValue::CounterBasedGauge64(v)
            }
            (ValueClass::Unsigned32, SnmpValue::Gauge32(v)) => SnmpValue::Unsigned32(v),
            (_, other) => other,
        }
    }
}

/// One leaf object (scalar or table column) known to the registry.
#[derive(Debug, Clone)]
struct MibObject {
    mib: String,
    symbol: String,
    class: Option<ValueClass>,
}

/// A response OID resolved against the registry.
#[derive(Debug)]
pub struct ResolvedOid<'a> {
    pub mib: &'a str,
    pub symbol: &'a str,
    pub class: Option<ValueClass>,
    /// Index components following the object prefix; scalar instances
    /// (`.0`) collapse to the scalar sentinel.
    pub index: RowIndex,
}

#[derive(Deserialize)]
struct ScalarEntry {
    mib: String,
    symbol: String,
    oid: String,
    class: Option<ValueClass>,
}

#[derive(Deserialize)]
struct ColumnEntry {
    symbol: String,
    column: u64,
    class: Option<ValueClass>,
}

#[derive(Deserialize)]
struct TableEntry {
    mib: String,
    table: String,
    oid: String,
    entry: String,
    columns: Vec<ColumnEntry>,
}

#[derive(Deserialize)]
struct MibData {
    #[serde(default)]
    objects: Vec<ScalarEntry>,
    #[serde(default)]
    tables: Vec<TableEntry>,
}

/// Symbol registry: name lookup for the planner, prefix resolution for walks.
#[derive(Debug, Clone, Default)]
pub struct MibRegistry {
    by_name: HashMap<(String, String), ObjectId>,
    leaves: BTreeMap<ObjectId, MibObject>,
}

/// Built-in registry parsed from the embedded symbol tables.
static BASE: Lazy<MibRegistry> = Lazy::new(|| {
    let mut registry = MibRegistry::default();
    let content = include_str!("../data/base_mibs.toml");
    if let Err(e) = registry.load_str(content) {
        eprintln!("Failed to parse built-in MIB tables: {}", e);
    }
    registry
});

impl MibRegistry {
    /// The built-in registry alone.
    pub fn builtin() -> MibRegistry {
        BASE.clone()
    }

    /// The built-in registry plus any extension files found in `folder`.
    pub fn with_extensions(folder: Option<&Path>) -> MibRegistry {
        let mut registry = BASE.clone();
        if let Some(dir) = folder {
            registry.load_folder(dir);
        }
        registry
    }

    /// Merges symbol tables from a TOML document. Later entries replace
    /// earlier ones with the same name or OID.
    pub fn load_str(&mut self, content: &str) -> Result<(), toml::de::Error> {
        let data: MibData = toml::from_str(content)?;

        for entry in data.objects {
            let oid = match entry.oid.parse::<ObjectId>() {
                Ok(oid) => oid,
                Err(e) => {
                    warn!("skipping MIB object {}::{}: {}", entry.mib, entry.symbol, e);
                    continue;
                }
            };
            self.insert_leaf(entry.mib, entry.symbol, oid, entry.class);
        }

        for table in data.tables {
            let table_oid = match table.oid.parse::<ObjectId>() {
                Ok(oid) => oid,
                Err(e) => {
                    warn!("skipping MIB table {}::{}: {}", table.mib, table.table, e);
                    continue;
                }
            };
            let entry_oid = match table.entry.parse::<ObjectId>() {
                Ok(oid) => oid,
                Err(e) => {
                    warn!("skipping MIB table {}::{}: {}", table.mib, table.table, e);
                    continue;
                }
            };
            self.by_name
                .insert((table.mib.clone(), table.table.clone()), table_oid);
            for column in table.columns {
                let mut components = entry_oid.components().to_vec();
                components.push(column.column);
                self.insert_leaf(
                    table.mib.clone(),
                    column.symbol,
                    ObjectId::from(components),
                    column.class,
                );
            }
        }

        Ok(())
    }

    /// Merges every `.toml` file in `folder`. Unreadable folders and files
    /// are skipped with a warning.
    pub fn load_folder(&mut self, folder: &Path) {
        let entries = match fs::read_dir(folder) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("cannot read MIB folder {}: {}", folder.display(), e);
                return;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
                continue;
            }
            match fs::read_to_string(&path) {
                Ok(content) => match self.load_str(&content) {
                    Ok(()) => debug!("loaded MIB extensions from {}", path.display()),
                    Err(e) => warn!("cannot parse MIB file {}: {}", path.display(), e),
                },
                Err(e) => warn!("cannot read MIB file {}: {}", path.display(), e),
            }
        }
    }

    fn insert_leaf(&mut self, mib: String, symbol: String, oid: ObjectId, class: Option<ValueClass>) {
        self.by_name
            .insert((mib.clone(), symbol.clone()), oid.clone());
        self.leaves.insert(oid, MibObject { mib, symbol, class });
    }

    /// OID of a named object: a scalar, a table, or a table column.
    pub fn lookup(&self, mib: &str, name: &str) -> Option<&ObjectId> {
        self.by_name.get(&(mib.to_string(), name.to_string()))
    }

    /// Resolves a response OID to the leaf object owning the longest
    /// matching prefix, splitting off the remaining components as the row
    /// index.
    pub fn resolve(&self, oid: &ObjectId) -> Option<ResolvedOid<'_>> {
        for (prefix, object) in self.leaves.range(..=oid.clone()).rev() {
            if !oid.starts_with(prefix) {
                continue;
            }
            let suffix = &oid.components()[prefix.len()..];
            let index = if suffix.is_empty() || suffix == [0] {
                RowIndex::scalar()
            } else {
                RowIndex::new(suffix.to_vec())
            };
            return Some(ResolvedOid {
                mib: &object.mib,
                symbol: &object.symbol,
                class: object.class,
                index,
            });
        }
        None
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }
}
