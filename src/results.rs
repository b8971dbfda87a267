//! Containers for collected walk results.
//!
//! A walk produces a keyed mapping, not a sequence: metric name (or dotted
//! OID for raw queries) to row index to value. Callers must not rely on any
//! ordering of the names; rows under one name iterate in index order so that
//! repeated cycles over the same device snapshot report identically.

use std::collections::BTreeMap;
use std::fmt;

use ahash::AHashMap as HashMap;

use crate::value::SnmpValue;

/// Ordered tuple of numeric index components identifying one table row.
///
/// Two rows are the same entity iff their tuples are equal. Scalar objects
/// and raw-query rows use the zero-index sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowIndex(Vec<u64>);

impl RowIndex {
    pub fn new(components: Vec<u64>) -> Self {
        RowIndex(components)
    }

    /// The fixed sentinel index used for scalar objects and raw rows.
    pub fn scalar() -> Self {
        RowIndex(vec![0])
    }

    pub fn components(&self) -> &[u64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Component at a zero-based position.
    pub fn get(&self, position: usize) -> Option<u64> {
        self.0.get(position).copied()
    }
}

impl From<&[u64]> for RowIndex {
    fn from(components: &[u64]) -> Self {
        RowIndex(components.to_vec())
    }
}

impl fmt::Display for RowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.0 {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", component)?;
            first = false;
        }
        Ok(())
    }
}

/// Walk results: metric name (or dotted OID) → row index → value.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    entries: HashMap<String, BTreeMap<RowIndex, SnmpValue>>,
}

impl ResultSet {
    pub fn new() -> Self {
        ResultSet::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, index: RowIndex, value: SnmpValue) {
        self.entries
            .entry(name.into())
            .or_default()
            .insert(index, value);
    }

    /// All rows collected under one name, in index order.
    pub fn rows(&self, name: &str) -> Option<&BTreeMap<RowIndex, SnmpValue>> {
        self.entries.get(name)
    }

    /// The value of `name` at one specific row, if collected.
    pub fn value_at(&self, name: &str, index: &RowIndex) -> Option<&SnmpValue> {
        self.entries.get(name).and_then(|rows| rows.get(index))
    }

    /// Iterates collected names; no ordering guarantee.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of collected rows across all names.
    pub fn row_count(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_keyed_by_index_tuple() {
        let mut results = ResultSet::new();
        results.insert("ifInOctets", RowIndex::new(vec![2]), SnmpValue::Counter32(9));
        results.insert("ifInOctets", RowIndex::new(vec![1]), SnmpValue::Counter32(5));

        let rows = results.rows("ifInOctets").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows.get(&RowIndex::new(vec![1])),
            Some(&SnmpValue::Counter32(5))
        );
    }

    #[test]
    fn test_row_iteration_is_index_ordered() {
        let mut results = ResultSet::new();
        results.insert("ifInOctets", RowIndex::new(vec![10]), SnmpValue::Counter32(0));
        results.insert("ifInOctets", RowIndex::new(vec![2]), SnmpValue::Counter32(0));
        results.insert("ifInOctets", RowIndex::new(vec![1]), SnmpValue::Counter32(0));

        let order: Vec<String> = results
            .rows("ifInOctets")
            .unwrap()
            .keys()
            .map(|idx| idx.to_string())
            .collect();
        assert_eq!(order, vec!["1", "2", "10"]);
    }

    #[test]
    fn test_scalar_sentinel_is_stable() {
        assert_eq!(RowIndex::scalar(), RowIndex::scalar());
        assert_eq!(RowIndex::scalar().components(), &[0]);
    }

    #[test]
    fn test_value_at_distinguishes_rows() {
        let mut results = ResultSet::new();
        results.insert(
            "ifDescr",
            RowIndex::new(vec![1]),
            SnmpValue::OctetString(b"lo".to_vec()),
        );
        assert!(results.value_at("ifDescr", &RowIndex::new(vec![1])).is_some());
        assert!(results.value_at("ifDescr", &RowIndex::new(vec![2])).is_none());
        assert!(results.value_at("ifSpeed", &RowIndex::new(vec![1])).is_none());
    }
}
