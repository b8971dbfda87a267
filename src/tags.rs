//! Per-row tag resolution.
//!
//! Tags come from two places: a fixed 1-based position inside the row index
//! (e.g. the IP version component of ipSystemStatsTable rows) and sibling
//! columns of the same table read at the same index (e.g. ifDescr for
//! ifTable rows). Resolution is best-effort per row: one missing column must
//! not cost the tags derivable from the index or the other columns, since
//! partial observability is the common case on heterogeneous devices.
//!
//! Tags render as `"key:value"` with no escaping; a value containing `:`
//! makes the tag ambiguous downstream. Known limitation, kept as-is.

use tracing::warn;

use crate::config::TagSpec;
use crate::results::{ResultSet, RowIndex};

/// Tag specs of one table, split once per cycle so the per-row loop does
/// not re-discriminate them.
#[derive(Debug, Clone, Default)]
pub struct TagPlan {
    /// (tag key, 1-based index position)
    index_tags: Vec<(String, usize)>,
    /// (tag key, sibling column name)
    column_tags: Vec<(String, String)>,
}

impl TagPlan {
    pub fn from_specs(specs: &[TagSpec]) -> Self {
        let mut plan = TagPlan::default();
        for spec in specs {
            match spec {
                TagSpec::Index { key, position } => {
                    plan.index_tags.push((key.clone(), *position));
                }
                TagSpec::Column { key, column } => {
                    plan.column_tags.push((key.clone(), column.clone()));
                }
            }
        }
        plan
    }

    pub fn is_empty(&self) -> bool {
        self.index_tags.is_empty() && self.column_tags.is_empty()
    }

    /// Resolves the tags of one row against the cycle's collected results.
    pub fn resolve(&self, index: &RowIndex, results: &ResultSet) -> Vec<String> {
        let mut tags = Vec::with_capacity(self.index_tags.len() + self.column_tags.len());

        for (key, position) in &self.index_tags {
            match index.get(position - 1) {
                Some(component) => tags.push(format!("{}:{}", key, component)),
                None => warn!("Not enough indexes, skipping tag {}", key),
            }
        }

        for (key, column) in &self.column_tags {
            let value = match results.value_at(column, index) {
                Some(value) => value,
                None => {
                    warn!(
                        "Column {} not present in the table, skipping tag {}",
                        column, key
                    );
                    continue;
                }
            };
            if value.is_invalid_reply() {
                warn!("Can't deduct tag from column {} for tag {}", column, key);
                continue;
            }
            tags.push(format!("{}:{}", key, value));
        }

        tags
    }
}
