//! Dotted object-identifier handling.
//!
//! OIDs are kept as numeric sub-identifier sequences so that prefix tests and
//! ordering work component-wise; a string prefix test would falsely match
//! `…2.2.1.10` against `…2.2.1.100`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error produced when a dotted-OID string cannot be parsed.
#[derive(Debug, Error)]
#[error("invalid OID `{input}`: {reason}")]
pub struct OidParseError {
    pub input: String,
    pub reason: String,
}

/// An object identifier as an ordered sequence of numeric sub-identifiers.
///
/// Ordering is derived from the component vector, which matches the
/// lexicographic OID order used by get-next walks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(Vec<u64>);

impl ObjectId {
    /// Parses a dotted string such as `1.3.6.1.2.1.2.2.1.10`.
    ///
    /// Leading/trailing whitespace and a leading dot are tolerated; empty
    /// input or non-numeric components are rejected.
    pub fn parse(s: &str) -> Result<Self, OidParseError> {
        let components: Result<Vec<u64>, _> = s
            .trim()
            .split('.')
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<u64>())
            .collect();

        let components = components.map_err(|e| OidParseError {
            input: s.to_string(),
            reason: e.to_string(),
        })?;

        if components.is_empty() {
            return Err(OidParseError {
                input: s.to_string(),
                reason: "no components".to_string(),
            });
        }

        Ok(ObjectId(components))
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

    /// Component-wise prefix test; an OID is a prefix of itself.
    pub fn starts_with(&self, prefix: &ObjectId) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// The index components remaining after `prefix`, if `self` lies under it.
    pub fn suffix(&self, prefix: &ObjectId) -> Option<&[u64]> {
        if self.starts_with(prefix) {
            Some(&self.0[prefix.0.len()..])
        } else {
            None
        }
    }

    /// Drops a single trailing `.0` scalar index, if present.
    ///
    /// Get-next walks expect a non-terminal root, so a configured scalar OID
    /// such as `1.3.6.1.2.1.1.3.0` is queried as `1.3.6.1.2.1.1.3`.
    pub fn strip_scalar_index(&self) -> ObjectId {
        if self.0.len() > 1 && self.0.last() == Some(&0) {
            ObjectId(self.0[..self.0.len() - 1].to_vec())
        } else {
            self.clone()
        }
    }
}

impl From<&[u64]> for ObjectId {
    fn from(components: &[u64]) -> Self {
        ObjectId(components.to_vec())
    }
}

impl From<Vec<u64>> for ObjectId {
    fn from(components: Vec<u64>) -> Self {
        ObjectId(components)
    }
}

impl FromStr for ObjectId {
    type Err = OidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse(s)
    }
}

impl fmt::Display for ObjectId {
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
