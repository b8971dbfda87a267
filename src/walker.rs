//! Table walking and row aggregation.
//!
//! The session streams back a flat, order-sensitive list of (OID, value)
//! rows; the walker turns it into the keyed `ResultSet` the reporter works
//! from. In resolved mode each OID is decoded through the MIB registry into
//! a (symbol, row index) pair; in raw mode the dotted OID itself is the key
//! and every row is scalar-keyed.

use thiserror::Error;
use tracing::{debug, warn};

use crate::mib::MibRegistry;
use crate::oid::ObjectId;
use crate::results::{ResultSet, RowIndex};
use crate::session::{SessionError, SnmpSession};

/// Fatal walk failure: the device did not answer usefully at all.
/// Always aborts the remaining steps of the poll cycle.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct WalkError {
    pub message: String,
}

impl WalkError {
    fn new(error: &SessionError, device: &str) -> Self {
        WalkError {
            message: format!("{} for instance {}", error, device),
        }
    }
}

/// Walks every root and aggregates the returned rows.
///
/// A transport failure is fatal. A protocol error status is logged, the walk
/// of the remaining roots is abandoned, and whatever was collected so far is
/// returned; it is not retried within the cycle.
pub async fn walk<S: SnmpSession>(
    session: &mut S,
    roots: &[ObjectId],
    resolve_names: bool,
    registry: &MibRegistry,
    device: &str,
) -> Result<ResultSet, WalkError> {
    debug!("Querying device {} for {} oids", device, roots.len());

    let reply = session
        .walk_next(roots)
        .await
        .map_err(|e| WalkError::new(&e, device))?;

    if let Some(status) = &reply.error_status {
        warn!("{} for instance {}", status, device);
    }

    let mut results = ResultSet::new();
    for (oid, value) in reply.rows {
        if resolve_names {
            match registry.resolve(&oid) {
                Some(resolved) => {
                    let value = match resolved.class {
                        Some(class) => class.refine(value),
                        None => value,
                    };
                    results.insert(resolved.symbol, resolved.index, value);
                }
                None => warn!("No MIB symbol found for OID {}, skipping row", oid),
            }
        } else {
            results.insert(oid.to_string(), RowIndex::scalar(), value);
        }
    }

    Ok(results)
}
