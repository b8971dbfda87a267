//! `snmp2`-backed UDP session.
//!
//! One `UdpSession` wraps one `AsyncSession` per device and is reused across
//! poll cycles. Each get-next request runs under the instance's per-attempt
//! timeout with its retry budget; exhausting the budget is the fatal error
//! indication for the cycle.

use std::time::Duration;

use snmp2::{AsyncSession, Oid, Value};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::{Auth, Instance};
use crate::oid::ObjectId;
use crate::value::SnmpValue;

use super::{ErrorStatus, SessionError, SnmpSession, WalkReply};

pub struct UdpSession {
    session: AsyncSession,
    endpoint: String,
    timeout: Duration,
    retries: u32,
}

impl UdpSession {
    /// Opens a session to the instance's endpoint.
    ///
    /// Only v1/v2c community authentication is wired here; v3 targets are
    /// validated by the config layer but need an external session
    /// implementation plugged into the `SnmpSession` seam.
    pub async fn connect(instance: &Instance) -> Result<Self, SessionError> {
        let community = match &instance.auth {
            Auth::Community(community) => community.clone(),
            Auth::Usm { .. } => return Err(SessionError::UnsupportedVersion),
        };

        let endpoint = instance.endpoint();
        let session = AsyncSession::new_v2c(&endpoint, community.as_bytes(), 0)
            .await
            .map_err(|e| SessionError::Socket(format!("{:?}", e)))?;

        debug!(endpoint = %endpoint, "SNMP session opened");
        Ok(UdpSession {
            session,
            endpoint,
            timeout: instance.timeout,
            retries: instance.retries,
        })
    }

    fn wire_oid(oid: &ObjectId) -> Result<Oid<'static>, SessionError> {
        Oid::from(oid.components())
            .map_err(|e| SessionError::Snmp(format!("cannot encode OID {}: {:?}", oid, e)))
    }

    /// Walks everything under `root`, appending to `rows`. Returns the
    /// protocol error status if the device ended the walk with one.
    async fn walk_root(
        &mut self,
        root: &ObjectId,
        rows: &mut Vec<(ObjectId, SnmpValue)>,
    ) -> Result<Option<ErrorStatus>, SessionError> {
        let mut current = Self::wire_oid(root)?;

        loop {
            let mut attempts = 0;
            let pdu = loop {
                attempts += 1;
                match timeout(self.timeout, self.session.getnext(&current)).await {
                    Ok(Ok(pdu)) => break pdu,
                    Ok(Err(e)) => return Err(SessionError::Snmp(format!("{:?}", e))),
                    Err(_) if attempts <= self.retries => {
                        debug!(
                            endpoint = %self.endpoint,
                            attempt = attempts,
                            "request timed out, retrying"
                        );
                    }
                    Err(_) => return Err(SessionError::Timeout { attempts }),
                }
            };

            if pdu.error_status != 0 {
                return Ok(Some(ErrorStatus {
                    status: pdu.error_status,
                    index: pdu.error_index,
                }));
            }

            let mut next = None;
            for (oid, value) in pdu.varbinds {
                let decoded = match ObjectId::parse(&oid.to_string()) {
                    Ok(decoded) => decoded,
                    Err(e) => {
                        warn!(endpoint = %self.endpoint, "skipping undecodable OID: {}", e);
                        continue;
                    }
                };

                // Left the subtree, or hit the end of the MIB view: the
                // walk of this root is complete.
                if !decoded.starts_with(root) || matches!(value, Value::EndOfMibView) {
                    return Ok(None);
                }

                rows.push((decoded.clone(), decode_value(&value)));
                next = Some(decoded);
            }

            match next {
                Some(oid) => current = Self::wire_oid(&oid)?,
                // Empty reply without an error status; nothing to advance to.
                None => return Ok(None),
            }
        }
    }
}

impl SnmpSession for UdpSession {
    async fn walk_next(&mut self, roots: &[ObjectId]) -> Result<WalkReply, SessionError> {
        let mut reply = WalkReply::default();
        for root in roots {
            if let Some(status) = self.walk_root(root, &mut reply.rows).await? {
                reply.error_status = Some(status);
                break;
            }
        }
        Ok(reply)
    }
}

/// Converts a borrowed wire value into the owned poller value.
fn decode_value(value: &Value<'_>) -> SnmpValue {
    match value {
        Value::Integer(v) => SnmpValue::Integer(*v),
        Value::OctetString(bytes) => SnmpValue::OctetString(bytes.to_vec()),
        Value::ObjectIdentifier(oid) => match ObjectId::parse(&oid.to_string()) {
            Ok(parsed) => SnmpValue::ObjectIdentifier(parsed),
            Err(_) => SnmpValue::Null,
        },
        Value::IpAddress(octets) => SnmpValue::IpAddress(*octets),
        Value::Counter32(v) => SnmpValue::Counter32(*v),
        // The 0x42 wire tag; the registry refines it to Unsigned32 where a
        // textual convention says so.
        Value::Unsigned32(v) => SnmpValue::Gauge32(*v),
        Value::Timeticks(v) => SnmpValue::Timeticks(*v),
        Value::Opaque(bytes) => SnmpValue::Opaque(bytes.to_vec()),
        Value::Counter64(v) => SnmpValue::Counter64(*v),
        Value::Null => SnmpValue::Null,
        Value::NoSuchObject => SnmpValue::NoSuchObject,
        Value::NoSuchInstance => SnmpValue::NoSuchInstance,
        Value::EndOfMibView => SnmpValue::EndOfMibView,
        Value::Boolean(v) => SnmpValue::Integer(i64::from(*v)),
        _ => SnmpValue::Null,
    }
}
