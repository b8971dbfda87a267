//! Decoded SNMP wire values.
//!
//! `SnmpValue` owns its payload so rows can outlive the transport buffer they
//! were decoded from. The 64-bit textual-convention classes
//! (`ZeroBasedCounter64`, `CounterBasedGauge64`) share the `Counter64` wire
//! encoding but are kept as distinct variants: conflating them would misfile
//! a gauge as a rate.

use std::fmt;

use crate::oid::ObjectId;

/// A single decoded value as returned by a device.
#[derive(Debug, Clone, PartialEq)]
pub enum SnmpValue {
    Counter32(u32),
    Counter64(u64),
    ZeroBasedCounter64(u64),
    Gauge32(u32),
    Unsigned32(u32),
    CounterBasedGauge64(u64),
    Integer(i64),
    OctetString(Vec<u8>),
    ObjectIdentifier(ObjectId),
    IpAddress([u8; 4]),
    Timeticks(u32),
    Opaque(Vec<u8>),
    Null,
    /// Object not present on the device (GET-style reply). Must never be
    /// interpreted as 0; dropped with a diagnostic before classification.
    NoSuchObject,
    /// Instance not present on the device. Same handling as `NoSuchObject`.
    NoSuchInstance,
    /// Walk ran past the end of the MIB view; a walk-control value, not data.
    EndOfMibView,
}

impl SnmpValue {
    /// True for the invalid-reply sentinels that stand in for missing objects.
    pub fn is_invalid_reply(&self) -> bool {
        matches!(self, SnmpValue::NoSuchObject | SnmpValue::NoSuchInstance)
    }

    /// The wire-type name used in diagnostics, matching the SNMP class names.
    pub fn type_name(&self) -> &'static str {
        match self {
            SnmpValue::Counter32(_) => "Counter32",
            SnmpValue::Counter64(_) => "Counter64",
            SnmpValue::ZeroBasedCounter64(_) => "ZeroBasedCounter64",
            SnmpValue::Gauge32(_) => "Gauge32",
            SnmpValue::Unsigned32(_) => "Unsigned32",
            SnmpValue::CounterBasedGauge64(_) => "CounterBasedGauge64",
            SnmpValue::Integer(_) => "Integer",
            SnmpValue::OctetString(_) => "OctetString",
            SnmpValue::ObjectIdentifier(_) => "ObjectIdentifier",
            SnmpValue::IpAddress(_) => "IpAddress",
            SnmpValue::Timeticks(_) => "Timeticks",
            SnmpValue::Opaque(_) => "Opaque",
            SnmpValue::Null => "Null",
            SnmpValue::NoSuchObject => "NoSuchObject",
            SnmpValue::NoSuchInstance => "NoSuchInstance",
            SnmpValue::EndOfMibView => "EndOfMibView",
        }
    }

    /// Numeric sample value for the counter/gauge classes, `None` otherwise.
    pub fn metric_value(&self) -> Option<f64> {
        match self {
            SnmpValue::Counter32(v) | SnmpValue::Gauge32(v) | SnmpValue::Unsigned32(v) => {
                Some(f64::from(*v))
            }
            SnmpValue::Counter64(v)
            | SnmpValue::ZeroBasedCounter64(v)
            | SnmpValue::CounterBasedGauge64(v) => Some(*v as f64),
            _ => None,
        }
    }
}

/// Renders bytes as text when printable, as `0x…` hex otherwise.
fn render_octets(bytes: &[u8]) -> String {
    let printable = bytes
        .iter()
        .all(|b| b.is_ascii_graphic() || *b == b' ');
    if printable {
        match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => hex_string(bytes),
        }
    } else {
        hex_string(bytes)
    }
}

fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

impl fmt::Display for SnmpValue {
    /// Textual rendering used for tag values and diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnmpValue::Counter32(v) | SnmpValue::Gauge32(v) | SnmpValue::Unsigned32(v) => {
                write!(f, "{}", v)
            }
            SnmpValue::Counter64(v)
            | SnmpValue::ZeroBasedCounter64(v)
            | SnmpValue::CounterBasedGauge64(v) => write!(f, "{}", v),
            SnmpValue::Integer(v) => write!(f, "{}", v),
            SnmpValue::Timeticks(v) => write!(f, "{}", v),
            SnmpValue::OctetString(bytes) => write!(f, "{}", render_octets(bytes)),
            SnmpValue::ObjectIdentifier(oid) => write!(f, "{}", oid),
            SnmpValue::IpAddress(octets) => write!(
                f,
                "{}.{}.{}.{}",
                octets[0], octets[1], octets[2], octets[3]
            ),
            SnmpValue::Opaque(bytes) => write!(f, "{}", hex_string(bytes)),
            SnmpValue::Null => write!(f, "null"),
            SnmpValue::NoSuchObject => write!(f, "noSuchObject"),
            SnmpValue::NoSuchInstance => write!(f, "noSuchInstance"),
            SnmpValue::EndOfMibView => write!(f, "endOfMibView"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable_octet_string_renders_as_text() {
        let value = SnmpValue::OctetString(b"GigabitEthernet0/1".to_vec());
        assert_eq!(value.to_string(), "GigabitEthernet0/1");
    }

    #[test]
    fn test_binary_octet_string_renders_as_hex() {
        let value = SnmpValue::OctetString(vec![0x00, 0x1a, 0x2b]);
        assert_eq!(value.to_string(), "0x001a2b");
    }

    #[test]
    fn test_ip_address_renders_dotted() {
        let value = SnmpValue::IpAddress([10, 0, 12, 1]);
        assert_eq!(value.to_string(), "10.0.12.1");
    }

    #[test]
    fn test_metric_value_covers_counter_and_gauge_classes() {
        assert_eq!(SnmpValue::Counter32(500).metric_value(), Some(500.0));
        assert_eq!(SnmpValue::Counter64(9000).metric_value(), Some(9000.0));
        assert_eq!(SnmpValue::CounterBasedGauge64(7).metric_value(), Some(7.0));
        assert_eq!(SnmpValue::Integer(12).metric_value(), None);
        assert_eq!(
            SnmpValue::OctetString(b"eth0".to_vec()).metric_value(),
            None
        );
    }

    #[test]
    fn test_invalid_reply_sentinels() {
        assert!(SnmpValue::NoSuchObject.is_invalid_reply());
        assert!(SnmpValue::NoSuchInstance.is_invalid_reply());
        assert!(!SnmpValue::EndOfMibView.is_invalid_reply());
        assert!(!SnmpValue::Counter32(0).is_invalid_reply());
    }
}
