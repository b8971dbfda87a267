//! SNMP session seam.
//!
//! A session owns the transport to one device and answers get-next walks.
//! The walker only depends on the `SnmpSession` trait, so the `snmp2`-backed
//! UDP session and the scripted `FakeSession` are interchangeable.

pub mod fake;
pub mod udp;

pub use fake::FakeSession;
pub use udp::UdpSession;

use thiserror::Error;

use crate::oid::ObjectId;
use crate::value::SnmpValue;

/// Transport-level failures. Any of these is the walk's fatal error
/// indication; there is no partial data to salvage.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("request timeout after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("SNMP error: {0}")]
    Snmp(String),

    #[error("socket error: {0}")]
    Socket(String),

    #[error("SNMPv3 targets require an external session implementation")]
    UnsupportedVersion,
}

/// Protocol-level error status returned inside an otherwise valid reply.
/// Non-fatal: the walk stops early and keeps what was collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorStatus {
    pub status: u32,
    pub index: u32,
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error status {} at index {}", self.status, self.index)
    }
}

/// Everything one walk call produced: the collected rows in device order,
/// plus the protocol error status that ended the walk early, if any.
#[derive(Debug, Clone, Default)]
pub struct WalkReply {
    pub rows: Vec<(ObjectId, SnmpValue)>,
    pub error_status: Option<ErrorStatus>,
}

/// One device conversation. Calls are never issued concurrently on the same
/// session; the orchestrator holds it `&mut` for the whole cycle.
pub trait SnmpSession {
    /// Performs a get-next walk under each root and returns all rows that
    /// fall under one of them.
    fn walk_next(
        &mut self,
        roots: &[ObjectId],
    ) -> impl std::future::Future<Output = Result<WalkReply, SessionError>> + Send;
}
