//! Scripted fake session for tests and dry runs.
//!
//! The fake answers each `walk_next` call with the next scripted reply and
//! records the requested roots so tests can assert what was queried. An
//! exhausted script answers with empty replies.

use std::collections::VecDeque;

use crate::oid::ObjectId;
use crate::value::SnmpValue;

use super::{SessionError, SnmpSession, WalkReply};

#[derive(Default)]
pub struct FakeSession {
    script: VecDeque<Result<WalkReply, SessionError>>,
    requests: Vec<Vec<ObjectId>>,
}

impl FakeSession {
    pub fn new(script: Vec<Result<WalkReply, SessionError>>) -> Self {
        FakeSession {
            script: script.into(),
            requests: Vec::new(),
        }
    }

    /// A reply built from dotted-OID/value rows, for test scripts.
    pub fn reply(rows: &[(&str, SnmpValue)]) -> WalkReply {
        WalkReply {
            rows: rows
                .iter()
                .map(|(oid, value)| (oid.parse().expect("scripted OID"), value.clone()))
                .collect(),
            error_status: None,
        }
    }

    /// Root sets requested so far, in call order.
    pub fn requests(&self) -> &[Vec<ObjectId>] {
        &self.requests
    }
}

impl SnmpSession for FakeSession {
    async fn walk_next(&mut self, roots: &[ObjectId]) -> Result<WalkReply, SessionError> {
        self.requests.push(roots.to_vec());
        match self.script.pop_front() {
            Some(reply) => reply,
            None => Ok(WalkReply::default()),
        }
    }
}
