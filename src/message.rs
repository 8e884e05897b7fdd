// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire-level message shapes. The routing key carries `<sender>.<receiver>.<kind>`;
//! the body is only ever non-empty for `advise`.

use std::fmt;
use std::str::FromStr;

use crate::error::RaymondError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Request,
    Privilege,
    Initialize,
    Restart,
    Advise,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Request => "request",
            Kind::Privilege => "privilege",
            Kind::Initialize => "initialize",
            Kind::Restart => "restart",
            Kind::Advise => "advise",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = RaymondError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "request" => Ok(Kind::Request),
            "privilege" => Ok(Kind::Privilege),
            "initialize" => Ok(Kind::Initialize),
            "restart" => Ok(Kind::Restart),
            "advise" => Ok(Kind::Advise),
            other => Err(RaymondError::UnknownMessageKind(other.to_string())),
        }
    }
}

/// A message as delivered to a node's consumer task: the routing key's
/// sender segment plus kind, and the (usually empty) body.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub sender: String,
    pub kind: Kind,
    pub body: String,
}

/// A neighbor's view of its edge to a recovering node `r`:
/// `(holder == r, asked, r in request_q)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdviseTriple {
    pub holder_is_r: bool,
    pub asked: bool,
    pub r_in_queue: bool,
}

impl AdviseTriple {
    pub fn encode(&self) -> String {
        format!("({}, {}, {})", self.holder_is_r, self.asked, self.r_in_queue)
    }

    pub fn parse(body: &str) -> Result<Self, RaymondError> {
        let trimmed = body.trim().trim_start_matches('(').trim_end_matches(')');
        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(RaymondError::BadAdviseBody(body.to_string()));
        }
        let mut bits = [false; 3];
        for (slot, part) in bits.iter_mut().zip(parts.iter()) {
            *slot = match *part {
                "true" => true,
                "false" => false,
                _ => return Err(RaymondError::BadAdviseBody(body.to_string())),
            };
        }
        Ok(AdviseTriple { holder_is_r: bits[0], asked: bits[1], r_in_queue: bits[2] })
    }
}

/// A copy of every message handed to the transport, independent of backend,
/// for tests and for the optional debugging log mentioned in the wire format
/// notes. Not part of the protocol itself.
#[derive(Debug, Clone)]
pub struct TraceEvent {
    pub from: String,
    pub to: String,
    pub kind: Kind,
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
