// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory channel fabric. Backs the unit and integration tests, and
//! doubles as the default runtime transport when no NATS URL is configured.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::error::RaymondError;
use crate::message::{Envelope, Kind};

pub type MemoryInbox = mpsc::UnboundedReceiver<Envelope>;

#[derive(Clone)]
pub struct MemoryFabric {
    registry: Arc<Mutex<HashMap<String, mpsc::UnboundedSender<Envelope>>>>,
}

impl MemoryFabric {
    pub fn new() -> Self {
        Self { registry: Arc::new(Mutex::new(HashMap::new())) }
    }

    /// Claim the inbox for `name`, creating its channel. Registering the
    /// same name twice replaces the previous channel (the old receiver is
    /// simply abandoned), mirroring a node rejoining under the same name.
    pub fn register(&self, name: &str) -> MemoryInbox {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut registry) = self.registry.lock() {
            registry.insert(name.to_string(), tx);
        }
        rx
    }

    pub fn send(&self, from: &str, to: &str, kind: Kind, body: &str) -> Result<(), RaymondError> {
        let sender = {
            let registry = self
                .registry
                .lock()
                .map_err(|_| RaymondError::TransportSend { peer: to.to_string(), reason: "registry poisoned".to_string() })?;
            registry.get(to).cloned()
        };
        let Some(sender) = sender else {
            return Err(RaymondError::TransportSend { peer: to.to_string(), reason: "no such node".to_string() });
        };
        sender
            .send(Envelope { sender: from.to_string(), kind, body: body.to_string() })
            .map_err(|_| RaymondError::TransportSend { peer: to.to_string(), reason: "receiver dropped".to_string() })
    }
}

impl Default for MemoryFabric {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
