// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport capability exposed to the node state machine: `register` to
//! claim a per-node inbox, `send` to publish to a peer. The state machine
//! never sees which backend is in play; swap happens once, at construction.

pub mod memory;
pub mod nats;

use tokio::sync::broadcast;
use tracing::debug;

use crate::error::RaymondError;
use crate::message::{Envelope, Kind, TraceEvent};

const TRACE_CAPACITY: usize = 1024;

#[derive(Clone)]
enum Backend {
    Memory(memory::MemoryFabric),
    Nats(nats::NatsTransport),
}

/// A handle to the broker. Cheap to clone; every node holds one.
#[derive(Clone)]
pub struct Transport {
    backend: Backend,
    trace: broadcast::Sender<TraceEvent>,
}

/// A node's claimed inbox, backend-agnostic from the node's point of view.
pub enum Inbox {
    Memory(memory::MemoryInbox),
    Nats(nats::NatsInbox),
}

impl Transport {
    /// An in-memory fabric: per-node unbounded channels in a shared registry.
    /// Preserves per-pair FIFO by construction (one channel, one reader).
    pub fn memory() -> Self {
        Self { backend: Backend::Memory(memory::MemoryFabric::new()), trace: broadcast::channel(TRACE_CAPACITY).0 }
    }

    /// A NATS-backed adapter bound to subjects `<sender>.<receiver>.<kind>`.
    pub async fn nats(url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            backend: Backend::Nats(nats::NatsTransport::connect(url).await?),
            trace: broadcast::channel(TRACE_CAPACITY).0,
        })
    }

    /// Claim the inbox for `name`. Must be called once per node before any
    /// message addressed to it can be observed.
    pub async fn register(&self, name: &str) -> Result<Inbox, RaymondError> {
        match &self.backend {
            Backend::Memory(m) => Ok(Inbox::Memory(m.register(name))),
            Backend::Nats(n) => Ok(Inbox::Nats(n.register(name).await?)),
        }
    }

    pub async fn send(&self, from: &str, to: &str, kind: Kind, body: &str) -> Result<(), RaymondError> {
        let _ = self.trace.send(TraceEvent { from: from.to_string(), to: to.to_string(), kind });
        match &self.backend {
            Backend::Memory(m) => m.send(from, to, kind, body),
            Backend::Nats(n) => n.send(from, to, kind, body).await,
        }
    }

    /// Subscribe to every message handed to `send`, independent of whether
    /// delivery succeeded. Used by tests and by `spawn_debug_log`.
    pub fn trace(&self) -> broadcast::Receiver<TraceEvent> {
        self.trace.subscribe()
    }

    /// Spawns the optional append-only debug log: one `tracing` event per
    /// message passed to `send`, emitted as it happens rather than batched.
    /// Forwarding those events to a file instead of stdout is a matter of
    /// the process's `tracing_subscriber` writer, not of this task.
    pub fn spawn_debug_log(&self) {
        let mut rx = self.trace();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => debug!(from = %event.from, to = %event.to, kind = %event.kind, "traced message"),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "debug log lagged behind trace stream");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }
}

impl Inbox {
    pub async fn recv(&mut self) -> Option<Envelope> {
        match self {
            Inbox::Memory(rx) => rx.recv().await,
            Inbox::Nats(sub) => sub.recv().await,
        }
    }
}
