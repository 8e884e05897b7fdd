// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-node Raymond state machine. This is the core of the crate: a
//! node's request queue, `holder`/`asked`/`using` state, and the protocol
//! transitions that keep exactly one node holding the privilege at a time.
//!
//! Every event handler acquires `state` for its whole duration, including
//! the critical-section sleep in `try_assign_privilege` — that serialization
//! is intentional, not an oversight (see module docs in `crate::node::recovery`
//! for the one place this matters for correctness).

pub mod recovery;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::error::RaymondError;
use crate::fifo::Fifo;
use crate::message::{AdviseTriple, Envelope, Kind};
use crate::peer::Peer;
use crate::transport::Transport;

/// Timing knobs for the critical-section simulation and recovery.
#[derive(Debug, Clone, Copy)]
pub struct NodeTimings {
    pub cs_delay: Duration,
    pub grace_period: Duration,
}

impl Default for NodeTimings {
    fn default() -> Self {
        Self { cs_delay: Duration::from_millis(2500), grace_period: Duration::from_secs(5) }
    }
}

#[derive(Debug, Default)]
pub(crate) struct NodeState {
    pub holder: Option<Peer>,
    pub using: bool,
    pub asked: bool,
    pub request_q: Fifo<Peer>,
    pub is_recovering: bool,
    pub advise_buf: HashMap<String, AdviseTriple>,
    /// Lifetime count of critical-section entries, survives `kill`/recovery.
    pub cs_entries: u64,
}

/// A read-only view of a node's state for the visualizer. Never exposes the
/// lock, so the renderer cannot race the state machine.
#[derive(Debug, Clone)]
pub struct NodeSnapshot {
    pub name: String,
    pub holder: Option<Peer>,
    pub using: bool,
    pub asked: bool,
    pub is_recovering: bool,
    pub cs_entries: u64,
}

pub struct Node {
    pub name: String,
    pub neighbors: Vec<String>,
    transport: Transport,
    timings: NodeTimings,
    state: Mutex<NodeState>,
}

impl Node {
    /// Registers with the transport and spawns the node's single consumer
    /// task. Registration completes before this returns, so a caller that
    /// awaits every `spawn` before issuing CLI commands cannot race message
    /// delivery against subscription.
    pub async fn spawn(
        name: String,
        neighbors: Vec<String>,
        transport: Transport,
        timings: NodeTimings,
    ) -> Result<Arc<Node>, RaymondError> {
        let inbox = transport.register(&name).await?;
        let node = Arc::new(Node {
            name,
            neighbors,
            transport,
            timings,
            state: Mutex::new(NodeState::default()),
        });

        let consumer = Arc::clone(&node);
        tokio::spawn(async move {
            let mut inbox = inbox;
            while let Some(envelope) = inbox.recv().await {
                consumer.handle_envelope(envelope).await;
            }
            debug!(node = %consumer.name, "inbox closed, consumer task exiting");
        });

        Ok(node)
    }

    pub async fn snapshot(&self) -> NodeSnapshot {
        let st = self.state.lock().await;
        NodeSnapshot {
            name: self.name.clone(),
            holder: st.holder.clone(),
            using: st.using,
            asked: st.asked,
            is_recovering: st.is_recovering,
            cs_entries: st.cs_entries,
        }
    }

    async fn handle_envelope(self: &Arc<Self>, envelope: Envelope) {
        debug!(node = %self.name, sender = %envelope.sender, kind = %envelope.kind, "received message");
        match envelope.kind {
            Kind::Request => self.receive_request(&envelope.sender).await,
            Kind::Privilege => self.receive_privilege(&envelope.sender).await,
            Kind::Initialize => self.receive_initialize(&envelope.sender).await,
            Kind::Restart => self.recovery_handle_restart(&envelope.sender).await,
            Kind::Advise => self.recovery_handle_advise(&envelope.sender, &envelope.body).await,
        }
    }

    // -- Local API ------------------------------------------------------------

    /// Seeds the network: this node becomes the initial holder and
    /// propagates `initialize` to every neighbor.
    pub async fn initialize_network(self: &Arc<Self>) {
        {
            let mut st = self.state.lock().await;
            st.holder = Some(Peer::SelfRef);
        }
        info!(node = %self.name, "seeded network as initial holder");
        self.broadcast_initialize(None).await;
    }

    pub async fn ask_for_critical_section(self: &Arc<Self>) {
        {
            let mut st = self.state.lock().await;
            debug_assert!(!st.request_q.contains(&Peer::SelfRef), "duplicate self request");
            st.request_q.push(Peer::SelfRef);
        }
        self.step().await;
    }

    /// Drops all local state and enters recovery. See `recovery` for the
    /// restart/advise exchange that brings the node back to `Idle`.
    pub async fn kill(self: &Arc<Self>) {
        {
            let mut st = self.state.lock().await;
            st.holder = None;
            st.using = false;
            st.request_q = Fifo::new();
            st.asked = false;
            st.advise_buf.clear();
            st.is_recovering = true;
        }
        tracing::warn!(node = %self.name, "killed, entering recovery");
        tokio::time::sleep(self.timings.grace_period).await;
        for neighbor in &self.neighbors {
            self.send_to(neighbor, Kind::Restart, "").await;
        }
    }

    // -- Remote event handlers --------------------------------------------------

    async fn receive_request(self: &Arc<Self>, sender: &str) {
        {
            let mut st = self.state.lock().await;
            let peer = Peer::named(sender);
            debug_assert!(!st.request_q.contains(&peer), "duplicate request from {sender}");
            st.request_q.push(peer);
        }
        self.step().await;
    }

    async fn receive_privilege(self: &Arc<Self>, _sender: &str) {
        {
            let mut st = self.state.lock().await;
            st.holder = Some(Peer::SelfRef);
        }
        // `step` is a no-op while recovering; the holder assignment above
        // still lands, which is exactly what lets `finalize_recover` see
        // "a privilege arrived during recovery" by checking `holder` first.
        self.step().await;
    }

    async fn receive_initialize(self: &Arc<Self>, sender: &str) {
        {
            let mut st = self.state.lock().await;
            st.holder = Some(Peer::named(sender));
        }
        info!(node = %self.name, holder = sender, "initialized (reparented)");
        self.broadcast_initialize(Some(sender)).await;
    }

    async fn broadcast_initialize(self: &Arc<Self>, except: Option<&str>) {
        for neighbor in &self.neighbors {
            if Some(neighbor.as_str()) == except {
                continue;
            }
            self.send_to(neighbor, Kind::Initialize, "").await;
        }
    }

    // -- The two fundamental procedures ----------------------------------------

    /// Runs `assign_privilege` and `make_request` to a fixed point. A
    /// critical-section entry+exit is itself a new event per the original
    /// protocol (`exit_critical_section` re-runs both checks), so the loop
    /// only continues when that happened; every other path already ran both
    /// checks once per call.
    async fn step(self: &Arc<Self>) {
        loop {
            let mut st = self.state.lock().await;
            if st.is_recovering {
                return;
            }
            let entered_and_exited_cs = self.try_assign_privilege(&mut st).await;
            self.try_make_request(&mut st).await;
            if !entered_and_exited_cs {
                break;
            }
        }
    }

    /// Returns `true` iff this call entered and exited the critical section
    /// (the only case that warrants re-running `step`).
    async fn try_assign_privilege(&self, st: &mut NodeState) -> bool {
        if st.holder != Some(Peer::SelfRef) || st.using || st.request_q.empty() {
            return false;
        }
        let Some(new_holder) = st.request_q.get() else { return false };
        st.asked = false;

        if new_holder.is_self() {
            st.holder = Some(Peer::SelfRef);
            st.using = true;
            st.cs_entries += 1;
            info!(node = %self.name, "entering critical section");
            tokio::time::sleep(self.timings.cs_delay).await;
            st.using = false;
            info!(node = %self.name, "exiting critical section");
            true
        } else {
            let target = new_holder.name().unwrap_or_default().to_string();
            st.holder = Some(new_holder);
            self.send_to(&target, Kind::Privilege, "").await;
            false
        }
    }

    async fn try_make_request(&self, st: &mut NodeState) {
        if st.holder == Some(Peer::SelfRef) || st.request_q.empty() || st.asked {
            return;
        }
        let Some(Peer::Named(target)) = st.holder.clone() else { return };
        self.send_to(&target, Kind::Request, "").await;
        st.asked = true;
    }

    async fn send_to(&self, target: &str, kind: Kind, body: &str) {
        if let Err(e) = self.transport.send(&self.name, target, kind, body).await {
            error!(node = %self.name, peer = target, kind = %kind, err = %e, "transport send failed");
        }
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
