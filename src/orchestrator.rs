// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawns nodes, wires the tree, and dispatches CLI commands onto node
//! handles without letting a single slow node block the shell. Also owns
//! the optional background random-ask / random-kill loops.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::seq::IndexedRandom;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::node::{Node, NodeTimings};
use crate::topology;
use crate::transport::Transport;

pub struct Orchestrator {
    nodes: HashMap<String, Arc<Node>>,
    names: Vec<String>,
    shutdown: CancellationToken,
}

impl Orchestrator {
    /// Builds a random tree over `n` nodes and spawns one `Node` task per
    /// name, awaiting every registration before returning.
    pub async fn build(n: usize, transport: Transport, timings: NodeTimings) -> anyhow::Result<Self> {
        let adjacency = topology::random_tree(n);
        let mut nodes = HashMap::with_capacity(n);
        let mut names = Vec::with_capacity(n);
        for i in 0..n {
            let name = i.to_string();
            let neighbors = adjacency.get(&name).cloned().unwrap_or_default();
            let node = Node::spawn(name.clone(), neighbors, transport.clone(), timings).await?;
            nodes.insert(name.clone(), node);
            names.push(name);
        }
        Ok(Self { nodes, names, shutdown: CancellationToken::new() })
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn node_names(&self) -> &[String] {
        &self.names
    }

    pub fn snapshot_targets(&self) -> Vec<Arc<Node>> {
        self.nodes.values().cloned().collect()
    }

    fn random_name(&self) -> Option<String> {
        self.names.choose(&mut rand::rng()).cloned()
    }

    /// Invokes `initialize_network` on `name` from a short-lived task, or
    /// warns and does nothing if `name` is unknown.
    pub async fn init(&self, name: &str) {
        match self.nodes.get(name) {
            Some(node) => {
                let node = Arc::clone(node);
                tokio::spawn(async move { node.initialize_network().await });
            }
            None => warn!(node = name, "init: unknown node"),
        }
    }

    pub async fn ask(&self, name: &str) {
        match self.nodes.get(name) {
            Some(node) => {
                let node = Arc::clone(node);
                tokio::spawn(async move { node.ask_for_critical_section().await });
            }
            None => warn!(node = name, "ask: unknown node"),
        }
    }

    pub async fn kill(&self, name: &str) {
        match self.nodes.get(name) {
            Some(node) => {
                let node = Arc::clone(node);
                tokio::spawn(async move { node.kill().await });
            }
            None => warn!(node = name, "kill: unknown node"),
        }
    }

    /// Starts a background loop that asks a uniformly-chosen node every
    /// `[min, max)` seconds, cancelled when the shutdown token fires.
    pub fn spawn_random_ask_loop(self: &Arc<Self>, min: Duration, max: Duration) {
        let orchestrator = Arc::clone(self);
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(random_duration(min, max)) => {}
                    _ = shutdown.cancelled() => break,
                }
                if let Some(name) = orchestrator.random_name() {
                    orchestrator.ask(&name).await;
                }
            }
        });
    }

    /// Starts a background loop that kills a uniformly-chosen node every
    /// `[min, max)` seconds, cancelled when the shutdown token fires.
    pub fn spawn_random_kill_loop(self: &Arc<Self>, min: Duration, max: Duration) {
        let orchestrator = Arc::clone(self);
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(random_duration(min, max)) => {}
                    _ = shutdown.cancelled() => break,
                }
                if let Some(name) = orchestrator.random_name() {
                    orchestrator.kill(&name).await;
                }
            }
        });
    }
}

fn random_duration(min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let millis = rand::Rng::random_range(&mut rand::rng(), min.as_millis() as u64..max.as_millis() as u64);
    Duration::from_millis(millis)
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
