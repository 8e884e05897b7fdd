// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background renderer: polls every node's snapshot on an interval and
//! prints a directed text graph, one line per node, colored by role. The
//! palette matches the reference implementation this protocol was distilled
//! from (green = holds the token, blue = waiting on a request it already
//! sent, grey = idle), with a yellow addition for nodes mid-recovery.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::node::NodeSnapshot;
use crate::orchestrator::Orchestrator;

const GREEN: &str = "\x1b[32m";
const BLUE: &str = "\x1b[34m";
const YELLOW: &str = "\x1b[33m";
const GREY: &str = "\x1b[90m";
const RESET: &str = "\x1b[0m";

pub struct Visualizer;

impl Visualizer {
    /// Spawns the render loop, cancelled by `orchestrator`'s shutdown token.
    pub fn spawn(orchestrator: Arc<Orchestrator>, interval: Duration) {
        let shutdown = orchestrator.shutdown_token();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = shutdown.cancelled() => break,
                }
                render(&orchestrator).await;
            }
        });
    }
}

async fn render(orchestrator: &Arc<Orchestrator>) {
    let mut snapshots = Vec::new();
    for node in orchestrator.snapshot_targets() {
        snapshots.push(node.snapshot().await);
    }
    snapshots.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = String::from("-- network state --\n");
    for snap in &snapshots {
        out.push_str(&render_line(snap));
        out.push('\n');
    }
    print!("{out}");
}

fn render_line(snap: &NodeSnapshot) -> String {
    let (color, role) = color_and_role(snap);
    let holder_desc = match &snap.holder {
        Some(peer) if peer.is_self() => "self".to_string(),
        Some(peer) => peer.to_string(),
        None => "?".to_string(),
    };
    format!("{color}{name} -> {holder}{reset}  ({role})", color = color, name = snap.name, holder = holder_desc, reset = RESET, role = role)
}

fn color_and_role(snap: &NodeSnapshot) -> (&'static str, &'static str) {
    if snap.is_recovering {
        (YELLOW, "recovering")
    } else if snap.holder.as_ref().is_some_and(|p| p.is_self()) {
        (GREEN, "holder")
    } else if snap.asked {
        (BLUE, "asked")
    } else {
        (GREY, "idle")
    }
}

#[cfg(test)]
#[path = "visualizer_tests.rs"]
mod tests;
