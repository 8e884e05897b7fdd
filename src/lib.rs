// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raymond's tree-based distributed mutual exclusion algorithm, simulated
//! over a topic-routed message broker. See `SPEC_FULL.md` for the full
//! component design.

pub mod cli;
pub mod config;
pub mod error;
pub mod fifo;
pub mod message;
pub mod node;
pub mod orchestrator;
pub mod peer;
pub mod topology;
pub mod transport;
pub mod visualizer;

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::orchestrator::Orchestrator;
use crate::transport::Transport;
use crate::visualizer::Visualizer;

/// Builds the transport, spawns the node tree, starts the visualizer, and
/// runs the interactive shell until `exit` or shutdown.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let transport = match &config.nats_url {
        Some(url) => Transport::nats(url).await?,
        None => Transport::memory(),
    };
    info!(nodes = config.node_count, nats = config.nats_url.is_some(), "starting raymond");
    transport.spawn_debug_log();

    let orchestrator = Arc::new(Orchestrator::build(config.node_count, transport, config.timings()).await?);
    Visualizer::spawn(Arc::clone(&orchestrator), config.visualizer_interval());

    cli::run_shell(orchestrator, config.random_ask_bounds(), config.random_kill_bounds()).await;
    Ok(())
}
