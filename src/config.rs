// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use crate::node::NodeTimings;

/// Configuration for a single `raymond` run: how many nodes to simulate,
/// where to reach NATS (if anywhere), and the timing knobs governing the
/// critical-section delay, recovery grace period, visualizer cadence, and
/// the random-ask/random-kill background loop bounds.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "raymond", version, about = "Raymond's tree-based distributed mutual exclusion, simulated over a message broker.")]
pub struct Config {
    /// Number of nodes to simulate.
    pub node_count: usize,

    /// NATS server URL. If unset, an in-memory transport is used instead.
    #[arg(long, env = "RAYMOND_NATS_URL")]
    pub nats_url: Option<String>,

    /// Simulated critical-section hold time, in milliseconds.
    #[arg(long, default_value_t = 2500, env = "RAYMOND_CS_DELAY_MS")]
    pub cs_delay_ms: u64,

    /// Grace period a killed node waits before broadcasting `restart`, in milliseconds.
    #[arg(long, default_value_t = 5000, env = "RAYMOND_GRACE_PERIOD_MS")]
    pub grace_period_ms: u64,

    /// Visualizer render interval, in milliseconds.
    #[arg(long, default_value_t = 1000, env = "RAYMOND_VISUALIZER_INTERVAL_MS")]
    pub visualizer_interval_ms: u64,

    /// Minimum delay between random `ask` loop iterations, in milliseconds.
    #[arg(long, default_value_t = 3000, env = "RAYMOND_RANDOM_ASK_MIN_MS")]
    pub random_ask_min_ms: u64,

    /// Maximum delay between random `ask` loop iterations, in milliseconds.
    #[arg(long, default_value_t = 8000, env = "RAYMOND_RANDOM_ASK_MAX_MS")]
    pub random_ask_max_ms: u64,

    /// Minimum delay between random `kill` loop iterations, in milliseconds.
    #[arg(long, default_value_t = 6000, env = "RAYMOND_RANDOM_KILL_MIN_MS")]
    pub random_kill_min_ms: u64,

    /// Maximum delay between random `kill` loop iterations, in milliseconds.
    #[arg(long, default_value_t = 16000, env = "RAYMOND_RANDOM_KILL_MAX_MS")]
    pub random_kill_max_ms: u64,
}

impl Config {
    pub fn timings(&self) -> NodeTimings {
        NodeTimings {
            cs_delay: Duration::from_millis(self.cs_delay_ms),
            grace_period: Duration::from_millis(self.grace_period_ms),
        }
    }

    pub fn visualizer_interval(&self) -> Duration {
        Duration::from_millis(self.visualizer_interval_ms)
    }

    pub fn random_ask_bounds(&self) -> (Duration, Duration) {
        (Duration::from_millis(self.random_ask_min_ms), Duration::from_millis(self.random_ask_max_ms))
    }

    pub fn random_kill_bounds(&self) -> (Duration, Duration) {
        (Duration::from_millis(self.random_kill_min_ms), Duration::from_millis(self.random_kill_max_ms))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
