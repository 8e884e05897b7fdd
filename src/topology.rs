// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Random growing-network tree generator: node `k` (for `k >= 1`) attaches
//! to a uniformly-chosen predecessor in `0..k`, giving every node a fixed
//! neighbor set with no cycles and exactly `n - 1` edges.

use std::collections::HashMap;

use rand::Rng;

/// Builds a random tree over nodes named `"0" .. "n-1"` and returns each
/// node's neighbor names. `n == 0` yields an empty map; `n == 1` yields a
/// single node with no neighbors.
pub fn random_tree(n: usize) -> HashMap<String, Vec<String>> {
    let mut neighbors: HashMap<String, Vec<String>> = (0..n).map(|i| (i.to_string(), Vec::new())).collect();
    if n < 2 {
        return neighbors;
    }

    let mut rng = rand::rng();
    for child in 1..n {
        let parent = rng.random_range(0..child);
        let (child_name, parent_name) = (child.to_string(), parent.to_string());
        if let Some(entry) = neighbors.get_mut(&child_name) {
            entry.push(parent_name.clone());
        }
        if let Some(entry) = neighbors.get_mut(&parent_name) {
            entry.push(child_name);
        }
    }
    neighbors
}

#[cfg(test)]
#[path = "topology_tests.rs"]
mod tests;
