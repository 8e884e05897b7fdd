// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios against the in-memory transport fabric: small fixed
//! topologies driven through the public `Node` API, asserting on the
//! resulting `holder` chains and critical-section entry counts rather than
//! on internal state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use raymond::node::{Node, NodeTimings};
use raymond::peer::Peer;
use raymond::transport::Transport;

fn fast_timings() -> NodeTimings {
    NodeTimings { cs_delay: Duration::from_millis(10), grace_period: Duration::from_millis(30) }
}

async fn spawn_topology(adjacency: Vec<(String, Vec<String>)>) -> HashMap<String, Arc<Node>> {
    let transport = Transport::memory();
    let mut nodes = HashMap::new();
    for (name, neighbors) in adjacency {
        let node = Node::spawn(name.clone(), neighbors, transport.clone(), fast_timings())
            .await
            .expect("spawn node");
        nodes.insert(name, node);
    }
    nodes
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(200)).await;
}

async fn holder_count(nodes: &HashMap<String, Arc<Node>>) -> usize {
    let mut count = 0;
    for node in nodes.values() {
        if node.snapshot().await.holder == Some(Peer::SelfRef) {
            count += 1;
        }
    }
    count
}

fn path_topology() -> Vec<(String, Vec<String>)> {
    vec![
        ("0".into(), vec!["1".into()]),
        ("1".into(), vec!["0".into(), "2".into()]),
        ("2".into(), vec!["1".into(), "3".into()]),
        ("3".into(), vec!["2".into()]),
    ]
}

/// S1: seed at 0, ask from 3. The privilege should walk 0 -> 1 -> 2 -> 3 and
/// every intermediate node's `holder` should end up pointing back down the
/// path toward 3.
#[tokio::test]
async fn s1_single_ask_walks_the_path_to_the_requester() {
    let nodes = spawn_topology(path_topology()).await;

    nodes["0"].initialize_network().await;
    settle().await;
    nodes["3"].ask_for_critical_section().await;
    settle().await;

    assert_eq!(nodes["0"].snapshot().await.holder, Some(Peer::named("1")));
    assert_eq!(nodes["1"].snapshot().await.holder, Some(Peer::named("2")));
    assert_eq!(nodes["2"].snapshot().await.holder, Some(Peer::named("3")));
    assert_eq!(nodes["3"].snapshot().await.holder, Some(Peer::SelfRef));
    assert!(!nodes["3"].snapshot().await.using);
}

/// S2: two concurrent asks on a path complete without any overlapping
/// critical-section entry, and the final chain is well-formed (exactly one
/// node holds `Self`).
#[tokio::test]
async fn s2_concurrent_asks_never_overlap_and_leave_a_single_holder() {
    let nodes = spawn_topology(path_topology()).await;

    nodes["0"].initialize_network().await;
    settle().await;

    let (n2, n3) = (Arc::clone(&nodes["2"]), Arc::clone(&nodes["3"]));
    let (a, b) = tokio::join!(
        async move { n2.ask_for_critical_section().await },
        async move { n3.ask_for_critical_section().await },
    );
    let _ = (a, b);
    settle().await;

    assert_eq!(holder_count(&nodes).await, 1);
    for node in nodes.values() {
        assert!(!node.snapshot().await.using);
    }
}

/// S3: seed at 1 on the 4-node path, ask from 3, then ask from 0 while the
/// privilege is still working its way toward 3. Raymond's per-node FIFO
/// queueing guarantees both requesters eventually enter exactly once no
/// matter how the two asks interleave in flight.
#[tokio::test]
async fn s3_concurrent_asks_from_opposite_ends_each_enter_exactly_once() {
    let nodes = spawn_topology(path_topology()).await;

    nodes["1"].initialize_network().await;
    settle().await;

    nodes["3"].ask_for_critical_section().await;
    tokio::time::sleep(Duration::from_millis(3)).await;
    nodes["0"].ask_for_critical_section().await;
    settle().await;
    settle().await;

    assert_eq!(nodes["0"].snapshot().await.cs_entries, 1);
    assert_eq!(nodes["3"].snapshot().await.cs_entries, 1);
    assert_eq!(holder_count(&nodes).await, 1);
    for node in nodes.values() {
        assert!(!node.snapshot().await.using);
    }
}

/// S4: kill a node mid-path; its neighbors must advise it back to a
/// consistent state and the requester downstream of it must eventually
/// enter the critical section.
#[tokio::test]
async fn s4_kill_mid_path_recovers_and_requester_still_enters() {
    let nodes = spawn_topology(path_topology()).await;

    nodes["0"].initialize_network().await;
    settle().await;
    nodes["3"].ask_for_critical_section().await;
    tokio::time::sleep(Duration::from_millis(5)).await;

    nodes["2"].kill().await;
    settle().await;
    settle().await;

    assert!(!nodes["2"].snapshot().await.is_recovering);
    assert_eq!(nodes["3"].snapshot().await.holder, Some(Peer::SelfRef));
}

/// S5: star topology, ten interleaved asks from the leaves. Every ask
/// eventually enters the critical section exactly once and the final state
/// has a single holder.
#[tokio::test]
async fn s5_star_topology_handles_ten_interleaved_leaf_requests() {
    let leaves: Vec<String> = (1..=5).map(|i| i.to_string()).collect();
    let mut adjacency: Vec<(String, Vec<String>)> = vec![("0".to_string(), leaves.clone())];
    for leaf in &leaves {
        adjacency.push((leaf.clone(), vec!["0".to_string()]));
    }
    let nodes = spawn_topology(adjacency).await;

    nodes["0"].initialize_network().await;
    settle().await;

    for i in 0..10 {
        let leaf = &leaves[i % leaves.len()];
        nodes[leaf].ask_for_critical_section().await;
        tokio::time::sleep(Duration::from_millis(3)).await;
    }
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(holder_count(&nodes).await, 1);
    for node in nodes.values() {
        assert!(!node.snapshot().await.using);
    }
}

/// S6: a 3-node path where the middle node is killed after forwarding a
/// request but before the privilege returns. Recovery must not deadlock the
/// requester at the far end.
#[tokio::test]
async fn s6_kill_during_in_flight_request_does_not_deadlock_requester() {
    let adjacency: Vec<(String, Vec<String>)> = vec![
        ("0".into(), vec!["1".into()]),
        ("1".into(), vec!["0".into(), "2".into()]),
        ("2".into(), vec!["1".into()]),
    ];
    let nodes = spawn_topology(adjacency).await;

    nodes["0"].initialize_network().await;
    settle().await;
    nodes["2"].ask_for_critical_section().await;
    tokio::time::sleep(Duration::from_millis(3)).await;

    nodes["1"].kill().await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(!nodes["1"].snapshot().await.is_recovering);
    assert_eq!(nodes["2"].snapshot().await.holder, Some(Peer::SelfRef));
}
