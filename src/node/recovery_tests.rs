// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::fifo::Fifo;
use std::collections::HashMap;

fn base_state() -> NodeState {
    NodeState {
        holder: Some(Peer::named("r")),
        using: false,
        asked: false,
        request_q: Fifo::new(),
        is_recovering: true,
        advise_buf: HashMap::new(),
    }
}

#[test]
fn finds_outward_neighbor_when_one_reports_a_different_holder() {
    let mut st = base_state();
    st.advise_buf.insert("x".into(), AdviseTriple { holder_is_r: true, asked: false, r_in_queue: false });
    st.advise_buf.insert("y".into(), AdviseTriple { holder_is_r: false, asked: true, r_in_queue: false });
    finalize_recover_locked("r", &mut st);
    assert_eq!(st.holder, Some(Peer::named("y")));
    assert!(!st.is_recovering);
}

#[test]
fn becomes_self_when_every_neighbor_still_points_here() {
    let mut st = base_state();
    st.advise_buf.insert("x".into(), AdviseTriple { holder_is_r: true, asked: true, r_in_queue: false });
    st.advise_buf.insert("y".into(), AdviseTriple { holder_is_r: true, asked: false, r_in_queue: false });
    finalize_recover_locked("r", &mut st);
    assert_eq!(st.holder, Some(Peer::SelfRef));
    assert!(!st.asked);
}

#[test]
fn privilege_arriving_during_recovery_is_not_overwritten() {
    let mut st = base_state();
    // receive_privilege already ran and set holder to SelfRef directly.
    st.holder = Some(Peer::SelfRef);
    st.advise_buf.insert("x".into(), AdviseTriple { holder_is_r: true, asked: true, r_in_queue: false });
    finalize_recover_locked("r", &mut st);
    assert_eq!(st.holder, Some(Peer::SelfRef));
    assert!(!st.asked);
}

#[test]
fn reconstructs_request_queue_from_waiting_subtrees() {
    let mut st = base_state();
    st.advise_buf.insert("x".into(), AdviseTriple { holder_is_r: false, asked: false, r_in_queue: false });
    st.advise_buf.insert("y".into(), AdviseTriple { holder_is_r: true, asked: true, r_in_queue: true });
    st.advise_buf.insert("z".into(), AdviseTriple { holder_is_r: true, asked: false, r_in_queue: true });
    finalize_recover_locked("r", &mut st);
    assert!(st.request_q.contains(&Peer::named("y")));
    assert!(!st.request_q.contains(&Peer::named("z")));
    assert_eq!(st.request_q.len(), 1);
}

#[test]
fn does_not_duplicate_an_already_queued_neighbor() {
    let mut st = base_state();
    st.request_q.push(Peer::named("y"));
    st.advise_buf.insert("y".into(), AdviseTriple { holder_is_r: true, asked: true, r_in_queue: true });
    finalize_recover_locked("r", &mut st);
    assert_eq!(st.request_q.len(), 1);
}
