// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recovery: the restart/advise exchange that lets a node rebuild its
//! `holder`/`asked`/`request_q` after `kill` without a global coordinator.
//!
//! The one subtlety worth documenting: `finalize_recover` must not overwrite
//! `holder` if a `privilege` message already arrived during the recovery
//! window. `receive_privilege` (in the parent module) sets `holder` directly
//! regardless of `is_recovering` — only the `step` that normally follows it
//! is suppressed — so by the time every advise has been collected, `holder`
//! already reflects that arrival and `finalize_recover_locked` below leaves
//! it alone. This is only safe because a `privilege` message, once sent, is
//! never lost or retried by this transport; if it were, a node could finish
//! recovery believing it holds the token while the real privilege is still
//! in flight toward it. See SPEC_FULL.md open question 1.
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{Node, NodeState};
use crate::message::{AdviseTriple, Kind};
use crate::peer::Peer;

impl Node {
    /// A neighbor's handler for an incoming `restart` from the recovering
    /// node `sender`: reports this node's own edge to `sender` back to it.
    pub(super) async fn recovery_handle_restart(self: &Arc<Self>, sender: &str) {
        let triple = {
            let st = self.state.lock().await;
            AdviseTriple {
                holder_is_r: st.holder == Some(Peer::named(sender)),
                asked: st.asked,
                r_in_queue: st.request_q.contains(&Peer::named(sender)),
            }
        };
        debug!(node = %self.name, restarted = sender, triple = triple.encode(), "advising restarted neighbor");
        self.send_to(sender, Kind::Advise, &triple.encode()).await;
    }

    /// The recovering node's handler for a neighbor's `advise` reply.
    /// Buffers it, and once every neighbor has replied, reconstructs local
    /// state and resumes normal operation.
    pub(super) async fn recovery_handle_advise(self: &Arc<Self>, sender: &str, body: &str) {
        let triple = match AdviseTriple::parse(body) {
            Ok(t) => t,
            Err(e) => {
                warn!(node = %self.name, sender, err = %e, "malformed advise body");
                return;
            }
        };

        let should_finalize = {
            let mut st = self.state.lock().await;
            if !st.is_recovering {
                return;
            }
            st.advise_buf.insert(sender.to_string(), triple);
            debug_assert!(st.advise_buf.len() <= self.neighbors.len(), "more advise replies than neighbors");
            let complete = st.advise_buf.len() >= self.neighbors.len();
            if complete {
                finalize_recover_locked(&self.name, &mut st);
            }
            complete
        };

        if should_finalize {
            self.step().await;
        }
    }
}

/// Pure state reconstruction, run under the node's lock. Split out of
/// `recovery_handle_advise` so it never needs to re-acquire the lock it's
/// already holding.
fn finalize_recover_locked(name: &str, st: &mut NodeState) {
    if st.holder != Some(Peer::SelfRef) {
        let outward = st.advise_buf.iter().find(|(_, t)| !t.holder_is_r).map(|(n, _)| n.clone());
        st.holder = Some(match outward {
            Some(n) => Peer::named(n),
            None => Peer::SelfRef,
        });
    }

    st.asked = match &st.holder {
        Some(Peer::SelfRef) | None => false,
        Some(Peer::Named(n)) => st.advise_buf.get(n).map(|t| t.asked).unwrap_or(false),
    };

    for (neighbor, triple) in &st.advise_buf {
        if triple.holder_is_r && triple.asked {
            let peer = Peer::named(neighbor.clone());
            if !st.request_q.contains(&peer) {
                st.request_q.push(peer);
            }
        }
    }

    st.advise_buf.clear();
    st.is_recovering = false;
    info!(node = name, holder = ?st.holder, asked = st.asked, "recovery finalized");
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
