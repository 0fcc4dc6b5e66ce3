/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Graph mutation primitives with immediate partition reconciliation.
//!
//! Every structural change to the node/edge graph goes through this file, so
//! the cluster partition is reconciled in exactly one place:
//!
//! - [`Network::add_node`] creates a singleton cluster.
//! - [`Network::add_edge`] merges the endpoint clusters when they differ.
//! - [`Network::remove_edge`] splits the cluster when the endpoints become
//!   disconnected.
//! - [`Network::remove_node`] removes incident edges one by one, then drops the
//!   now-singleton cluster.
//!
//! # Invariants
//!
//! - After any primitive returns, each cluster is exactly one connected
//!   component and every node is in exactly one cluster.
//! - Ids are taken from the engine counters and never reused.

use std::collections::BTreeMap;

use hashbrown::HashSet;
use tracing::debug;

use super::audit::{JoinEvent, SplitEvent};
use super::Network;
use crate::cluster::{Cluster, ClusterId};
use crate::edge::{Edge, EdgeId};
use crate::node::{Node, NodeId};

impl Network {
    // ─── Nodes ──────────────────────────────────────────────────────────────

    /// Create a node in its own singleton cluster.
    pub(crate) fn add_node(&mut self, pattern: Vec<f64>, label: Option<String>) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        let node = Node::new(id, pattern, self.config.initial_threshold(), label);
        self.nodes.insert(id, node);
        self.adjacency.insert(id, BTreeMap::new());
        self.new_cluster(vec![id]);
        id
    }

    /// Remove a node and every edge touching it.
    ///
    /// Edges are removed in ascending id order, each one reconciling the
    /// partition, so the node ends up alone in its cluster before the cluster
    /// is dropped.
    pub(crate) fn remove_node(&mut self, id: NodeId) -> bool {
        if !self.nodes.contains_key(&id) {
            return false;
        }
        let mut incident: Vec<EdgeId> = self
            .adjacency
            .get(&id)
            .map(|m| m.values().copied().collect())
            .unwrap_or_default();
        incident.sort_unstable();
        for e in incident {
            self.remove_edge(e);
        }

        self.nodes.remove(&id);
        self.adjacency.remove(&id);
        if let Some(cid) = self.membership.remove(&id) {
            let now_empty = match self.clusters.get_mut(&cid) {
                Some(c) => {
                    c.remove_member(id);
                    c.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.drop_cluster(cid);
            }
        }
        true
    }

    // ─── Edges ──────────────────────────────────────────────────────────────

    /// Connect two distinct nodes, merging their clusters if they differ.
    ///
    /// Returns the existing edge if the pair is already connected. The
    /// larger cluster keeps its identity; on equal size the cluster of `b`
    /// survives.
    pub(crate) fn add_edge(&mut self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        if a == b || !self.nodes.contains_key(&a) || !self.nodes.contains_key(&b) {
            return None;
        }
        if let Some(existing) = self.edge_between(a, b) {
            return Some(existing);
        }

        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;
        self.edges.insert(id, Edge::new(id, a, b));
        self.adjacency.entry(a).or_default().insert(b, id);
        self.adjacency.entry(b).or_default().insert(a, id);

        let (Some(&ca), Some(&cb)) = (self.membership.get(&a), self.membership.get(&b)) else {
            return Some(id);
        };
        if ca != cb {
            let len_a = self.clusters.get(&ca).map_or(0, Cluster::len);
            let len_b = self.clusters.get(&cb).map_or(0, Cluster::len);
            let (kept, absorbed) = if len_a > len_b { (ca, cb) } else { (cb, ca) };
            self.merge_clusters(kept, absorbed);
        }
        Some(id)
    }

    /// Remove an edge, splitting its cluster if the endpoints become
    /// disconnected.
    ///
    /// The larger piece keeps the cluster identity; on equal size the piece
    /// containing the second endpoint keeps it. The other piece gets a fresh
    /// cluster id.
    pub(crate) fn remove_edge(&mut self, id: EdgeId) -> bool {
        let Some(edge) = self.edges.remove(&id) else {
            return false;
        };
        let (a, b) = edge.endpoints();
        if let Some(m) = self.adjacency.get_mut(&a) {
            m.remove(&b);
        }
        if let Some(m) = self.adjacency.get_mut(&b) {
            m.remove(&a);
        }

        let reach_a = self.reachable_from(a);
        if reach_a.contains(&b) {
            return true;
        }
        let reach_b = self.reachable_from(b);

        let Some(&old) = self.membership.get(&a) else {
            return true;
        };
        let moved = if reach_a.len() > reach_b.len() {
            reach_b
        } else {
            reach_a
        };
        if let Some(c) = self.clusters.get_mut(&old) {
            c.retain(|n| !moved.contains(&n));
        }
        let mut members: Vec<NodeId> = moved.into_iter().collect();
        members.sort_unstable();
        let created = self.new_cluster(members);
        debug!(kept = %old, created = %created, edge = %id, "split cluster");
        self.audit.splits.push(SplitEvent { kept: old, created });
        true
    }

    // ─── Clusters ───────────────────────────────────────────────────────────

    fn new_cluster(&mut self, members: Vec<NodeId>) -> ClusterId {
        let id = ClusterId(self.next_cluster_id);
        self.next_cluster_id += 1;
        for &n in &members {
            self.membership.insert(n, id);
        }
        self.clusters.insert(id, Cluster::new(id, members));
        id
    }

    fn merge_clusters(&mut self, kept: ClusterId, absorbed: ClusterId) {
        let Some(gone) = self.clusters.remove(&absorbed) else {
            return;
        };
        for &n in gone.members() {
            self.membership.insert(n, kept);
        }
        if let Some(c) = self.clusters.get_mut(&kept) {
            c.absorb(gone.members());
        }
        self.audit.joins.push(JoinEvent { kept, absorbed });
        self.audit.removed.push(absorbed);
    }

    fn drop_cluster(&mut self, id: ClusterId) {
        if self.clusters.remove(&id).is_some() {
            self.audit.removed.push(id);
        }
    }

    /// Every node reachable from `start` over the current edges, `start`
    /// included.
    pub(crate) fn reachable_from(&self, start: NodeId) -> HashSet<NodeId> {
        let mut seen = HashSet::new();
        seen.insert(start);
        let mut stack = vec![start];
        while let Some(n) = stack.pop() {
            if let Some(adj) = self.adjacency.get(&n) {
                for &m in adj.keys() {
                    if seen.insert(m) {
                        stack.push(m);
                    }
                }
            }
        }
        seen
    }

    // ─── Thresholds ─────────────────────────────────────────────────────────

    /// Recompute a node's similarity threshold.
    ///
    /// Fixed mode uses `fixed_threshold × √dim`. Dynamic mode uses the
    /// distance to the farthest neighbour, or to the nearest other node when
    /// isolated, floored at `minimum_threshold`.
    pub(crate) fn update_threshold(&mut self, id: NodeId) {
        let threshold = if self.config.use_fixed_threshold {
            self.config.fixed_radius(self.dim)
        } else {
            let Some(node) = self.nodes.get(&id) else {
                return;
            };
            let neighbours = self.adjacency.get(&id);
            let raw = match neighbours {
                Some(adj) if !adj.is_empty() => adj
                    .keys()
                    .filter_map(|n| self.nodes.get(n))
                    .map(|n| node.distance_to(n.pattern()))
                    .fold(0.0, f64::max),
                _ => self
                    .nodes
                    .values()
                    .filter(|n| n.id() != id)
                    .map(|n| node.distance_to(n.pattern()))
                    .fold(f64::INFINITY, f64::min),
            };
            // a lone node has no distance to measure
            let raw = if raw.is_finite() { raw } else { 0.0 };
            raw.max(self.config.minimum_threshold)
        };
        if let Some(node) = self.nodes.get_mut(&id) {
            node.threshold = threshold;
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
