/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Periodic maintenance, run every `lambda` inputs.
//!
//! Strategies run in a fixed order, each only when enabled in
//! [`crate::config::NetworkConfig`]:
//!
//! 1. longest-edge removal
//! 2. minimum-signal node removal
//! 3. error-reduction insertion
//! 4. small-cluster removal (three passes)
//! 5. cluster joining
//!
//! Ties are broken by ascending id. A strategy with nothing to act on is a
//! no-op; none of them can fail.

use tracing::debug;

use super::Network;
use crate::edge::EdgeId;
use crate::node::NodeId;
use crate::vector;

impl Network {
    /// Run every enabled maintenance strategy once.
    pub(crate) fn run_maintenance(&mut self) {
        debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            clusters = self.clusters.len(),
            "maintenance pass"
        );
        if self.config.edge_max_removal {
            self.remove_longest_edge();
        }
        if self.config.node_num_signals_min_removal {
            self.remove_weakest_node();
        }
        if self.config.reduce_error_insertion {
            self.insert_to_reduce_error();
        }
        if self.config.small_cluster_removal {
            self.remove_small_clusters();
        }
        if self.config.cluster_joining {
            self.join_clusters();
        }
    }

    // ─── 1. Longest edge ────────────────────────────────────────────────────

    /// Remove the single longest edge. Zero-length edges are never chosen.
    pub(crate) fn remove_longest_edge(&mut self) -> Option<EdgeId> {
        let mut best: Option<(EdgeId, f64)> = None;
        for edge in self.edges.values() {
            let (Some(a), Some(b)) = (self.nodes.get(&edge.node_a()), self.nodes.get(&edge.node_b()))
            else {
                continue;
            };
            let length = a.distance_to(b.pattern());
            if length > best.map_or(0.0, |(_, l)| l) {
                best = Some((edge.id(), length));
            }
        }
        let (id, length) = best?;
        self.remove_edge(id);
        debug!(edge = %id, length, "removed longest edge");
        Some(id)
    }

    // ─── 2. Minimum signal ──────────────────────────────────────────────────

    /// Remove the single node with the lowest signal count.
    pub(crate) fn remove_weakest_node(&mut self) -> Option<NodeId> {
        let weakest = self
            .nodes
            .values()
            .fold(None::<(NodeId, u64)>, |best, n| match best {
                Some((_, s)) if n.signal_count >= s => best,
                _ => Some((n.id(), n.signal_count)),
            });
        let (id, signals) = weakest?;
        self.remove_node(id);
        debug!(node = %id, signals, "removed minimum-signal node");
        Some(id)
    }

    // ─── 3. Error insertion ─────────────────────────────────────────────────

    /// Insert a node halfway between the highest-error node `q` and its
    /// highest-error neighbour `f`, rewiring `q - f` into `q - r - f`.
    ///
    /// Skipped when no node has positive error or `q` has no neighbour with
    /// positive error.
    pub(crate) fn insert_to_reduce_error(&mut self) -> Option<NodeId> {
        let q = self.max_error_among(self.nodes.keys().copied())?;
        let neighbours: Vec<NodeId> = self.neighbours(q).collect();
        let f = self.max_error_among(neighbours)?;

        let (pattern, label) = {
            let (nq, nf) = (self.nodes.get(&q)?, self.nodes.get(&f)?);
            (vector::midpoint(nq.pattern(), nf.pattern()), nq.label.clone())
        };
        let r = self.add_node(pattern, label);
        self.add_edge(q, r);
        self.add_edge(r, f);
        if let Some(e) = self.edge_between(q, f) {
            self.remove_edge(e);
        }

        let (q_error, q_signals) = match self.nodes.get_mut(&q) {
            Some(nq) => {
                nq.error *= 0.5;
                (nq.error, nq.signal_count)
            }
            None => return None,
        };
        if let Some(nf) = self.nodes.get_mut(&f) {
            nf.error *= 0.5;
        }
        if let Some(nr) = self.nodes.get_mut(&r) {
            nr.error = q_error;
            nr.signal_count = q_signals;
        }
        self.invalidate_cluster_of(q);
        debug!(node = %r, between_a = %q, between_b = %f, "inserted error-reduction node");
        Some(r)
    }

    fn max_error_among(&self, candidates: impl IntoIterator<Item = NodeId>) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for id in candidates {
            let Some(n) = self.nodes.get(&id) else {
                continue;
            };
            if n.error > best.map_or(0.0, |(_, e)| e) {
                best = Some((id, n.error));
            }
        }
        best.map(|(id, _)| id)
    }

    // ─── 4. Small clusters ──────────────────────────────────────────────────

    /// Remove weakly supported nodes in three passes: degree-2 nodes below
    /// `c2 × mean signals`, then degree-1 nodes below `c1 × mean signals`,
    /// then every isolated node. Each pass sees the graph left by the
    /// previous one; the mean is taken once, before the first pass.
    ///
    /// Returns the number of nodes removed.
    pub(crate) fn remove_small_clusters(&mut self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        let total: u64 = self.nodes.values().map(|n| n.signal_count).sum();
        let mean_signals = total as f64 / self.nodes.len() as f64;

        let c2_limit = self.config.c2_param * mean_signals;
        let c1_limit = self.config.c1_param * mean_signals;
        let passes: [(usize, Option<f64>, &str); 3] = [
            (2, Some(c2_limit), "removed two-neighbour node"),
            (1, Some(c1_limit), "removed one-neighbour node"),
            (0, None, "removed isolated node"),
        ];

        let mut removed = 0;
        for (degree, limit, message) in passes {
            let doomed: Vec<NodeId> = self
                .nodes
                .values()
                .filter(|n| self.degree(n.id()) == degree)
                .filter(|n| limit.map_or(true, |l| (n.signal_count as f64) < l))
                .map(|n| n.id())
                .collect();
            for id in doomed {
                self.remove_node(id);
                debug!(node = %id, degree, "{}", message);
                removed += 1;
            }
        }
        removed
    }

    // ─── 5. Cluster joining ─────────────────────────────────────────────────

    /// Repeatedly connect the closest pair of clusters while they pass the
    /// join test, up to `joining_iterations_max` attempts. Stops at the first
    /// failed test.
    ///
    /// Returns the number of joins performed.
    pub(crate) fn join_clusters(&mut self) -> usize {
        let mut joins = 0;
        let mut iterations = 0;
        while self.clusters.len() > 1 && iterations < self.config.joining_iterations_max {
            iterations += 1;
            let Some((a, b, distance)) = self.closest_cluster_pair() else {
                break;
            };
            if !self.passes_join_test(a, b, distance) {
                break;
            }
            let (ca, cb) = (self.cluster_of(a), self.cluster_of(b));
            self.add_edge(a, b);
            debug!(
                cluster_a = ?ca.map(|c| c.0),
                cluster_b = ?cb.map(|c| c.0),
                distance,
                "joined clusters"
            );
            joins += 1;
        }
        joins
    }

    /// The closest node pair lying in two different clusters, with the first
    /// node taken from the lower-id cluster.
    fn closest_cluster_pair(&self) -> Option<(NodeId, NodeId, f64)> {
        let clusters: Vec<_> = self.clusters.values().collect();
        let mut best: Option<(NodeId, NodeId, f64)> = None;
        for (i, ca) in clusters.iter().enumerate() {
            for cb in &clusters[i + 1..] {
                for na in ca.members().iter().filter_map(|id| self.nodes.get(id)) {
                    for nb in cb.members().iter().filter_map(|id| self.nodes.get(id)) {
                        let d = na.distance_to(nb.pattern());
                        if best.map_or(true, |(_, _, bd)| d < bd) {
                            best = Some((na.id(), nb.id(), d));
                        }
                    }
                }
            }
        }
        best
    }

    /// Absolute mode: `distance < join_tolerance_absolute × √dim`.
    /// Relative mode: `distance` below `join_tolerance ×` the average
    /// pairwise distance of both clusters. A singleton has no average and
    /// never passes the relative test.
    fn passes_join_test(&self, a: NodeId, b: NodeId, distance: f64) -> bool {
        if self.config.use_absolute_join_tolerance {
            return distance < self.config.absolute_join_radius(self.dim);
        }
        let tolerance = self.config.join_tolerance;
        let spread = |node: NodeId| {
            self.cluster_of(node)
                .and_then(|c| self.cluster(c))
                .and_then(|view| view.average_distance())
        };
        match (spread(a), spread(b)) {
            (Some(da), Some(db)) => distance < da * tolerance && distance < db * tolerance,
            _ => false,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
