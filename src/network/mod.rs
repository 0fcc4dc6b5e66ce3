/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! The topology engine.
//!
//! [`Network`] owns the node, edge and cluster arenas and runs the per-input
//! protocol. It is driven by one caller issuing one [`Network::input`] at a
//! time; nothing inside suspends, retries or times out.
//!
//! # Per-input protocol
//!
//! 1. Reject a pattern of the wrong length without touching any state.
//! 2. Optionally perturb it with Gaussian noise.
//! 3. Start a tick: clear the audit lists, drop every cluster's cached
//!    statistics, count the input.
//! 4. **Bootstrap** (fewer than two nodes): store the pattern as a new node.
//! 5. **Steady**: find the nearest node `s1` and second-nearest `s2`, refresh
//!    both thresholds, then either
//!    - insert a new node when the input lies outside either threshold
//!      (novelty), optionally wiring it to `s1`, or
//!    - match: age `s1`'s edges, refresh or create the `s1 - s2` edge,
//!      accumulate error, pull `s1` and its neighbours toward the input, and
//!      drop edges older than `age_dead`.
//! 6. Every `lambda` inputs, run the maintenance pass (see `maintenance`).
//!
//! # Invariants
//!
//! - Clusters partition the node set; each is one connected component.
//! - With dynamic thresholds every node's threshold is at least
//!   `minimum_threshold`.
//! - Ids are never reused until [`Network::clear`].
//!
//! `Network` is `Send` but not `Sync`: cluster statistics are cached through
//! interior mutability. Share one across threads only behind a lock held for
//! the whole `input` call.

mod audit;
mod maintenance;
mod summary;
mod topology;

pub use audit::{JoinEvent, SplitEvent};
pub use summary::TopologySummary;

use std::collections::BTreeMap;

use hashbrown::HashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::{debug, warn};

use crate::cluster::{Cluster, ClusterId, ClusterView};
use crate::config::NetworkConfig;
use crate::edge::{Edge, EdgeId};
use crate::error::{Result, TopologyError};
use crate::node::{Node, NodeId};
use crate::vector;
use audit::TickAudit;

// ─── IdCounters ─────────────────────────────────────────────────────────────

/// The next id each arena will hand out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdCounters {
    /// Next node id.
    pub node: u64,
    /// Next edge id.
    pub edge: u64,
    /// Next cluster id.
    pub cluster: u64,
}

impl Default for IdCounters {
    fn default() -> Self {
        Self {
            node: 1,
            edge: 1,
            cluster: 1,
        }
    }
}

// ─── Network ────────────────────────────────────────────────────────────────

/// An online, self-organising graph of prototype nodes.
#[derive(Clone, Debug)]
pub struct Network {
    pub(crate) dim: usize,
    pub(crate) config: NetworkConfig,
    pub(crate) rng: StdRng,
    pub(crate) nodes: BTreeMap<NodeId, Node>,
    pub(crate) edges: BTreeMap<EdgeId, Edge>,
    pub(crate) clusters: BTreeMap<ClusterId, Cluster>,
    /// node → (neighbour → connecting edge)
    pub(crate) adjacency: HashMap<NodeId, BTreeMap<NodeId, EdgeId>>,
    pub(crate) membership: HashMap<NodeId, ClusterId>,
    pub(crate) next_node_id: u64,
    pub(crate) next_edge_id: u64,
    pub(crate) next_cluster_id: u64,
    pub(crate) inputs_since_cleanup: u64,
    pub(crate) audit: TickAudit,
}

impl Network {
    /// Create an empty engine for `dim`-dimensional input with the default
    /// configuration and an entropy-seeded random source.
    pub fn new(dim: usize) -> Self {
        Self::from_parts(dim, NetworkConfig::default(), StdRng::from_entropy())
    }

    /// Create an empty engine with a reproducible random source.
    pub fn with_seed(dim: usize, seed: u64) -> Self {
        Self::from_parts(dim, NetworkConfig::default(), StdRng::seed_from_u64(seed))
    }

    /// Create an empty engine with an explicit configuration.
    pub fn with_config(dim: usize, config: NetworkConfig) -> Self {
        Self::from_parts(dim, config, StdRng::from_entropy())
    }

    fn from_parts(dim: usize, config: NetworkConfig, rng: StdRng) -> Self {
        let ids = IdCounters::default();
        Self {
            dim,
            config,
            rng,
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            clusters: BTreeMap::new(),
            adjacency: HashMap::new(),
            membership: HashMap::new(),
            next_node_id: ids.node,
            next_edge_id: ids.edge,
            next_cluster_id: ids.cluster,
            inputs_since_cleanup: 0,
            audit: TickAudit::default(),
        }
    }

    /// Replace the random source with one seeded from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    // ─── Configuration ──────────────────────────────────────────────────────

    /// Input dimensionality, fixed at construction.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Current parameters.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Mutable access to the parameters. Changes apply from the next input.
    pub fn config_mut(&mut self) -> &mut NetworkConfig {
        self.invalidate_all();
        &mut self.config
    }

    /// Replace the parameters wholesale.
    pub fn set_config(&mut self, config: NetworkConfig) {
        self.invalidate_all();
        self.config = config;
    }

    // ─── Input ──────────────────────────────────────────────────────────────

    /// Feed one input pattern.
    ///
    /// # Errors
    ///
    /// [`TopologyError::DimensionMismatch`] if `pattern.len() != self.dim()`.
    /// The input is discarded and no state changes.
    pub fn input(&mut self, pattern: &[f64], label: Option<&str>) -> Result<()> {
        if pattern.len() != self.dim {
            warn!(
                expected = self.dim,
                got = pattern.len(),
                "rejected input with wrong dimensionality"
            );
            return Err(TopologyError::DimensionMismatch {
                expected: self.dim,
                got: pattern.len(),
            });
        }

        let mut pattern = pattern.to_vec();
        self.perturb(&mut pattern);
        self.begin_tick();
        self.inputs_since_cleanup += 1;
        let label = label.map(str::to_owned);

        if self.nodes.len() < 2 {
            let id = self.add_node(pattern, label);
            self.audit.activated = Some(id);
            return Ok(());
        }

        let Some(((s1, d1), (s2, d2))) = self.two_nearest(&pattern) else {
            return Ok(());
        };
        self.update_threshold(s1);
        self.update_threshold(s2);
        let t1 = self.nodes.get(&s1).map_or(0.0, |n| n.threshold);
        let t2 = self.nodes.get(&s2).map_or(0.0, |n| n.threshold);

        if d1 > t1 || d2 > t2 {
            self.insert_novel(pattern, label, s1, d1, t1);
        } else {
            self.absorb_match(&pattern, s1, d1, s2);
        }

        if self.config.lambda > 0 && self.inputs_since_cleanup >= self.config.lambda {
            self.inputs_since_cleanup = 0;
            self.run_maintenance();
        }
        Ok(())
    }

    fn perturb(&mut self, pattern: &mut [f64]) {
        if self.config.noise_level <= 0.0 {
            return;
        }
        let Ok(noise) = Normal::new(0.0, self.config.noise_level) else {
            return;
        };
        for x in pattern.iter_mut() {
            *x += noise.sample(&mut self.rng);
        }
    }

    fn begin_tick(&mut self) {
        self.audit.reset();
        self.invalidate_all();
    }

    /// Nearest and second-nearest nodes with their distances. Ties go to the
    /// lower id.
    fn two_nearest(&self, pattern: &[f64]) -> Option<((NodeId, f64), (NodeId, f64))> {
        let mut first: Option<(NodeId, f64)> = None;
        let mut second: Option<(NodeId, f64)> = None;
        for n in self.nodes.values() {
            let d = n.distance_to(pattern);
            if first.map_or(true, |(_, fd)| d < fd) {
                second = first;
                first = Some((n.id(), d));
            } else if second.map_or(true, |(_, sd)| d < sd) {
                second = Some((n.id(), d));
            }
        }
        Some((first?, second?))
    }

    /// Novelty: store the input as a new node.
    ///
    /// With `connect_new_nodes`, the node is wired to `s1` when it lies inside
    /// `s1`'s threshold, sits farther from `s1`'s cluster mean than `s1`
    /// does, and is at least the cluster's average pairwise distance away
    /// from `s1`. The test reads `s1`'s cluster before the new node exists.
    fn insert_novel(
        &mut self,
        pattern: Vec<f64>,
        label: Option<String>,
        s1: NodeId,
        d1: f64,
        t1: f64,
    ) {
        let connect =
            self.config.connect_new_nodes && d1 <= t1 && self.extends_cluster_of(s1, &pattern, d1);
        let id = self.add_node(pattern, label);
        if connect {
            self.add_edge(id, s1);
            debug!(node = %id, to = %s1, "connected new node");
        }
        self.audit.activated = Some(id);
    }

    fn extends_cluster_of(&self, s1: NodeId, pattern: &[f64], d1: f64) -> bool {
        let (Some(view), Some(node)) = (
            self.cluster_of(s1).and_then(|c| self.cluster(c)),
            self.nodes.get(&s1),
        ) else {
            return false;
        };
        let mean = view.mean();
        let winner_spread = vector::euclidean_distance(mean, node.pattern());
        let input_spread = vector::euclidean_distance(mean, pattern);
        if winner_spread > input_spread {
            return false;
        }
        match view.average_distance() {
            Some(avg) => d1 >= avg,
            None => true,
        }
    }

    /// Match: `s1` wins the input.
    fn absorb_match(&mut self, pattern: &[f64], s1: NodeId, d1: f64, s2: NodeId) {
        let incident: Vec<EdgeId> = self
            .adjacency
            .get(&s1)
            .map(|m| m.values().copied().collect())
            .unwrap_or_default();
        for e in incident {
            if let Some(edge) = self.edges.get_mut(&e) {
                edge.age += 1;
            }
        }

        let link = match self.edge_between(s1, s2) {
            Some(e) => Some(e),
            None => self.add_edge(s1, s2),
        };
        if let Some(edge) = link.and_then(|e| self.edges.get_mut(&e)) {
            edge.age = 0;
        }

        let signals = match self.nodes.get_mut(&s1) {
            Some(winner) => {
                winner.error += d1;
                winner.signal_count += 1;
                let signals = winner.signal_count as f64;
                winner.adapt(pattern, 1.0 / signals);
                signals
            }
            None => return,
        };
        let neighbours: Vec<NodeId> = self.neighbours(s1).collect();
        for n in neighbours {
            if let Some(node) = self.nodes.get_mut(&n) {
                node.adapt(pattern, 0.01 / signals);
            }
        }
        self.invalidate_cluster_of(s1);

        let age_dead = self.config.age_dead;
        let dead: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|e| e.age > age_dead)
            .map(Edge::id)
            .collect();
        for e in dead {
            self.remove_edge(e);
            debug!(edge = %e, age_dead, "removed aged-out edge");
        }

        self.audit.activated = Some(s1);
    }

    // ─── Cache control ──────────────────────────────────────────────────────

    fn invalidate_all(&mut self) {
        for c in self.clusters.values_mut() {
            c.invalidate();
        }
    }

    pub(crate) fn invalidate_cluster_of(&mut self, node: NodeId) {
        if let Some(c) = self
            .membership
            .get(&node)
            .and_then(|cid| self.clusters.get_mut(cid))
        {
            c.invalidate();
        }
    }

    // ─── Lifecycle ──────────────────────────────────────────────────────────

    /// Drop every node, edge and cluster and reset all counters. The
    /// configuration and random source are kept.
    pub fn clear(&mut self) {
        let ids = IdCounters::default();
        self.nodes.clear();
        self.edges.clear();
        self.clusters.clear();
        self.adjacency.clear();
        self.membership.clear();
        self.next_node_id = ids.node;
        self.next_edge_id = ids.edge;
        self.next_cluster_id = ids.cluster;
        self.inputs_since_cleanup = 0;
        self.audit.reset();
    }

    /// Add `count` unconnected nodes with patterns drawn uniformly from
    /// `[0, 1)` in every dimension. Each lands in its own cluster.
    pub fn create_random_nodes(&mut self, count: usize) -> Vec<NodeId> {
        let mut created = Vec::with_capacity(count);
        for _ in 0..count {
            let pattern: Vec<f64> = (0..self.dim).map(|_| self.rng.gen::<f64>()).collect();
            created.push(self.add_node(pattern, None));
        }
        created
    }

    // ─── Read accessors ─────────────────────────────────────────────────────

    /// All nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    /// All edges in ascending id order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values()
    }

    /// All clusters in ascending id order.
    pub fn clusters(&self) -> impl Iterator<Item = ClusterView<'_>> + '_ {
        let strategy = self.config.prototype_strategy;
        self.clusters
            .values()
            .map(move |c| ClusterView::new(c, &self.nodes, self.dim, strategy))
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Look up an edge.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Look up a cluster.
    pub fn cluster(&self, id: ClusterId) -> Option<ClusterView<'_>> {
        self.clusters
            .get(&id)
            .map(|c| ClusterView::new(c, &self.nodes, self.dim, self.config.prototype_strategy))
    }

    /// The cluster containing `node`.
    pub fn cluster_of(&self, node: NodeId) -> Option<ClusterId> {
        self.membership.get(&node).copied()
    }

    /// Direct neighbours of `node`, in ascending id order.
    pub fn neighbours(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency
            .get(&node)
            .into_iter()
            .flat_map(|m| m.keys().copied())
    }

    /// Number of direct neighbours of `node`.
    pub fn degree(&self, node: NodeId) -> usize {
        self.adjacency.get(&node).map_or(0, BTreeMap::len)
    }

    /// The edge connecting `a` and `b`, if any.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.adjacency.get(&a)?.get(&b).copied()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of clusters.
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// `true` if the engine holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Inputs counted since the last maintenance pass.
    pub fn inputs_since_cleanup(&self) -> u64 {
        self.inputs_since_cleanup
    }

    /// The ids the arenas will hand out next.
    pub fn next_ids(&self) -> IdCounters {
        IdCounters {
            node: self.next_node_id,
            edge: self.next_edge_id,
            cluster: self.next_cluster_id,
        }
    }

    // ─── Tick audit ─────────────────────────────────────────────────────────

    /// The node touched by the most recent input.
    pub fn activated_node(&self) -> Option<NodeId> {
        self.audit.activated
    }

    /// The cluster currently holding the node touched by the most recent
    /// input. `None` before the first input, after [`Self::clear`], or when
    /// maintenance removed that node.
    pub fn activated_cluster(&self) -> Option<ClusterId> {
        self.audit.activated.and_then(|n| self.cluster_of(n))
    }

    /// Splits during the most recent input, in order.
    pub fn split_clusters(&self) -> &[SplitEvent] {
        &self.audit.splits
    }

    /// Joins during the most recent input, in order.
    pub fn joined_clusters(&self) -> &[JoinEvent] {
        &self.audit.joins
    }

    /// Clusters that ceased to exist during the most recent input.
    pub fn removed_clusters(&self) -> &[ClusterId] {
        &self.audit.removed
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Helpers ──────────────────────────────────────────────────────────────

    fn quiet(dim: usize) -> Network {
        let config = NetworkConfig {
            lambda: 0,
            ..NetworkConfig::default()
        };
        let mut net = Network::with_config(dim, config);
        net.reseed(5);
        net
    }

    fn ids(net: &Network) -> Vec<NodeId> {
        net.nodes().map(Node::id).collect()
    }

    // ── Bootstrap ────────────────────────────────────────────────────────────

    #[test]
    fn test_bootstrap_stores_first_two_inputs() {
        let mut net = quiet(2);
        net.input(&[0.1, 0.2], Some("a")).unwrap();
        assert_eq!(net.node_count(), 1);
        assert_eq!(net.activated_cluster(), Some(ClusterId(1)));
        net.input(&[0.1, 0.2], None).unwrap();
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.edge_count(), 0);
        assert_eq!(net.cluster_count(), 2);
        let first = net.node(NodeId(1)).unwrap();
        assert_eq!(first.label.as_deref(), Some("a"));
        assert_eq!(first.signal_count, 1);
    }

    #[test]
    fn test_wrong_dimension_rejected_without_mutation() {
        let mut net = quiet(2);
        net.input(&[0.0, 0.0], None).unwrap();
        let before = (net.next_ids(), net.inputs_since_cleanup(), net.node_count());
        let err = net.input(&[1.0, 2.0, 3.0], None).unwrap_err();
        assert!(matches!(
            err,
            TopologyError::DimensionMismatch {
                expected: 2,
                got: 3
            }
        ));
        let after = (net.next_ids(), net.inputs_since_cleanup(), net.node_count());
        assert_eq!(before, after);
    }

    // ── Steady ───────────────────────────────────────────────────────────────

    #[test]
    fn test_match_adapts_winner_and_neighbours() {
        let mut net = quiet(1);
        net.input(&[0.0], None).unwrap();
        net.input(&[1.0], None).unwrap();
        net.input(&[0.25], None).unwrap();

        let (n1, n2) = (NodeId(1), NodeId(2));
        let w = net.node(n1).unwrap();
        assert_eq!(w.signal_count, 2);
        assert!((w.error - 0.25).abs() < 1e-12);
        assert!((w.pattern()[0] - 0.125).abs() < 1e-12);
        let nb = net.node(n2).unwrap();
        assert!((nb.pattern()[0] - 0.99625).abs() < 1e-12, "p={}", nb.pattern()[0]);

        let e = net.edge_between(n1, n2).unwrap();
        assert_eq!(net.edge(e).unwrap().age, 0);
        assert_eq!(net.cluster_count(), 1);
        assert_eq!(net.activated_node(), Some(n1));
        assert_eq!(net.joined_clusters().len(), 1);
    }

    #[test]
    fn test_novel_input_creates_node_without_moving_others() {
        let mut net = quiet(1);
        for x in [0.0, 1.0, 0.25] {
            net.input(&[x], None).unwrap();
        }
        let before: Vec<Vec<f64>> = net.nodes().map(|n| n.pattern().to_vec()).collect();

        net.input(&[5.0], Some("far")).unwrap();
        assert_eq!(net.node_count(), 3);
        let after: Vec<Vec<f64>> = net.nodes().take(2).map(|n| n.pattern().to_vec()).collect();
        assert_eq!(before, after);
        let fresh = net.node(NodeId(3)).unwrap();
        assert_eq!(fresh.pattern(), &[5.0]);
        assert_eq!(fresh.label.as_deref(), Some("far"));
        assert_eq!(net.activated_node(), Some(NodeId(3)));
        assert_eq!(net.cluster_count(), 2);
    }

    #[test]
    fn test_rematch_resets_edge_age() {
        let mut net = quiet(1);
        for x in [0.0, 1.0, 0.0] {
            net.input(&[x], None).unwrap();
        }
        let e = net.edge_between(NodeId(1), NodeId(2)).unwrap();
        net.input(&[0.0], None).unwrap();
        assert_eq!(net.edge(e).unwrap().age, 0);
    }

    // ── New-node connection ──────────────────────────────────────────────────

    fn fixed_connecting() -> Network {
        let mut net = quiet(1);
        let c = net.config_mut();
        c.connect_new_nodes = true;
        c.use_fixed_threshold = true;
        c.fixed_threshold = 1.5;
        net
    }

    #[test]
    fn test_new_node_connected_when_extending_cluster() {
        let mut net = fixed_connecting();
        for x in [0.0, 1.0, 0.0] {
            net.input(&[x], None).unwrap();
        }
        assert_eq!(net.cluster_count(), 1);
        // inside s1's radius, outside s2's, beyond the cluster's spread
        net.input(&[-1.2], None).unwrap();
        assert_eq!(net.node_count(), 3);
        assert!(net.edge_between(NodeId(3), NodeId(1)).is_some());
        assert_eq!(net.cluster_count(), 1);
    }

    #[test]
    fn test_new_node_not_connected_within_cluster_spread() {
        let mut net = fixed_connecting();
        for x in [0.0, 1.0, 0.0] {
            net.input(&[x], None).unwrap();
        }
        net.input(&[-0.8], None).unwrap();
        assert_eq!(net.node_count(), 3);
        assert_eq!(net.degree(NodeId(3)), 0);
        assert_eq!(net.cluster_count(), 2);
    }

    #[test]
    fn test_new_node_connects_to_singleton_winner() {
        let mut net = fixed_connecting();
        net.input(&[0.0], None).unwrap();
        net.input(&[10.0], None).unwrap();
        net.input(&[-1.0], None).unwrap();
        assert!(net.edge_between(NodeId(3), NodeId(1)).is_some());
        assert_eq!(net.cluster_count(), 2);
    }

    // ── Maintenance scheduling ───────────────────────────────────────────────

    #[test]
    fn test_maintenance_resets_counter_every_lambda() {
        let mut net = quiet(1);
        net.config_mut().lambda = 2;
        net.input(&[0.0], None).unwrap();
        net.input(&[1.0], None).unwrap();
        assert_eq!(net.inputs_since_cleanup(), 2);
        net.input(&[0.5], None).unwrap();
        assert_eq!(net.inputs_since_cleanup(), 0);
    }

    #[test]
    fn test_lambda_zero_disables_maintenance() {
        let mut net = quiet(1);
        for i in 0..10 {
            net.input(&[i as f64 * 0.01], None).unwrap();
        }
        assert_eq!(net.inputs_since_cleanup(), 10);
    }

    // ── Noise, reset, seeding ────────────────────────────────────────────────

    #[test]
    fn test_noise_is_reproducible_per_seed() {
        let run = || {
            let mut net = Network::with_seed(2, 99);
            net.config_mut().noise_level = 0.05;
            net.input(&[0.5, 0.5], None).unwrap();
            net.node(NodeId(1)).unwrap().pattern().to_vec()
        };
        let a = run();
        assert_eq!(a, run());
        assert_ne!(a, vec![0.5, 0.5]);
    }

    #[test]
    fn test_clear_resets_counters() {
        let mut net = quiet(1);
        for x in [0.0, 1.0, 0.0] {
            net.input(&[x], None).unwrap();
        }
        net.clear();
        assert!(net.is_empty());
        assert_eq!(net.edge_count(), 0);
        assert_eq!(net.cluster_count(), 0);
        assert_eq!(net.next_ids(), IdCounters::default());
        assert_eq!(net.inputs_since_cleanup(), 0);
        assert_eq!(net.activated_cluster(), None);
        net.input(&[0.3], None).unwrap();
        assert_eq!(ids(&net), vec![NodeId(1)]);
    }

    #[test]
    fn test_create_random_nodes_in_unit_cube() {
        let mut net = Network::with_seed(3, 1);
        let created = net.create_random_nodes(5);
        assert_eq!(created.len(), 5);
        assert_eq!(net.cluster_count(), 5);
        for n in net.nodes() {
            assert_eq!(n.signal_count, 1);
            assert!(n.pattern().iter().all(|x| (0.0..1.0).contains(x)));
        }
    }

    #[test]
    fn test_threshold_floor_applied_to_new_nodes() {
        let mut net = quiet(1);
        net.config_mut().minimum_threshold = 0.3;
        net.input(&[0.0], None).unwrap();
        net.input(&[5.0], None).unwrap();
        net.input(&[10.0], None).unwrap();
        assert!(net.nodes().all(|n| n.threshold >= 0.3));
    }

    #[test]
    fn test_cluster_mean_follows_adaptation() {
        let mut net = quiet(1);
        for x in [0.0, 1.0, 0.25] {
            net.input(&[x], None).unwrap();
        }
        let cid = net.cluster_of(NodeId(1)).unwrap();
        let m = net.cluster(cid).unwrap().mean()[0];
        let expect = (net.node(NodeId(1)).unwrap().pattern()[0]
            + net.node(NodeId(2)).unwrap().pattern()[0])
            / 2.0;
        assert!((m - expect).abs() < 1e-12);
    }
}
