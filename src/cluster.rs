/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Clusters: connected components of the node graph, with cached statistics.
//!
//! A [`Cluster`] owns only an id, its member node ids and a statistics cache.
//! Patterns live in the engine's node arena, so statistics are read through a
//! [`ClusterView`], which borrows both the cluster and the arena.
//!
//! Each statistic is memoised in a [`OnceCell`] the first time it is read and
//! dropped by [`Cluster::invalidate`], which the engine calls whenever
//! membership changes, whenever a member's pattern moves, and for every
//! cluster at the start of each input.
//!
//! # Invariants
//!
//! - A live cluster is never empty.
//! - Every live node is a member of exactly one live cluster.
//! - A cluster's members are exactly one connected component of the graph.

use core::cell::OnceCell;
use core::fmt;
use std::collections::BTreeMap;

use hashbrown::HashMap;

use crate::config::PrototypeStrategy;
use crate::node::{Node, NodeId};
use crate::vector;

// ─── ClusterId ──────────────────────────────────────────────────────────────

/// Stable cluster identifier. Monotonically increasing, never reused within a
/// session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ClusterId(pub u64);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

// ─── Statistics cache ───────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
struct StatsCache {
    mean: OnceCell<Vec<f64>>,
    weighted_mean: OnceCell<Vec<f64>>,
    prototype: OnceCell<Option<NodeId>>,
    average_distance: OnceCell<Option<f64>>,
    label: OnceCell<Option<String>>,
}

// ─── Cluster ────────────────────────────────────────────────────────────────

/// A connected component of the node graph, with identity.
#[derive(Clone, Debug)]
pub struct Cluster {
    id: ClusterId,
    members: Vec<NodeId>,
    cache: StatsCache,
}

impl Cluster {
    /// Create a cluster over `members`.
    pub(crate) fn new(id: ClusterId, members: Vec<NodeId>) -> Self {
        Self {
            id,
            members,
            cache: StatsCache::default(),
        }
    }

    /// Identifier.
    pub fn id(&self) -> ClusterId {
        self.id
    }

    /// Member node ids, in the order they joined.
    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    /// Number of member nodes.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// `true` if the cluster has no members. Never true for a live cluster.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// `true` if `node` is a member.
    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains(&node)
    }

    /// Drop every cached statistic.
    pub fn invalidate(&mut self) {
        self.cache = StatsCache::default();
    }

    /// Append members absorbed from another cluster.
    pub(crate) fn absorb(&mut self, nodes: &[NodeId]) {
        self.members.extend_from_slice(nodes);
        self.invalidate();
    }

    /// Keep only the members for which `keep` returns `true`.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(NodeId) -> bool) {
        self.members.retain(|&n| keep(n));
        self.invalidate();
    }

    /// Remove a single member. Returns `true` if it was present.
    pub(crate) fn remove_member(&mut self, node: NodeId) -> bool {
        let before = self.members.len();
        self.members.retain(|&n| n != node);
        let removed = self.members.len() != before;
        if removed {
            self.invalidate();
        }
        removed
    }
}

// ─── ClusterView ────────────────────────────────────────────────────────────

/// Read access to a cluster together with its members' node data.
///
/// Statistics are computed on first access and cached in the cluster until
/// the engine next invalidates it.
#[derive(Clone, Copy)]
pub struct ClusterView<'a> {
    cluster: &'a Cluster,
    nodes: &'a BTreeMap<NodeId, Node>,
    dim: usize,
    strategy: PrototypeStrategy,
}

impl<'a> ClusterView<'a> {
    pub(crate) fn new(
        cluster: &'a Cluster,
        nodes: &'a BTreeMap<NodeId, Node>,
        dim: usize,
        strategy: PrototypeStrategy,
    ) -> Self {
        Self {
            cluster,
            nodes,
            dim,
            strategy,
        }
    }

    /// Identifier.
    pub fn id(&self) -> ClusterId {
        self.cluster.id
    }

    /// The underlying cluster.
    pub fn cluster(&self) -> &'a Cluster {
        self.cluster
    }

    /// Member node ids.
    pub fn members(&self) -> &'a [NodeId] {
        &self.cluster.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.cluster.len()
    }

    /// `true` if the cluster has no members.
    pub fn is_empty(&self) -> bool {
        self.cluster.is_empty()
    }

    /// Member nodes, in membership order.
    pub fn nodes(&self) -> impl Iterator<Item = &'a Node> + 'a {
        let nodes = self.nodes;
        self.cluster.members.iter().filter_map(move |id| nodes.get(id))
    }

    fn patterns(&self) -> impl Iterator<Item = &'a [f64]> + 'a {
        self.nodes().map(Node::pattern)
    }

    /// Component-wise arithmetic mean of the member patterns.
    pub fn mean(&self) -> &'a [f64] {
        self.cluster
            .cache
            .mean
            .get_or_init(|| vector::mean(self.patterns(), self.dim).unwrap_or_default())
    }

    /// Mean of the member patterns weighted by signal count.
    pub fn weighted_mean(&self) -> &'a [f64] {
        self.cluster.cache.weighted_mean.get_or_init(|| {
            let weighted = self.nodes().map(|n| (n.pattern(), n.signal_count));
            vector::weighted_mean(weighted, self.dim).unwrap_or_default()
        })
    }

    /// Per-dimension minimum over the members.
    pub fn min(&self) -> Vec<f64> {
        vector::component_min(self.patterns(), self.dim).unwrap_or_default()
    }

    /// Per-dimension maximum over the members.
    pub fn max(&self) -> Vec<f64> {
        vector::component_max(self.patterns(), self.dim).unwrap_or_default()
    }

    /// Per-dimension population variance around [`Self::mean`].
    pub fn variance(&self) -> Vec<f64> {
        vector::variance(self.patterns(), self.mean()).unwrap_or_default()
    }

    /// The member selected by the engine's [`PrototypeStrategy`].
    ///
    /// Ties go to the earliest member.
    pub fn prototype_node(&self) -> Option<NodeId> {
        *self.cluster.cache.prototype.get_or_init(|| {
            let mut best: Option<&Node> = None;
            for n in self.nodes() {
                let better = match (best, self.strategy) {
                    (None, _) => true,
                    (Some(b), PrototypeStrategy::BySignalCount) => n.signal_count > b.signal_count,
                    (Some(b), PrototypeStrategy::ByError) => n.error < b.error,
                };
                if better {
                    best = Some(n);
                }
            }
            best.map(Node::id)
        })
    }

    /// Pattern of the prototype node.
    pub fn prototype(&self) -> Option<&'a [f64]> {
        let nodes = self.nodes;
        self.prototype_node()
            .and_then(|id| nodes.get(&id))
            .map(Node::pattern)
    }

    /// Mean distance over all pairs of distinct members. `None` for a
    /// singleton.
    pub fn average_distance(&self) -> Option<f64> {
        *self.cluster.cache.average_distance.get_or_init(|| {
            let patterns: Vec<&[f64]> = self.patterns().collect();
            vector::average_pairwise_distance(&patterns)
        })
    }

    /// Majority-vote label over the members.
    ///
    /// Unlabelled members vote for "no label". Ties go to the label seen
    /// first in membership order.
    pub fn label(&self) -> Option<&'a str> {
        self.cluster
            .cache
            .label
            .get_or_init(|| {
                let mut counts: HashMap<Option<&str>, usize> = HashMap::new();
                let mut order: Vec<Option<&str>> = Vec::new();
                for n in self.nodes() {
                    let key = n.label.as_deref();
                    let c = counts.entry(key).or_insert(0);
                    if *c == 0 {
                        order.push(key);
                    }
                    *c += 1;
                }
                let mut winner: Option<&str> = None;
                let mut best = 0usize;
                for key in order {
                    let c = counts.get(&key).copied().unwrap_or(0);
                    if c > best {
                        best = c;
                        winner = key;
                    }
                }
                winner.map(str::to_owned)
            })
            .as_deref()
    }
}

impl fmt::Debug for ClusterView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterView")
            .field("id", &self.cluster.id)
            .field("len", &self.cluster.len())
            .field("strategy", &self.strategy)
            .finish()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
