/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Versioned snapshot of a [`Network`] for persistence and transport.
//!
//! # Document layout (JSON)
//!
//! ```text
//! {
//!   "version": 1,
//!   "input_dim": 2,
//!   "parameters": { ...every NetworkConfig field... },
//!   "nodes":    [ { "id", "pattern", "threshold", "error", "signal_count", "label" } ],
//!   "edges":    [ { "id", "age", "node_a", "node_b" } ],
//!   "clusters": [ { "id", "members" } ],
//!   "counters": { "next_node_id", "next_edge_id", "next_cluster_id", "inputs_since_cleanup" }
//! }
//! ```
//!
//! Two ways to apply a snapshot:
//!
//! - [`Network::restore`] / [`Network::load`] replace the engine state,
//!   parameters included.
//! - [`Network::merge`] / [`Network::insert_from`] add the snapshot's graph
//!   next to the live one under fresh ids. Parameters and counters of the
//!   snapshot are ignored.
//!
//! Every snapshot is validated in full before the engine is touched, so a
//! rejected document leaves the engine exactly as it was.
//!
//! This module requires the `serde` feature.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use hashbrown::{HashMap, HashSet};
use tracing::info;

use crate::cluster::{Cluster, ClusterId};
use crate::config::NetworkConfig;
use crate::edge::{Edge, EdgeId};
use crate::error::{Result, TopologyError};
use crate::network::Network;
use crate::node::{Node, NodeId};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u16 = 1;

// ─── Document ───────────────────────────────────────────────────────────────

/// A serializable image of a [`Network`].
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct NetworkSnapshot {
    /// Format version. Always [`SNAPSHOT_VERSION`] for new snapshots.
    pub version: u16,
    /// Dimensionality of every pattern in the document.
    pub input_dim: usize,
    /// Engine parameters at snapshot time.
    pub parameters: NetworkConfig,
    /// Nodes in ascending id order.
    pub nodes: Vec<NodeRecord>,
    /// Edges in ascending id order.
    pub edges: Vec<EdgeRecord>,
    /// Clusters in ascending id order.
    pub clusters: Vec<ClusterRecord>,
    /// Id counters and maintenance schedule.
    pub counters: CountersRecord,
}

/// Serializable [`Node`].
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct NodeRecord {
    /// Node id.
    pub id: NodeId,
    /// Prototype pattern.
    pub pattern: Vec<f64>,
    /// Similarity threshold.
    pub threshold: f64,
    /// Accumulated error.
    pub error: f64,
    /// Signal count.
    pub signal_count: u64,
    /// Optional evaluation label.
    #[serde(default)]
    pub label: Option<String>,
}

impl From<&Node> for NodeRecord {
    fn from(n: &Node) -> Self {
        Self {
            id: n.id(),
            pattern: n.pattern().to_vec(),
            threshold: n.threshold,
            error: n.error,
            signal_count: n.signal_count,
            label: n.label.clone(),
        }
    }
}

impl NodeRecord {
    fn to_node(&self, id: NodeId) -> Node {
        let mut n = Node::new(id, self.pattern.clone(), self.threshold, self.label.clone());
        n.error = self.error;
        n.signal_count = self.signal_count;
        n
    }
}

/// Serializable [`Edge`].
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct EdgeRecord {
    /// Edge id.
    pub id: EdgeId,
    /// Age.
    pub age: u64,
    /// First endpoint.
    pub node_a: NodeId,
    /// Second endpoint.
    pub node_b: NodeId,
}

impl From<&Edge> for EdgeRecord {
    fn from(e: &Edge) -> Self {
        Self {
            id: e.id(),
            age: e.age,
            node_a: e.node_a(),
            node_b: e.node_b(),
        }
    }
}

/// Serializable cluster membership.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct ClusterRecord {
    /// Cluster id.
    pub id: ClusterId,
    /// Member node ids.
    pub members: Vec<NodeId>,
}

impl From<&Cluster> for ClusterRecord {
    fn from(c: &Cluster) -> Self {
        Self {
            id: c.id(),
            members: c.members().to_vec(),
        }
    }
}

/// Serializable engine counters.
#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountersRecord {
    /// Next node id.
    pub next_node_id: u64,
    /// Next edge id.
    pub next_edge_id: u64,
    /// Next cluster id.
    pub next_cluster_id: u64,
    /// Inputs since the last maintenance pass.
    #[serde(default)]
    pub inputs_since_cleanup: u64,
}

/// Old → new id tables produced by [`Network::merge`].
#[derive(Clone, Debug, Default)]
pub struct IdRemap {
    /// Node ids.
    pub nodes: HashMap<NodeId, NodeId>,
    /// Edge ids.
    pub edges: HashMap<EdgeId, EdgeId>,
    /// Cluster ids.
    pub clusters: HashMap<ClusterId, ClusterId>,
}

impl NetworkSnapshot {
    /// Capture the full state of `net`.
    pub fn from_network(net: &Network) -> Self {
        let next = net.next_ids();
        Self {
            version: SNAPSHOT_VERSION,
            input_dim: net.dim(),
            parameters: net.config().clone(),
            nodes: net.nodes().map(NodeRecord::from).collect(),
            edges: net.edges().map(EdgeRecord::from).collect(),
            clusters: net.clusters().map(|v| ClusterRecord::from(v.cluster())).collect(),
            counters: CountersRecord {
                next_node_id: next.node,
                next_edge_id: next.edge,
                next_cluster_id: next.cluster,
                inputs_since_cleanup: net.inputs_since_cleanup(),
            },
        }
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON. The result is not validated until applied.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check that this snapshot can be applied to an engine of
    /// dimensionality `dim`.
    ///
    /// # Errors
    ///
    /// - [`TopologyError::SnapshotVersion`] for an unknown format version.
    /// - [`TopologyError::SnapshotDimension`] for a different dimensionality.
    /// - [`TopologyError::MalformedSnapshot`] for any internal inconsistency:
    ///   wrong pattern length, duplicate id, dangling or self-looping edge,
    ///   duplicate node pair, clusters that do not partition the nodes into
    ///   connected components, or counters that would reuse an id.
    pub fn validate(&self, dim: usize) -> Result<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(TopologyError::SnapshotVersion {
                expected: SNAPSHOT_VERSION,
                found: self.version,
            });
        }
        if self.input_dim != dim {
            return Err(TopologyError::SnapshotDimension {
                expected: dim,
                found: self.input_dim,
            });
        }

        let mut node_ids = HashSet::new();
        for n in &self.nodes {
            if n.pattern.len() != dim {
                return Err(malformed(format!(
                    "node {} has {} components, expected {}",
                    n.id,
                    n.pattern.len(),
                    dim
                )));
            }
            if !node_ids.insert(n.id) {
                return Err(malformed(format!("duplicate node id {}", n.id)));
            }
        }

        let mut edge_ids = HashSet::new();
        let mut pairs = HashSet::new();
        let mut adjacency: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for e in &self.edges {
            if !edge_ids.insert(e.id) {
                return Err(malformed(format!("duplicate edge id {}", e.id)));
            }
            for end in [e.node_a, e.node_b] {
                if !node_ids.contains(&end) {
                    return Err(malformed(format!("edge {} references missing node {}", e.id, end)));
                }
            }
            if e.node_a == e.node_b {
                return Err(malformed(format!("edge {} is a self-loop", e.id)));
            }
            let pair = (e.node_a.min(e.node_b), e.node_a.max(e.node_b));
            if !pairs.insert(pair) {
                return Err(malformed(format!(
                    "edge {} duplicates the pair {}-{}",
                    e.id, pair.0, pair.1
                )));
            }
            adjacency.entry(e.node_a).or_default().push(e.node_b);
            adjacency.entry(e.node_b).or_default().push(e.node_a);
        }

        let mut cluster_ids = HashSet::new();
        let mut owner: HashMap<NodeId, ClusterId> = HashMap::new();
        for c in &self.clusters {
            if !cluster_ids.insert(c.id) {
                return Err(malformed(format!("duplicate cluster id {}", c.id)));
            }
            let Some(&first) = c.members.first() else {
                return Err(malformed(format!("cluster {} is empty", c.id)));
            };
            for &m in &c.members {
                if !node_ids.contains(&m) {
                    return Err(malformed(format!("cluster {} references missing node {}", c.id, m)));
                }
                if let Some(other) = owner.insert(m, c.id) {
                    return Err(malformed(format!(
                        "node {} belongs to clusters {} and {}",
                        m, other, c.id
                    )));
                }
            }
            let members: HashSet<NodeId> = c.members.iter().copied().collect();
            if component(&adjacency, first) != members {
                return Err(malformed(format!(
                    "cluster {} is not a connected component",
                    c.id
                )));
            }
        }
        if owner.len() != node_ids.len() {
            return Err(malformed("clusters do not cover every node".into()));
        }

        let next = &self.counters;
        let beyond = |counter: u64, max: Option<u64>| counter >= 1 && max.map_or(true, |m| counter > m);
        if !beyond(next.next_node_id, self.nodes.iter().map(|n| n.id.0).max())
            || !beyond(next.next_edge_id, self.edges.iter().map(|e| e.id.0).max())
            || !beyond(next.next_cluster_id, self.clusters.iter().map(|c| c.id.0).max())
        {
            return Err(malformed("id counters would reuse an existing id".into()));
        }
        Ok(())
    }
}

fn malformed(reason: String) -> TopologyError {
    TopologyError::MalformedSnapshot(reason)
}

fn component(adjacency: &HashMap<NodeId, Vec<NodeId>>, start: NodeId) -> HashSet<NodeId> {
    let mut seen = HashSet::new();
    seen.insert(start);
    let mut stack = vec![start];
    while let Some(n) = stack.pop() {
        for &m in adjacency.get(&n).map(Vec::as_slice).unwrap_or(&[]) {
            if seen.insert(m) {
                stack.push(m);
            }
        }
    }
    seen
}

// ─── Engine integration ─────────────────────────────────────────────────────

impl Network {
    /// Capture the full engine state.
    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot::from_network(self)
    }

    /// Replace the engine state, parameters included, with `snapshot`.
    ///
    /// The random source is kept. The tick audit is cleared.
    ///
    /// # Errors
    ///
    /// Any error from [`NetworkSnapshot::validate`]; the engine is unchanged.
    pub fn restore(&mut self, snapshot: &NetworkSnapshot) -> Result<()> {
        snapshot.validate(self.dim)?;
        self.clear();
        self.config = snapshot.parameters.clone();
        self.install(snapshot, false);
        self.next_node_id = snapshot.counters.next_node_id;
        self.next_edge_id = snapshot.counters.next_edge_id;
        self.next_cluster_id = snapshot.counters.next_cluster_id;
        self.inputs_since_cleanup = snapshot.counters.inputs_since_cleanup;
        Ok(())
    }

    /// Add the snapshot's graph to the live one, giving every node, edge and
    /// cluster a fresh id. Cross-references are rewritten through the
    /// returned tables. Parameters, counters and labels of the live engine
    /// are untouched; the inserted nodes keep their own labels.
    ///
    /// # Errors
    ///
    /// Any error from [`NetworkSnapshot::validate`]; the engine is unchanged.
    pub fn merge(&mut self, snapshot: &NetworkSnapshot) -> Result<IdRemap> {
        snapshot.validate(self.dim)?;
        Ok(self.install(snapshot, true))
    }

    /// Insert validated records. With `fresh_ids` every id is drawn from the
    /// engine counters; otherwise the recorded ids are used as-is.
    fn install(&mut self, snapshot: &NetworkSnapshot, fresh_ids: bool) -> IdRemap {
        let mut remap = IdRemap::default();

        for r in &snapshot.nodes {
            let id = if fresh_ids {
                self.next_node_id += 1;
                NodeId(self.next_node_id - 1)
            } else {
                r.id
            };
            self.nodes.insert(id, r.to_node(id));
            self.adjacency.insert(id, Default::default());
            remap.nodes.insert(r.id, id);
        }

        for r in &snapshot.edges {
            let id = if fresh_ids {
                self.next_edge_id += 1;
                EdgeId(self.next_edge_id - 1)
            } else {
                r.id
            };
            let (Some(&a), Some(&b)) = (remap.nodes.get(&r.node_a), remap.nodes.get(&r.node_b))
            else {
                continue;
            };
            let mut edge = Edge::new(id, a, b);
            edge.age = r.age;
            self.edges.insert(id, edge);
            self.adjacency.entry(a).or_default().insert(b, id);
            self.adjacency.entry(b).or_default().insert(a, id);
            remap.edges.insert(r.id, id);
        }

        for r in &snapshot.clusters {
            let id = if fresh_ids {
                self.next_cluster_id += 1;
                ClusterId(self.next_cluster_id - 1)
            } else {
                r.id
            };
            let members: Vec<NodeId> = r
                .members
                .iter()
                .filter_map(|m| remap.nodes.get(m).copied())
                .collect();
            for &m in &members {
                self.membership.insert(m, id);
            }
            self.clusters.insert(id, Cluster::new(id, members));
            remap.clusters.insert(r.id, id);
        }
        remap
    }

    /// Write a snapshot to `path` as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut out = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut out, &self.snapshot())?;
        out.flush()?;
        info!(
            path = %path.display(),
            nodes = self.node_count(),
            edges = self.edge_count(),
            clusters = self.cluster_count(),
            "saved snapshot"
        );
        Ok(())
    }

    /// Replace the engine state with the snapshot stored at `path`.
    ///
    /// # Errors
    ///
    /// I/O, decoding or validation failures. The engine is unchanged on any
    /// error.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let snapshot = read_snapshot(path)?;
        self.restore(&snapshot)?;
        info!(path = %path.display(), nodes = self.node_count(), "loaded snapshot");
        Ok(())
    }

    /// Merge the snapshot stored at `path` into the live engine under fresh
    /// ids. See [`Self::merge`].
    pub fn insert_from(&mut self, path: impl AsRef<Path>) -> Result<IdRemap> {
        let path = path.as_ref();
        let snapshot = read_snapshot(path)?;
        let remap = self.merge(&snapshot)?;
        info!(
            path = %path.display(),
            inserted = remap.nodes.len(),
            "inserted snapshot"
        );
        Ok(remap)
    }
}

fn read_snapshot(path: &Path) -> Result<NetworkSnapshot> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Helpers ──────────────────────────────────────────────────────────────

    /// Two components: a triangle and a lone node.
    fn sample() -> Network {
        let mut net = Network::with_seed(2, 21);
        let a = net.add_node(vec![0.0, 0.0], Some("a".into()));
        let b = net.add_node(vec![1.0, 0.0], None);
        let c = net.add_node(vec![0.0, 1.0], Some("c".into()));
        net.add_node(vec![5.0, 5.0], None);
        net.add_edge(a, b);
        net.add_edge(b, c);
        net.add_edge(c, a);
        net.nodes.get_mut(&a).unwrap().error = 0.75;
        net.nodes.get_mut(&b).unwrap().signal_count = 4;
        net.edges.values_mut().for_each(|e| e.age = 3);
        net
    }

    // ── Validation ───────────────────────────────────────────────────────────

    #[test]
    fn test_fresh_snapshot_validates() {
        let snap = sample().snapshot();
        assert!(snap.validate(2).is_ok());
        assert_eq!(snap.version, SNAPSHOT_VERSION);
        assert_eq!(snap.nodes.len(), 4);
        assert_eq!(snap.edges.len(), 3);
        assert_eq!(snap.clusters.len(), 2);
    }

    #[test]
    fn test_version_and_dimension_rejected() {
        let mut snap = sample().snapshot();
        assert!(matches!(
            snap.validate(3),
            Err(TopologyError::SnapshotDimension {
                expected: 3,
                found: 2
            })
        ));
        snap.version = 99;
        assert!(matches!(
            snap.validate(2),
            Err(TopologyError::SnapshotVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_dangling_edge_rejected() {
        let mut snap = sample().snapshot();
        snap.edges[0].node_b = NodeId(404);
        assert!(matches!(
            snap.validate(2),
            Err(TopologyError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn test_cluster_must_be_component() {
        let mut snap = sample().snapshot();
        // move the lone node into the triangle's cluster
        let lone = snap.clusters.pop().unwrap();
        snap.clusters[0].members.extend(lone.members);
        let err = snap.validate(2).unwrap_err();
        assert!(err.to_string().contains("connected component"), "err={}", err);
    }

    #[test]
    fn test_uncovered_node_rejected() {
        let mut snap = sample().snapshot();
        snap.clusters.pop();
        let err = snap.validate(2).unwrap_err();
        assert!(err.to_string().contains("cover"), "err={}", err);
    }

    #[test]
    fn test_counters_must_not_reuse_ids() {
        let mut snap = sample().snapshot();
        snap.counters.next_node_id = 2;
        assert!(snap.validate(2).is_err());
    }

    // ── Restore / merge ──────────────────────────────────────────────────────

    #[test]
    fn test_restore_reproduces_graph() {
        let src = sample();
        let snap = src.snapshot();
        let mut dst = Network::with_seed(2, 1);
        dst.restore(&snap).unwrap();
        assert_eq!(dst.snapshot(), snap);
        assert_eq!(dst.next_ids(), src.next_ids());
        assert_eq!(dst.degree(NodeId(2)), 2);
    }

    #[test]
    fn test_failed_restore_leaves_engine_untouched() {
        let mut dst = sample();
        let before = dst.snapshot();
        let mut bad = before.clone();
        bad.edges[1].node_a = bad.edges[1].node_b;
        assert!(dst.restore(&bad).is_err());
        assert_eq!(dst.snapshot(), before);
    }

    #[test]
    fn test_merge_uses_fresh_ids_and_keeps_references() {
        let mut live = sample();
        let snap = sample().snapshot();
        let remap = live.merge(&snap).unwrap();

        assert_eq!(live.node_count(), 8);
        assert_eq!(live.edge_count(), 6);
        assert_eq!(live.cluster_count(), 4);
        for (old, new) in &remap.nodes {
            assert_ne!(old, new);
            assert!(new.0 > 4);
        }
        for r in &snap.edges {
            let (a, b) = (remap.nodes[&r.node_a], remap.nodes[&r.node_b]);
            assert_eq!(live.edge_between(a, b), Some(remap.edges[&r.id]));
        }
        let labelled = remap.nodes[&NodeId(1)];
        assert_eq!(live.node(labelled).unwrap().label.as_deref(), Some("a"));
        assert!(live.snapshot().validate(2).is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let snap = sample().snapshot();
        let json = snap.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["nodes"][0]["label"], "a");
        assert_eq!(NetworkSnapshot::from_json(&json).unwrap(), snap);
    }
}
