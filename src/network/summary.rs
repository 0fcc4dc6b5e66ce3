/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Human-readable topology report.

use core::fmt;
use std::collections::BTreeMap;

use super::Network;

/// Counts and histograms describing the current graph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TopologySummary {
    /// Number of nodes.
    pub nodes: usize,
    /// Number of edges.
    pub edges: usize,
    /// Number of clusters.
    pub clusters: usize,
    /// Neighbour count → number of nodes with that many neighbours.
    pub nodes_by_degree: BTreeMap<usize, usize>,
    /// Cluster size → number of clusters of that size.
    pub clusters_by_size: BTreeMap<usize, usize>,
}

impl Network {
    /// Snapshot the graph's shape.
    pub fn summary(&self) -> TopologySummary {
        let mut nodes_by_degree = BTreeMap::new();
        for id in self.nodes.keys() {
            *nodes_by_degree.entry(self.degree(*id)).or_insert(0) += 1;
        }
        let mut clusters_by_size = BTreeMap::new();
        for c in self.clusters.values() {
            *clusters_by_size.entry(c.len()).or_insert(0) += 1;
        }
        TopologySummary {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
            clusters: self.clusters.len(),
            nodes_by_degree,
            clusters_by_size,
        }
    }
}

impl fmt::Display for TopologySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nodes: {}", self.nodes)?;
        for (degree, count) in &self.nodes_by_degree {
            writeln!(f, "  {count} nodes with {degree} edges")?;
        }
        writeln!(f, "edges: {}", self.edges)?;
        writeln!(f, "clusters: {}", self.clusters)?;
        for (size, count) in &self.clusters_by_size {
            writeln!(f, "  {count} clusters with {size} nodes")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::network::Network;

    #[test]
    fn test_summary_histograms() {
        let mut net = Network::with_seed(1, 3);
        let a = net.add_node(vec![0.0], None);
        let b = net.add_node(vec![1.0], None);
        let c = net.add_node(vec![2.0], None);
        net.add_node(vec![9.0], None);
        net.add_edge(a, b);
        net.add_edge(b, c);

        let s = net.summary();
        assert_eq!((s.nodes, s.edges, s.clusters), (4, 2, 2));
        assert_eq!(s.nodes_by_degree.get(&0), Some(&1));
        assert_eq!(s.nodes_by_degree.get(&1), Some(&2));
        assert_eq!(s.nodes_by_degree.get(&2), Some(&1));
        assert_eq!(s.clusters_by_size.get(&3), Some(&1));
        assert_eq!(s.clusters_by_size.get(&1), Some(&1));

        let text = s.to_string();
        assert!(text.starts_with("nodes: 4\n"), "text={}", text);
        assert!(text.contains("  1 clusters with 3 nodes"));
    }
}
