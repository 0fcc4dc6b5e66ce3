/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Undirected, aged edges between two distinct nodes.

use core::fmt;

use crate::node::NodeId;

/// Stable edge identifier. Monotonically increasing, never reused within a
/// session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EdgeId(pub u64);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Undirected incidence between two nodes.
///
/// Endpoints are held by id, never by ownership; a node may be referenced by
/// any number of edges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    id: EdgeId,
    node_a: NodeId,
    node_b: NodeId,
    /// Inputs since this edge was last refreshed by a match of both
    /// endpoints. Advances once per match of either endpoint as winner.
    pub age: u64,
}

impl Edge {
    /// Create a fresh edge of age 0.
    pub fn new(id: EdgeId, node_a: NodeId, node_b: NodeId) -> Self {
        debug_assert_ne!(node_a, node_b, "self-loops are not allowed");
        Self {
            id,
            node_a,
            node_b,
            age: 0,
        }
    }

    /// Identifier.
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// First endpoint, as created.
    pub fn node_a(&self) -> NodeId {
        self.node_a
    }

    /// Second endpoint, as created.
    pub fn node_b(&self) -> NodeId {
        self.node_b
    }

    /// Both endpoints.
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.node_a, self.node_b)
    }

    /// `true` if `node` is one of the endpoints.
    pub fn touches(&self, node: NodeId) -> bool {
        self.node_a == node || self.node_b == node
    }

    /// The endpoint opposite `node`, or `None` if `node` is not an endpoint.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.node_a == node {
            Some(self.node_b)
        } else if self.node_b == node {
            Some(self.node_a)
        } else {
            None
        }
    }
}
