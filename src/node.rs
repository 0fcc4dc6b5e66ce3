/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Prototype nodes.
//!
//! A [`Node`] is a point in the input space standing in for the inputs it has
//! matched. Its id and dimensionality are fixed at creation; everything else
//! is mutated in place by the engine.

use core::fmt;

use crate::vector;

// ─── NodeId ─────────────────────────────────────────────────────────────────

/// Stable node identifier. Monotonically increasing, never reused within a
/// session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

// ─── Node ───────────────────────────────────────────────────────────────────

/// A prototype vector in the input space.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    id: NodeId,
    pattern: Vec<f64>,
    /// Adaptive similarity radius, recomputed before each novelty test in
    /// which this node is a nearest candidate.
    pub threshold: f64,
    /// Accumulated match distance. Drives error-reduction insertion.
    pub error: f64,
    /// Number of inputs this node has absorbed, starting at 1 on creation.
    pub signal_count: u64,
    /// Opaque evaluation label. Never read by the learning protocol.
    pub label: Option<String>,
}

impl Node {
    /// Create a node with signal count 1 and zero error.
    pub fn new(id: NodeId, pattern: Vec<f64>, threshold: f64, label: Option<String>) -> Self {
        Self {
            id,
            pattern,
            threshold,
            error: 0.0,
            signal_count: 1,
            label,
        }
    }

    /// Identifier.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Current prototype pattern.
    pub fn pattern(&self) -> &[f64] {
        &self.pattern
    }

    /// Dimensionality of the pattern.
    pub fn dim(&self) -> usize {
        self.pattern.len()
    }

    /// Euclidean distance from this node's pattern to `other`.
    #[inline]
    pub fn distance_to(&self, other: &[f64]) -> f64 {
        vector::euclidean_distance(&self.pattern, other)
    }

    /// Move the pattern toward `input` by `rate`.
    pub fn adapt(&mut self, input: &[f64], rate: f64) {
        vector::adapt_toward(&mut self.pattern, input, rate);
    }

    /// Rebuild a node with an explicit id, for snapshot restore and merge.
    pub(crate) fn with_id(&self, id: NodeId) -> Self {
        Self { id, ..self.clone() }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
