/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Per-tick audit trail.
//!
//! Observers (visualisers, evaluation harnesses) poll these lists after each
//! `input` call to follow how the partition changed. The engine never reads
//! them back. Everything here is cleared at the start of the next input.

use crate::cluster::ClusterId;
use crate::node::NodeId;

/// A cluster split caused by an edge removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitEvent {
    /// The original cluster, which kept the larger piece.
    pub kept: ClusterId,
    /// The fresh cluster created for the smaller piece.
    pub created: ClusterId,
}

/// Two clusters merged by an edge addition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JoinEvent {
    /// The surviving cluster.
    pub kept: ClusterId,
    /// The cluster whose members moved into `kept`. It no longer exists.
    pub absorbed: ClusterId,
}

/// Transient state of the current tick.
#[derive(Clone, Debug, Default)]
pub(crate) struct TickAudit {
    /// Node touched by the input: the bootstrap or novelty node, or the
    /// winner on a match.
    pub activated: Option<NodeId>,
    pub splits: Vec<SplitEvent>,
    pub joins: Vec<JoinEvent>,
    pub removed: Vec<ClusterId>,
}

impl TickAudit {
    pub(crate) fn reset(&mut self) {
        self.activated = None;
        self.splits.clear();
        self.joins.clear();
        self.removed.clear();
    }
}
