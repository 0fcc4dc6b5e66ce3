//! # topomap-core
//!
//! Online incremental topology learning: a self-organising graph of prototype
//! nodes, grown one input vector at a time and grouped into clusters.
//!
//! ---
//!
//! ## What it does
//!
//! A stream of real-valued vectors goes in. The engine keeps a small set of
//! **nodes**, each standing in for a region of the input space, and links
//! nodes that keep winning the same inputs together with aged **edges**. The
//! connected components of that graph are the **clusters**, each with cached
//! statistics (mean, prototype, majority label, spread).
//!
//! There is no training phase and no epoch. Every input either refines the
//! nearest node or, when it falls outside the local similarity radius, becomes
//! a new node. Every `lambda` inputs a maintenance pass prunes long edges and
//! weakly supported nodes and joins clusters that have drifted close.
//!
//! ## The pipeline
//!
//! ```text
//! input(pattern, label)
//!     │
//!     ├─ fewer than two nodes ──► new node
//!     │
//!     ├─ nearest s1, s2 ──► thresholds ──┬─ outside ──► new node (+ optional edge to s1)
//!     │                                  └─ inside ───► adapt s1, link s1-s2, age out edges
//!     │
//!     └─ every lambda inputs ──► maintenance
//!                                 longest edge → weakest node → error insertion
//!                                 → small clusters → cluster joining
//! ```
//!
//! Each edge added or removed reconciles the cluster partition on the spot:
//! adding an edge across clusters merges them, removing a bridge splits one.
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`vector`] | — | Euclidean distance, adaptation, component-wise statistics |
//! | [`config`] | [`NetworkConfig`], [`PrototypeStrategy`] | Every engine parameter |
//! | [`node`] | [`Node`], [`NodeId`] | Prototype vectors |
//! | [`edge`] | [`Edge`], [`EdgeId`] | Aged undirected links |
//! | [`cluster`] | [`Cluster`], [`ClusterView`], [`ClusterId`] | Connected components with cached statistics |
//! | [`network`] | [`Network`], [`TopologySummary`] | The engine: per-input protocol and maintenance |
//! | [`snapshot`] | [`NetworkSnapshot`] | Versioned JSON persistence and id-remapping merge (requires `serde`) |
//! | [`error`] | [`TopologyError`] | Error type |
//!
//! ## Example
//!
//! ```rust
//! use topomap_core::Network;
//!
//! let mut net = Network::with_seed(2, 42);
//! for (i, p) in [[0.1, 0.1], [0.9, 0.9], [0.12, 0.1], [0.88, 0.91]].iter().enumerate() {
//!     let label = if i % 2 == 0 { "low" } else { "high" };
//!     net.input(p, Some(label)).unwrap();
//! }
//! for cluster in net.clusters() {
//!     println!("{} {:?} {:?}", cluster.id(), cluster.mean(), cluster.label());
//! }
//! print!("{}", net.summary());
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (`debug` for topology changes, `warn` for
//! rejected input, `info` for persistence) and never installs a subscriber.
//!
//! ## License
//!
//! Business Source License 1.1. Free for evaluation and non-production use.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod cluster;
pub mod config;
pub mod edge;
pub mod error;
pub mod network;
pub mod node;
#[cfg(feature = "serde")]
pub mod snapshot;
pub mod vector;

#[cfg(feature = "python-ffi")]
pub mod ffi;

pub use cluster::{Cluster, ClusterId, ClusterView};
pub use config::{NetworkConfig, PrototypeStrategy};
pub use edge::{Edge, EdgeId};
pub use error::{Result, TopologyError};
pub use network::{IdCounters, JoinEvent, Network, SplitEvent, TopologySummary};
pub use node::{Node, NodeId};
#[cfg(feature = "serde")]
pub use snapshot::{IdRemap, NetworkSnapshot, SNAPSHOT_VERSION};
