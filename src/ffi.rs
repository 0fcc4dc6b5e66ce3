//! Python FFI bindings via PyO3.
//!
//! Exposes the topology engine to the Python robot and evaluation layer.
//! Ids cross the boundary as plain integers.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! from topomap_core import Network
//!
//! net = Network(2, seed=7)
//! for x, y in stream:
//!     net.input([x, y], label="cup")
//! print(net.cluster_count, net.activated_cluster())
//! for cid in net.cluster_ids():
//!     print(cid, net.cluster_mean(cid), net.cluster_label(cid))
//! net.save("topology.json")
//! ```

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::cluster::ClusterId;
use crate::config::NetworkConfig;
use crate::error::TopologyError;
use crate::network::Network as RustNetwork;
use crate::node::NodeId;

fn to_py_err(e: TopologyError) -> PyErr {
    match e {
        TopologyError::Io(io) => PyIOError::new_err(io.to_string()),
        other => PyValueError::new_err(other.to_string()),
    }
}

// ── Network ───────────────────────────────────────────────────────────────────

/// Online topology-learning network.
///
/// Args:
///     dim:         input dimensionality
///     seed:        optional seed for the noise / random-node source
///     config_json: optional JSON object with every engine parameter
#[pyclass(name = "Network")]
pub struct PyNetwork {
    inner: RustNetwork,
}

#[pymethods]
impl PyNetwork {
    /// Create an empty network.
    #[new]
    #[pyo3(signature = (dim, seed=None, config_json=None))]
    pub fn new(dim: usize, seed: Option<u64>, config_json: Option<&str>) -> PyResult<Self> {
        let mut inner = match seed {
            Some(s) => RustNetwork::with_seed(dim, s),
            None => RustNetwork::new(dim),
        };
        if let Some(json) = config_json {
            let config: NetworkConfig = serde_json::from_str(json)
                .map_err(|e| PyValueError::new_err(format!("invalid config: {e}")))?;
            inner.set_config(config);
        }
        Ok(Self { inner })
    }

    /// Feed one pattern. Raises ValueError on a dimensionality mismatch.
    #[pyo3(signature = (pattern, label=None))]
    pub fn input(&mut self, pattern: Vec<f64>, label: Option<&str>) -> PyResult<()> {
        self.inner.input(&pattern, label).map_err(to_py_err)
    }

    /// Input dimensionality.
    #[getter]
    pub fn dim(&self) -> usize {
        self.inner.dim()
    }

    /// Number of nodes.
    #[getter]
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of edges.
    #[getter]
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Number of clusters.
    #[getter]
    pub fn cluster_count(&self) -> usize {
        self.inner.cluster_count()
    }

    /// All nodes as (id, pattern, signal_count, label) tuples.
    pub fn nodes(&self) -> Vec<(u64, Vec<f64>, u64, Option<String>)> {
        self.inner
            .nodes()
            .map(|n| (n.id().0, n.pattern().to_vec(), n.signal_count, n.label.clone()))
            .collect()
    }

    /// All edges as (id, node_a, node_b, age) tuples.
    pub fn edges(&self) -> Vec<(u64, u64, u64, u64)> {
        self.inner
            .edges()
            .map(|e| (e.id().0, e.node_a().0, e.node_b().0, e.age))
            .collect()
    }

    /// Ids of all clusters, ascending.
    pub fn cluster_ids(&self) -> Vec<u64> {
        self.inner.clusters().map(|c| c.id().0).collect()
    }

    /// Member node ids of a cluster, or None if it does not exist.
    pub fn cluster_members(&self, cluster: u64) -> Option<Vec<u64>> {
        self.inner
            .cluster(ClusterId(cluster))
            .map(|c| c.members().iter().map(|n| n.0).collect())
    }

    /// Mean pattern of a cluster.
    pub fn cluster_mean(&self, cluster: u64) -> Option<Vec<f64>> {
        self.inner
            .cluster(ClusterId(cluster))
            .map(|c| c.mean().to_vec())
    }

    /// Prototype pattern of a cluster.
    pub fn cluster_prototype(&self, cluster: u64) -> Option<Vec<f64>> {
        self.inner
            .cluster(ClusterId(cluster))
            .and_then(|c| c.prototype().map(<[f64]>::to_vec))
    }

    /// Majority label of a cluster.
    pub fn cluster_label(&self, cluster: u64) -> Option<String> {
        self.inner
            .cluster(ClusterId(cluster))
            .and_then(|c| c.label().map(str::to_owned))
    }

    /// Cluster holding a node.
    pub fn cluster_of(&self, node: u64) -> Option<u64> {
        self.inner.cluster_of(NodeId(node)).map(|c| c.0)
    }

    /// Cluster touched by the most recent input.
    pub fn activated_cluster(&self) -> Option<u64> {
        self.inner.activated_cluster().map(|c| c.0)
    }

    /// Splits during the most recent input as (kept, created) pairs.
    pub fn split_clusters(&self) -> Vec<(u64, u64)> {
        self.inner
            .split_clusters()
            .iter()
            .map(|s| (s.kept.0, s.created.0))
            .collect()
    }

    /// Joins during the most recent input as (kept, absorbed) pairs.
    pub fn joined_clusters(&self) -> Vec<(u64, u64)> {
        self.inner
            .joined_clusters()
            .iter()
            .map(|j| (j.kept.0, j.absorbed.0))
            .collect()
    }

    /// Clusters removed during the most recent input.
    pub fn removed_clusters(&self) -> Vec<u64> {
        self.inner.removed_clusters().iter().map(|c| c.0).collect()
    }

    /// Current parameters as a JSON object.
    pub fn config_json(&self) -> PyResult<String> {
        serde_json::to_string(self.inner.config()).map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Replace every parameter from a JSON object.
    pub fn set_config_json(&mut self, json: &str) -> PyResult<()> {
        let config: NetworkConfig =
            serde_json::from_str(json).map_err(|e| PyValueError::new_err(e.to_string()))?;
        self.inner.set_config(config);
        Ok(())
    }

    /// Seed the graph with unconnected random nodes in the unit cube.
    pub fn create_random_nodes(&mut self, count: usize) -> Vec<u64> {
        self.inner
            .create_random_nodes(count)
            .into_iter()
            .map(|n| n.0)
            .collect()
    }

    /// Reset to an empty network.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Write a JSON snapshot.
    pub fn save(&self, path: &str) -> PyResult<()> {
        self.inner.save(path).map_err(to_py_err)
    }

    /// Replace the state with a JSON snapshot.
    pub fn load(&mut self, path: &str) -> PyResult<()> {
        self.inner.load(path).map_err(to_py_err)
    }

    /// Merge a JSON snapshot under fresh ids. Returns the number of nodes added.
    pub fn insert_from(&mut self, path: &str) -> PyResult<usize> {
        self.inner
            .insert_from(path)
            .map(|remap| remap.nodes.len())
            .map_err(to_py_err)
    }

    /// Topology report.
    pub fn summary(&self) -> String {
        self.inner.summary().to_string()
    }

    /// Parameter report.
    pub fn parameters(&self) -> String {
        self.inner.config().to_string()
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        format!(
            "Network(dim={}, nodes={}, edges={}, clusters={})",
            self.inner.dim(),
            self.inner.node_count(),
            self.inner.edge_count(),
            self.inner.cluster_count(),
        )
    }
}

// ── Module entry point ────────────────────────────────────────────────────────

/// Online topology learning: prototype nodes, aged edges, connected-component
/// clusters.
#[pymodule]
pub fn topomap_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyNetwork>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("SNAPSHOT_VERSION", crate::snapshot::SNAPSHOT_VERSION)?;
    Ok(())
}
