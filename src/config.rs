/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Engine parameters.
//!
//! - [`NetworkConfig`]: every tunable of the per-input protocol and the
//!   periodic maintenance pass, held by value inside each
//!   [`crate::network::Network`]. There is no process-wide state.
//! - [`PrototypeStrategy`]: how a cluster picks its representative node.
//!
//! Parameters may be changed between inputs through
//! [`crate::network::Network::config_mut`]; the next `input` call observes the
//! new values.

use core::fmt;

// ─── PrototypeStrategy ──────────────────────────────────────────────────────

/// Rule for selecting a cluster's prototype node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrototypeStrategy {
    /// The member that has matched the most inputs (highest signal count).
    #[default]
    BySignalCount,
    /// The member with the lowest accumulated error.
    ByError,
}

impl fmt::Display for PrototypeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BySignalCount => f.write_str("by_signal_count"),
            Self::ByError => f.write_str("by_error"),
        }
    }
}

// ─── NetworkConfig ──────────────────────────────────────────────────────────

/// Configuration of a topology network.
///
/// Defaults reproduce the reference parameterisation: dynamic thresholds,
/// cleanup every 25 inputs with longest-edge removal, small-cluster removal
/// and relative cluster joining enabled.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkConfig {
    /// Standard deviation of Gaussian noise added to each input before
    /// processing. `0.0` disables it. A testing aid only.
    pub noise_level: f64,

    /// Use a fixed similarity threshold instead of the adaptive one.
    pub use_fixed_threshold: bool,

    /// Per-dimension fixed threshold; the effective radius is
    /// `fixed_threshold × √dim`.
    pub fixed_threshold: f64,

    /// Floor applied to every adaptive threshold.
    pub minimum_threshold: f64,

    /// Edges older than this (strictly greater) are removed after a match.
    pub age_dead: u64,

    /// Allow a freshly inserted node to connect to its nearest node when it
    /// extends that node's cluster outward.
    pub connect_new_nodes: bool,

    /// Inputs between maintenance passes. `0` disables maintenance.
    pub lambda: u64,

    /// Maintenance: remove the single longest edge.
    pub edge_max_removal: bool,

    /// Maintenance: remove the single node with the lowest signal count.
    pub node_num_signals_min_removal: bool,

    /// Maintenance: insert a node between the highest-error node and its
    /// highest-error neighbour.
    pub reduce_error_insertion: bool,

    /// Maintenance: remove weakly supported nodes with few neighbours.
    pub small_cluster_removal: bool,

    /// Signal-count factor for removing nodes with exactly two neighbours.
    pub c2_param: f64,

    /// Signal-count factor for removing nodes with exactly one neighbour.
    pub c1_param: f64,

    /// Maintenance: join the closest pair of clusters while they pass the
    /// join test.
    pub cluster_joining: bool,

    /// Relative join tolerance, compared against each cluster's average
    /// intra-cluster pairwise distance.
    pub join_tolerance: f64,

    /// Use the absolute join tolerance instead of the relative one.
    pub use_absolute_join_tolerance: bool,

    /// Per-dimension absolute join tolerance; the effective radius is
    /// `join_tolerance_absolute × √dim`.
    pub join_tolerance_absolute: f64,

    /// Upper bound on joins per maintenance pass.
    pub joining_iterations_max: usize,

    /// How clusters pick their prototype node.
    pub prototype_strategy: PrototypeStrategy,
}

impl NetworkConfig {
    /// Construct the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed similarity radius for an engine of dimensionality `dim`.
    pub fn fixed_radius(&self, dim: usize) -> f64 {
        (self.fixed_threshold * self.fixed_threshold * dim as f64).sqrt()
    }

    /// Absolute join radius for an engine of dimensionality `dim`.
    pub fn absolute_join_radius(&self, dim: usize) -> f64 {
        (self.join_tolerance_absolute * self.join_tolerance_absolute * dim as f64).sqrt()
    }

    /// Threshold assigned to a node at creation, before its first recompute.
    pub(crate) fn initial_threshold(&self) -> f64 {
        self.minimum_threshold.max(0.0)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            noise_level: 0.0,
            use_fixed_threshold: false,
            fixed_threshold: 0.1,
            minimum_threshold: 0.0,
            age_dead: 100,
            connect_new_nodes: false,
            lambda: 25,
            edge_max_removal: true,
            node_num_signals_min_removal: false,
            reduce_error_insertion: false,
            small_cluster_removal: true,
            c2_param: 0.001,
            c1_param: 0.1,
            cluster_joining: true,
            join_tolerance: 1.0,
            use_absolute_join_tolerance: false,
            join_tolerance_absolute: 0.1,
            joining_iterations_max: 10,
            prototype_strategy: PrototypeStrategy::BySignalCount,
        }
    }
}

/// One `name = value` line per parameter.
impl fmt::Display for NetworkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "noise_level = {}", self.noise_level)?;
        writeln!(f, "use_fixed_threshold = {}", self.use_fixed_threshold)?;
        writeln!(f, "fixed_threshold = {}", self.fixed_threshold)?;
        writeln!(f, "minimum_threshold = {}", self.minimum_threshold)?;
        writeln!(f, "age_dead = {}", self.age_dead)?;
        writeln!(f, "connect_new_nodes = {}", self.connect_new_nodes)?;
        writeln!(f, "lambda = {}", self.lambda)?;
        writeln!(f, "edge_max_removal = {}", self.edge_max_removal)?;
        writeln!(
            f,
            "node_num_signals_min_removal = {}",
            self.node_num_signals_min_removal
        )?;
        writeln!(f, "reduce_error_insertion = {}", self.reduce_error_insertion)?;
        writeln!(f, "small_cluster_removal = {}", self.small_cluster_removal)?;
        writeln!(f, "c2_param = {}", self.c2_param)?;
        writeln!(f, "c1_param = {}", self.c1_param)?;
        writeln!(f, "cluster_joining = {}", self.cluster_joining)?;
        writeln!(f, "join_tolerance = {}", self.join_tolerance)?;
        writeln!(
            f,
            "use_absolute_join_tolerance = {}",
            self.use_absolute_join_tolerance
        )?;
        writeln!(f, "join_tolerance_absolute = {}", self.join_tolerance_absolute)?;
        writeln!(f, "joining_iterations_max = {}", self.joining_iterations_max)?;
        writeln!(f, "prototype_strategy = {}", self.prototype_strategy)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_parameters() {
        let c = NetworkConfig::default();
        assert_eq!(c.lambda, 25);
        assert_eq!(c.age_dead, 100);
        assert!(c.edge_max_removal);
        assert!(c.small_cluster_removal);
        assert!(c.cluster_joining);
        assert!(!c.connect_new_nodes);
        assert!(!c.reduce_error_insertion);
        assert!(!c.node_num_signals_min_removal);
        assert_eq!(c.joining_iterations_max, 10);
        assert_eq!(c.prototype_strategy, PrototypeStrategy::BySignalCount);
    }

    #[test]
    fn test_fixed_radius_scales_with_sqrt_dim() {
        let c = NetworkConfig {
            fixed_threshold: 0.1,
            ..NetworkConfig::default()
        };
        assert!((c.fixed_radius(4) - 0.2).abs() < 1e-12);
        assert!((c.fixed_radius(1) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_absolute_join_radius() {
        let c = NetworkConfig {
            join_tolerance_absolute: 0.3,
            ..NetworkConfig::default()
        };
        assert!((c.absolute_join_radius(9) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_initial_threshold_never_negative() {
        let mut c = NetworkConfig::default();
        c.minimum_threshold = -1.0;
        assert_eq!(c.initial_threshold(), 0.0);
        c.minimum_threshold = 0.25;
        assert_eq!(c.initial_threshold(), 0.25);
    }

    #[test]
    fn test_display_lists_every_parameter() {
        let report = NetworkConfig::default().to_string();
        assert_eq!(report.lines().count(), 19);
        assert!(report.contains("lambda = 25"));
        assert!(report.contains("prototype_strategy = by_signal_count"));
    }
}
