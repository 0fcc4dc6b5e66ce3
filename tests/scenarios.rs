//! End-to-end learning scenarios.
//!
//! Each test drives a [`Network`] through `input` only and checks the
//! resulting topology.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use topomap_core::{Network, NetworkConfig, NodeId};

// ─── helpers ─────────────────────────────────────────────────────────────────

const CENTERS: [[f64; 2]; 4] = [[0.2, 0.2], [0.8, 0.2], [0.2, 0.8], [0.8, 0.8]];

/// Absolute joining keeps the four blobs apart while still closing the gaps
/// that longest-edge removal opens inside a blob.
fn blob_config() -> NetworkConfig {
    NetworkConfig {
        use_absolute_join_tolerance: true,
        join_tolerance_absolute: 0.12,
        c1_param: 0.3,
        ..NetworkConfig::default()
    }
}

fn no_maintenance() -> NetworkConfig {
    NetworkConfig {
        lambda: 0,
        ..NetworkConfig::default()
    }
}

/// 100 round-robin passes over the four blobs with σ = 0.1 jitter, clipped to
/// the unit square.
fn train_four_blobs(seed: u64) -> Network {
    let mut net = Network::with_config(2, blob_config());
    net.reseed(seed);
    let mut rng = StdRng::seed_from_u64(seed);
    let jitter = Normal::new(0.0, 0.1).unwrap();
    for _ in 0..100 {
        for c in CENTERS {
            let p = [
                (c[0] + jitter.sample(&mut rng)).clamp(0.0, 1.0),
                (c[1] + jitter.sample(&mut rng)).clamp(0.0, 1.0),
            ];
            net.input(&p, None).unwrap();
        }
    }
    net
}

fn one_cluster_per_blob(net: &Network) -> bool {
    if net.cluster_count() != 4 {
        return false;
    }
    let means: Vec<Vec<f64>> = net.clusters().map(|c| c.mean().to_vec()).collect();
    CENTERS.iter().all(|c| {
        means
            .iter()
            .any(|m| ((m[0] - c[0]).powi(2) + (m[1] - c[1]).powi(2)).sqrt() < 0.15)
    })
}

// ─── scenario 1: four blobs ──────────────────────────────────────────────────

#[test]
fn test_four_gaussian_blobs_converge_to_four_clusters() {
    let seeds = [1u64, 2, 3, 4, 5, 6, 7];
    let mut hits = 0;
    let mut counts = Vec::new();
    for seed in seeds {
        let net = train_four_blobs(seed);
        counts.push(net.cluster_count());
        if one_cluster_per_blob(&net) {
            hits += 1;
        }
    }
    assert!(
        hits >= 5,
        "only {} of {} runs found the four blobs; cluster counts {:?}",
        hits,
        seeds.len(),
        counts
    );
}

// ─── scenario 2: repeated pattern ────────────────────────────────────────────

#[test]
fn test_repeated_pattern_absorbed_by_one_node() {
    let n = 50u64;
    let mut net = Network::with_config(3, no_maintenance());
    for _ in 0..n {
        net.input(&[0.4, 0.4, 0.4], None).unwrap();
    }
    // the two bootstrap nodes coincide; every later input matches the first
    assert_eq!(net.node_count(), 2);
    assert_eq!(net.cluster_count(), 1);
    let winner = net.node(NodeId(1)).unwrap();
    assert_eq!(winner.signal_count, n - 1);
    assert_eq!(net.node(NodeId(2)).unwrap().signal_count, 1);
    let total: u64 = net.nodes().map(|n| n.signal_count).sum();
    assert_eq!(total, n);
    assert!(net.nodes().all(|node| node.pattern() == [0.4, 0.4, 0.4]));
}

// ─── scenario 3: edge ageing ─────────────────────────────────────────────────

#[test]
fn test_unrefreshed_edge_ages_out_and_splits_cluster() {
    let config = NetworkConfig {
        age_dead: 3,
        lambda: 0,
        ..NetworkConfig::default()
    };
    let mut net = Network::with_config(2, config);
    let (a, b, c) = (NodeId(1), NodeId(2), NodeId(3));

    net.input(&[0.0, 0.0], None).unwrap();
    net.input(&[1.0, 0.0], None).unwrap();
    // A wins with B second: A-B is created
    net.input(&[0.0, 0.0], None).unwrap();
    let ab = net.edge_between(a, b).unwrap();
    // outside A's radius: C is inserted
    net.input(&[0.0, 1.0], None).unwrap();
    assert_eq!(net.node_count(), 3);

    // A keeps winning with C second; only A-C is refreshed
    for expected_age in 1..=3 {
        net.input(&[0.0, 0.1], None).unwrap();
        assert_eq!(net.edge(ab).map(|e| e.age), Some(expected_age));
        assert_eq!(net.cluster_count(), 1);
    }
    let whole = net.cluster_of(a).unwrap();

    net.input(&[0.0, 0.1], None).unwrap();
    assert!(net.edge(ab).is_none());
    assert!(net.edge_between(a, c).is_some());
    assert_eq!(net.cluster_count(), 2);
    assert_eq!(net.cluster_of(a), Some(whole));
    let split = net.split_clusters();
    assert_eq!(split.len(), 1);
    assert_eq!(split[0].kept, whole);
    assert_eq!(net.cluster_of(b), Some(split[0].created));
}

// ─── scenario 4: novelty ─────────────────────────────────────────────────────

#[test]
fn test_far_pattern_creates_one_node_and_moves_nothing() {
    for seed in 0..5u64 {
        let mut net = Network::with_config(2, no_maintenance());
        net.reseed(seed);
        let mut rng = StdRng::seed_from_u64(seed);
        let uniform = rand_distr::Uniform::new(0.0, 1.0);
        for _ in 0..200 {
            let p = [uniform.sample(&mut rng), uniform.sample(&mut rng)];
            net.input(&p, None).unwrap();
        }

        let before: Vec<(NodeId, Vec<f64>)> = net
            .nodes()
            .map(|n| (n.id(), n.pattern().to_vec()))
            .collect();
        let edges_before = net.edge_count();

        net.input(&[10.0, 10.0], Some("far")).unwrap();

        assert_eq!(net.node_count(), before.len() + 1, "seed={}", seed);
        assert_eq!(net.edge_count(), edges_before, "seed={}", seed);
        for (id, pattern) in &before {
            assert_eq!(net.node(*id).unwrap().pattern(), pattern.as_slice(), "seed={}", seed);
        }
        let fresh = net.activated_node().unwrap();
        assert!(before.iter().all(|(id, _)| *id != fresh));
        assert_eq!(net.node(fresh).unwrap().pattern(), &[10.0, 10.0]);
    }
}
