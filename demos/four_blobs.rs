//! # Four Blobs: Watching a Topology Grow
//!
//! Streams jittered samples from four Gaussian blobs in the unit square into a
//! [`Network`] and prints what the graph looks like as it learns.
//!
//! Nothing tells the network how many groups there are. It starts with two
//! nodes, inserts a new one whenever a sample lands outside the local radius,
//! and links nodes that keep winning the same samples. Every `lambda` inputs a
//! maintenance pass cuts the longest edge, drops nodes that rarely win, and
//! joins clusters whose closest members have drifted together. The clusters
//! that remain are simply the connected components of the graph.
//!
//! ```text
//!  1.0 ┌───────────────────────┐
//!      │   "nw"         "ne"   │
//!      │    ●●            ●●   │
//!      │                       │
//!      │    ●●            ●●   │
//!      │   "sw"         "se"   │
//!  0.0 └───────────────────────┘
//!     0.0                     1.0
//! ```
//!
//! ## Running this example
//!
//! ```
//! cargo run --example four_blobs
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use topomap_core::{Network, NetworkConfig};

const BLOBS: [([f64; 2], &str); 4] = [
    ([0.2, 0.2], "sw"),
    ([0.8, 0.2], "se"),
    ([0.2, 0.8], "nw"),
    ([0.8, 0.8], "ne"),
];

fn main() {
    println!("Four blobs, one pass at a time");
    println!("==============================\n");

    // ── Configuration ────────────────────────────────────────────────────────
    //
    // An absolute join radius keeps the blobs apart while still healing the
    // cuts that longest-edge removal makes inside a blob.
    let config = NetworkConfig {
        use_absolute_join_tolerance: true,
        join_tolerance_absolute: 0.12,
        c1_param: 0.3,
        ..NetworkConfig::default()
    };
    let mut net = Network::with_config(2, config);
    net.reseed(7);

    let mut rng = StdRng::seed_from_u64(7);
    let jitter = match Normal::new(0.0, 0.1) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("bad jitter: {e}");
            return;
        }
    };

    // ── Training ─────────────────────────────────────────────────────────────
    for pass in 1..=100 {
        for (centre, label) in BLOBS {
            let sample = [
                (centre[0] + jitter.sample(&mut rng)).clamp(0.0, 1.0),
                (centre[1] + jitter.sample(&mut rng)).clamp(0.0, 1.0),
            ];
            if let Err(e) = net.input(&sample, Some(label)) {
                eprintln!("input rejected: {e}");
                return;
            }
        }
        if pass % 20 == 0 {
            println!(
                "  pass {:>3} | nodes {:>3} | edges {:>3} | clusters {:>2}",
                pass,
                net.node_count(),
                net.edge_count(),
                net.cluster_count()
            );
        }
    }

    // ── Result ───────────────────────────────────────────────────────────────
    println!("\nClusters");
    println!("--------");
    for cluster in net.clusters() {
        let mean = cluster.mean();
        println!(
            "  {:<4} {:>3} nodes | mean ({:.3}, {:.3}) | label {}",
            cluster.id(),
            cluster.len(),
            mean[0],
            mean[1],
            cluster.label().unwrap_or("-")
        );
    }

    println!("\nTopology");
    println!("--------");
    print!("{}", net.summary());
}
