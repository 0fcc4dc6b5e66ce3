//! Fixed-dimension real vectors and the Euclidean metric.
//!
//! Every pattern in the network is a plain `[f64]` slice of the engine's input
//! dimensionality. This module holds the handful of slice operations the
//! entity layer and the engine share: distance, in-place adaptation toward an
//! input, and the component-wise statistics a cluster caches.
//!
//! Distance is always the full Euclidean distance. No partial or weighted
//! metric is used anywhere in the crate.
//!
//! All functions assume equal-length inputs; the engine rejects mismatched
//! patterns at the `input` boundary, so the checks here are debug assertions
//! only.

/// Euclidean distance between two patterns of equal length.
#[inline]
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Move `pattern` toward `input` by `rate`, in place.
///
/// `pattern[i] += rate * (input[i] - pattern[i])`. A rate of `1.0` copies the
/// input; `0.0` leaves the pattern untouched.
#[inline]
pub fn adapt_toward(pattern: &mut [f64], input: &[f64], rate: f64) {
    debug_assert_eq!(pattern.len(), input.len());
    for (p, x) in pattern.iter_mut().zip(input) {
        *p += rate * (x - *p);
    }
}

/// Component-wise midpoint of two patterns.
pub fn midpoint(a: &[f64], b: &[f64]) -> Vec<f64> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| (x + y) / 2.0).collect()
}

/// Component-wise arithmetic mean. `None` for an empty set.
pub fn mean<'a, I>(patterns: I, dim: usize) -> Option<Vec<f64>>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut sum = vec![0.0; dim];
    let mut count = 0usize;
    for p in patterns {
        for (s, x) in sum.iter_mut().zip(p) {
            *s += x;
        }
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let n = count as f64;
    sum.iter_mut().for_each(|s| *s /= n);
    Some(sum)
}

/// Component-wise mean weighted by an integer count per pattern.
///
/// `None` for an empty set or when every weight is zero.
pub fn weighted_mean<'a, I>(patterns: I, dim: usize) -> Option<Vec<f64>>
where
    I: IntoIterator<Item = (&'a [f64], u64)>,
{
    let mut sum = vec![0.0; dim];
    let mut total: u64 = 0;
    for (p, w) in patterns {
        let wf = w as f64;
        for (s, x) in sum.iter_mut().zip(p) {
            *s += x * wf;
        }
        total = total.saturating_add(w);
    }
    if total == 0 {
        return None;
    }
    let t = total as f64;
    sum.iter_mut().for_each(|s| *s /= t);
    Some(sum)
}

/// Per-dimension minimum. `None` for an empty set.
pub fn component_min<'a, I>(patterns: I, dim: usize) -> Option<Vec<f64>>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    fold_components(patterns, dim, f64::INFINITY, f64::min)
}

/// Per-dimension maximum. `None` for an empty set.
pub fn component_max<'a, I>(patterns: I, dim: usize) -> Option<Vec<f64>>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    fold_components(patterns, dim, f64::NEG_INFINITY, f64::max)
}

fn fold_components<'a, I>(
    patterns: I,
    dim: usize,
    init: f64,
    f: fn(f64, f64) -> f64,
) -> Option<Vec<f64>>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut acc = vec![init; dim];
    let mut seen = false;
    for p in patterns {
        for (a, x) in acc.iter_mut().zip(p) {
            *a = f(*a, *x);
        }
        seen = true;
    }
    seen.then_some(acc)
}

/// Per-dimension population variance around a precomputed `mean`.
///
/// `None` for an empty set.
pub fn variance<'a, I>(patterns: I, mean: &[f64]) -> Option<Vec<f64>>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut sum = vec![0.0; mean.len()];
    let mut count = 0usize;
    for p in patterns {
        for ((s, x), m) in sum.iter_mut().zip(p).zip(mean) {
            let d = x - m;
            *s += d * d;
        }
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let n = count as f64;
    sum.iter_mut().for_each(|s| *s /= n);
    Some(sum)
}

/// Mean Euclidean distance over all pairs of distinct patterns.
///
/// `None` when fewer than two patterns are given, since no pair exists.
pub fn average_pairwise_distance(patterns: &[&[f64]]) -> Option<f64> {
    let n = patterns.len();
    if n < 2 {
        return None;
    }
    let mut sum = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            sum += euclidean_distance(patterns[i], patterns[j]);
        }
    }
    let pairs = (n * (n - 1) / 2) as f64;
    Some(sum / pairs)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
