//! Error types for the topology network.
//!
//! Only two things can go wrong at the public surface: an input pattern of
//! the wrong length, and a snapshot that does not fit the engine it is being
//! loaded into. Everything else in the per-input protocol is total under any
//! configuration; degenerate parameters make the engine skip a sub-step
//! instead of failing.

use thiserror::Error;

/// Errors reported by [`crate::network::Network`] and the snapshot codec.
#[derive(Error, Debug)]
pub enum TopologyError {
    /// An input pattern does not match the engine's dimensionality.
    ///
    /// The input is discarded and no state is mutated.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Dimensionality the engine was constructed with.
        expected: usize,
        /// Length of the rejected pattern.
        got: usize,
    },

    /// A snapshot carries a format version this build cannot read.
    #[error("snapshot version mismatch: expected {expected}, found {found}")]
    SnapshotVersion {
        /// Version written by this build.
        expected: u16,
        /// Version found in the document.
        found: u16,
    },

    /// A snapshot was written by an engine of a different dimensionality.
    #[error("snapshot dimension mismatch: engine has {expected}, snapshot has {found}")]
    SnapshotDimension {
        /// Dimensionality of the live engine.
        expected: usize,
        /// Dimensionality recorded in the snapshot.
        found: usize,
    },

    /// A snapshot is internally inconsistent (dangling ids, broken partition).
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// Reading or writing a snapshot file failed.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot document could not be encoded or decoded.
    #[cfg(feature = "serde")]
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for topology operations.
pub type Result<T> = std::result::Result<T, TopologyError>;
