//! Nearest-neighbor search over pre-computed vectors
//!
//! The index is produced by an external indexing step and only read here.
//! Position `i` in the index corresponds to position `i` in the
//! [`RecordStore`](crate::store::RecordStore).
//!
//! # Usage
//!
//! ```ignore
//! use copilot_lib::index::{FlatIndex, VectorIndex};
//!
//! let index = FlatIndex::load("data/index/shipments.json")?;
//! let neighbors = index.search(&query_embedding, 5)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::Result;

/// Distance metric the index was built with.
///
/// Both metrics produce non-negative distances where lower means more similar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Squared Euclidean distance
    #[default]
    L2,
    /// `1 - cosine similarity`, in `[0, 2]`
    Cosine,
}

/// A single search hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the matched vector, which is also its record position
    pub position: usize,
    /// Distance to the query (lower is more similar)
    pub distance: f32,
}

/// Trait for read-only vector indexes
pub trait VectorIndex: Send + Sync {
    /// Search for the nearest vectors
    ///
    /// # Returns
    /// At most `k` neighbors in ascending distance order. Ties keep the
    /// index's native order. A query of the wrong dimension is
    /// [`Error::IndexCorrupt`](crate::Error::IndexCorrupt).
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;

    /// Dimension of every stored vector
    fn dimension(&self) -> usize;

    /// Metric used for distances
    fn metric(&self) -> Metric;

    /// Number of stored vectors
    fn len(&self) -> usize;

    /// Check if index is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

mod flat;

pub use flat::*;
