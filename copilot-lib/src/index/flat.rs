use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::embed::Embedding;
use crate::index::{Metric, Neighbor, VectorIndex};
use crate::{Error, Result};

/// Exact brute-force index.
///
/// Every search scores all stored vectors, which is fine for the few
/// thousand delay reasons in a shipment dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndex {
    metric: Metric,
    dimension: usize,
    vectors: Vec<Embedding>,
}

impl FlatIndex {
    /// Build an index from vectors in record-position order.
    pub fn new(metric: Metric, dimension: usize, vectors: Vec<Embedding>) -> Result<Self> {
        let index = Self {
            metric,
            dimension,
            vectors,
        };
        index.validate()?;
        Ok(index)
    }

    /// Load a persisted index file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| Error::load(path, e))?;
        let index: Self = serde_json::from_str(&raw).map_err(|e| Error::load(path, e))?;
        index.validate()?;

        info!(
            path = %path.display(),
            vectors = index.vectors.len(),
            dimension = index.dimension,
            metric = ?index.metric,
            "loaded vector index"
        );
        Ok(index)
    }

    fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(Error::IndexCorrupt("index dimension is zero".to_string()));
        }
        if let Some((position, v)) = self
            .vectors
            .iter()
            .enumerate()
            .find(|(_, v)| v.len() != self.dimension)
        {
            return Err(Error::IndexCorrupt(format!(
                "vector {position} has dimension {}, index declares {}",
                v.len(),
                self.dimension
            )));
        }
        Ok(())
    }
}

impl VectorIndex for FlatIndex {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(Error::IndexCorrupt(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dimension
            )));
        }

        let mut neighbors: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, v)| Neighbor {
                position,
                distance: distance(self.metric, query, v),
            })
            .collect();

        // stable sort: equal distances keep storage order
        neighbors.sort_by(|a, b| compare_distance(a.distance, b.distance));
        neighbors.truncate(k);

        Ok(neighbors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn metric(&self) -> Metric {
        self.metric
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }
}

fn distance(metric: Metric, a: &[f32], b: &[f32]) -> f32 {
    match metric {
        Metric::L2 => squared_l2(a, b),
        Metric::Cosine => (1.0 - cosine_similarity(a, b)).max(0.0),
    }
}

/// NaN distances order after every real distance.
fn compare_distance(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");

    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 means identical direction.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
