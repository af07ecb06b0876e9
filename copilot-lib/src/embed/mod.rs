//! Text embedding
//!
//! Uses sentence-transformers/all-MiniLM-L6-v2 via the fastembed crate (ONNX
//! runtime). The index must have been built with the same model, otherwise
//! dimensions or geometry will not line up.
//!
//! # Model Details
//!
//! - Dimensions: 384
//! - Max tokens: 256
//!
//! # Usage
//!
//! ```ignore
//! use copilot_lib::embed::{Embedder, MiniLmEmbedder};
//!
//! let embedder = MiniLmEmbedder::new()?;
//! let query_embedding = embedder.embed_query("Why was my shipment delayed?")?;
//! ```

use crate::Result;

/// A vector embedding - fixed size array of floats
pub type Embedding = Vec<f32>;

/// Trait for text embedding models
///
/// Implementations are shared across concurrent queries, so embedding takes
/// `&self`.
pub trait Embedder: Send + Sync {
    /// Embed a single query for searching
    fn embed_query(&self, text: &str) -> Result<Embedding>;

    /// Returns the embedding dimension
    fn dimension(&self) -> usize;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

mod minilm;
pub use minilm::*;
