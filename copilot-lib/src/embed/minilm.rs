use std::sync::Mutex;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::debug;

use crate::embed::{Embedder, Embedding};
use crate::{Error, Result};

/// MiniLM embedder using sentence-transformers/all-MiniLM-L6-v2.
///
/// The ONNX session needs exclusive access while running, so it sits behind
/// a mutex and the embedder can be shared between queries.
pub struct MiniLmEmbedder {
    model: Mutex<TextEmbedding>,
}

impl MiniLmEmbedder {
    /// Create a new MiniLM embedder.
    ///
    /// Downloads the model on first use (~90MB).
    pub fn new() -> Result<Self> {
        let opts = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
            .with_show_download_progress(true);

        TextEmbedding::try_new(opts)
            .map(|model| Self {
                model: Mutex::new(model),
            })
            .map_err(|e| Error::RetrievalUnavailable(e.to_string()))
    }
}

impl Embedder for MiniLmEmbedder {
    fn model_name(&self) -> &str {
        "sentence-transformers/all-MiniLM-L6-v2"
    }

    fn dimension(&self) -> usize {
        384
    }

    fn embed_query(&self, text: &str) -> Result<Embedding> {
        let mut model = self
            .model
            .lock()
            .map_err(|_| Error::RetrievalUnavailable("embedding model lock poisoned".to_string()))?;

        debug!(chars = text.len(), "embedding query");
        model
            .embed(vec![text], None)
            .map_err(|e| Error::RetrievalUnavailable(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::RetrievalUnavailable("model returned no embeddings".to_string()))
    }
}
