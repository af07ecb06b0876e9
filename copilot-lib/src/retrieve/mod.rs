//! Query-to-passage retrieval
//!
//! Combines embedder, vector index and record store into a single
//! `retrieve` call.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use copilot_lib::retrieve::Retriever;
//!
//! let retriever = Retriever::new(Arc::new(embedder), Arc::new(index), Arc::new(records))?;
//! let passages = retriever.retrieve("Why was my shipment delayed?", 5)?;
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::embed::Embedder;
use crate::index::VectorIndex;
use crate::store::RecordStore;
use crate::{Error, Result};

/// A retrieved delay reason with its position in the result list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPassage {
    /// 1-based position in the result list
    pub rank: usize,
    /// Distance to the query (lower is more similar)
    pub distance: f32,
    /// The matched record's delay reason
    pub text: String,
}

/// Reject queries that are empty after trimming.
pub fn validate_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(Error::InvalidInput("query is empty".to_string()));
    }
    Ok(())
}

/// Turns a query string into ranked passages.
///
/// All dependencies are shared and read-only, so one retriever can serve
/// concurrent queries.
pub struct Retriever<E: Embedder + ?Sized, I: VectorIndex + ?Sized> {
    embedder: Arc<E>,
    index: Arc<I>,
    records: Arc<RecordStore>,
}

impl<E: Embedder + ?Sized, I: VectorIndex + ?Sized> Retriever<E, I> {
    /// Create a retriever, checking that the artifacts agree with each other.
    pub fn new(embedder: Arc<E>, index: Arc<I>, records: Arc<RecordStore>) -> Result<Self> {
        if embedder.dimension() != index.dimension() {
            return Err(Error::IndexCorrupt(format!(
                "embedder {} produces {} dimensions, index expects {}",
                embedder.model_name(),
                embedder.dimension(),
                index.dimension()
            )));
        }
        if index.len() != records.len() {
            return Err(Error::IndexCorrupt(format!(
                "index holds {} vectors but record store holds {} records",
                index.len(),
                records.len()
            )));
        }

        Ok(Self {
            embedder,
            index,
            records,
        })
    }

    /// Retrieve up to `k` passages, most similar first.
    ///
    /// Returns fewer than `k` passages when the corpus is smaller than `k`.
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RankedPassage>> {
        validate_query(query)?;
        if k == 0 {
            return Err(Error::InvalidInput("k must be at least 1".to_string()));
        }

        let embedding = self.embedder.embed_query(query)?;
        let neighbors = self.index.search(&embedding, k)?;

        let passages = neighbors
            .into_iter()
            .enumerate()
            .map(|(i, neighbor)| {
                let record = self.records.get(neighbor.position).ok_or_else(|| {
                    Error::IndexCorrupt(format!(
                        "index returned position {} with no matching record",
                        neighbor.position
                    ))
                })?;

                Ok(RankedPassage {
                    rank: i + 1,
                    distance: neighbor.distance,
                    text: record.delay_reason.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(k, returned = passages.len(), "retrieved passages");
        Ok(passages)
    }

    /// Returns the number of indexed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns a reference to the embedder.
    #[must_use]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::embed::Embedding;
    use crate::index::{FlatIndex, Metric, Neighbor};
    use crate::store::Record;

    /// Embeds text by counting a fixed vocabulary, one dimension per word.
    pub(crate) struct KeywordEmbedder {
        pub vocabulary: Vec<&'static str>,
        pub calls: AtomicUsize,
    }

    impl KeywordEmbedder {
        pub(crate) fn new(vocabulary: Vec<&'static str>) -> Self {
            Self {
                vocabulary,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Embedder for KeywordEmbedder {
        fn embed_query(&self, text: &str) -> Result<Embedding> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let text = text.to_lowercase();
            Ok(self
                .vocabulary
                .iter()
                .map(|word| text.matches(word).count() as f32)
                .collect())
        }

        fn dimension(&self) -> usize {
            self.vocabulary.len()
        }

        fn model_name(&self) -> &str {
            "keyword"
        }
    }

    struct DownEmbedder;

    impl Embedder for DownEmbedder {
        fn embed_query(&self, _text: &str) -> Result<Embedding> {
            Err(Error::RetrievalUnavailable("connection refused".to_string()))
        }

        fn dimension(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "down"
        }
    }

    /// Reports a position past the end of the record store.
    struct DanglingIndex;

    impl VectorIndex for DanglingIndex {
        fn search(&self, _query: &[f32], _k: usize) -> Result<Vec<Neighbor>> {
            Ok(vec![Neighbor {
                position: 7,
                distance: 0.0,
            }])
        }

        fn dimension(&self) -> usize {
            2
        }

        fn metric(&self) -> Metric {
            Metric::L2
        }

        fn len(&self) -> usize {
            1
        }
    }

    fn retriever(reasons: &[(&str, Vec<f32>)]) -> Retriever<KeywordEmbedder, FlatIndex> {
        let embedder = KeywordEmbedder::new(vec!["snow", "traffic", "stock"]);
        let vectors = reasons.iter().map(|(_, v)| v.clone()).collect();
        let records = reasons
            .iter()
            .enumerate()
            .map(|(i, (text, _))| Record::new(i as u64, *text))
            .collect();

        Retriever::new(
            Arc::new(embedder),
            Arc::new(FlatIndex::new(Metric::L2, 3, vectors).unwrap()),
            Arc::new(RecordStore::new(records)),
        )
        .unwrap()
    }

    fn corpus() -> Retriever<KeywordEmbedder, FlatIndex> {
        retriever(&[
            ("Traffic congestion on the highway", vec![0.0, 1.0, 0.0]),
            ("Snowstorm closed the mountain pass", vec![1.0, 0.0, 0.0]),
            ("Item out of stock at warehouse", vec![0.0, 0.0, 1.0]),
            ("Snow and traffic combined", vec![1.0, 1.0, 0.0]),
        ])
    }

    #[test]
    fn test_ranks_are_sequential_and_distances_ascending() {
        let passages = corpus().retrieve("snow snow", 4).unwrap();

        assert_eq!(passages.len(), 4);
        assert_eq!(passages[0].text, "Snowstorm closed the mountain pass");
        let ranks: Vec<_> = passages.iter().map(|p| p.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        assert!(passages.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_short_corpus_returns_fewer_than_k() {
        let retriever = corpus();
        assert_eq!(retriever.len(), 4);

        let passages = retriever.retrieve("traffic", 10).unwrap();
        assert_eq!(passages.len(), retriever.len());
    }

    #[test]
    fn test_respects_k() {
        let passages = corpus().retrieve("stock", 2).unwrap();
        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].text, "Item out of stock at warehouse");
    }

    #[test]
    fn test_empty_query_never_reaches_embedder() {
        let retriever = corpus();
        let err = retriever.retrieve("   \n\t", 3).unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(retriever.embedder().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_zero_k_is_invalid() {
        let err = corpus().retrieve("snow", 0).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_empty_corpus_returns_nothing() {
        let passages = retriever(&[]).retrieve("snow", 3).unwrap();
        assert!(passages.is_empty());
    }

    #[test]
    fn test_embedder_failure_is_unavailable() {
        let retriever = Retriever::new(
            Arc::new(DownEmbedder),
            Arc::new(FlatIndex::new(Metric::L2, 2, vec![vec![1.0, 0.0]]).unwrap()),
            Arc::new(RecordStore::new(vec![Record::new(0, "Rain")])),
        )
        .unwrap();

        let err = retriever.retrieve("why late?", 1).unwrap_err();
        assert!(matches!(err, Error::RetrievalUnavailable(_)));
    }

    #[test]
    fn test_dimension_mismatch_rejected_at_construction() {
        let result = Retriever::new(
            Arc::new(KeywordEmbedder::new(vec!["snow"])),
            Arc::new(FlatIndex::new(Metric::L2, 2, vec![vec![1.0, 0.0]]).unwrap()),
            Arc::new(RecordStore::new(vec![Record::new(0, "Rain")])),
        );
        assert!(matches!(result, Err(Error::IndexCorrupt(_))));
    }

    #[test]
    fn test_record_count_mismatch_rejected_at_construction() {
        let result = Retriever::new(
            Arc::new(DownEmbedder),
            Arc::new(FlatIndex::new(Metric::L2, 2, vec![vec![1.0, 0.0]]).unwrap()),
            Arc::new(RecordStore::default()),
        );
        assert!(matches!(result, Err(Error::IndexCorrupt(_))));
    }

    #[test]
    fn test_missing_record_for_position_is_corrupt() {
        let retriever = Retriever::new(
            Arc::new(KeywordEmbedder::new(vec!["snow", "rain"])),
            Arc::new(DanglingIndex),
            Arc::new(RecordStore::new(vec![Record::new(0, "Rain")])),
        )
        .unwrap();

        let err = retriever.retrieve("snow", 1).unwrap_err();
        assert!(matches!(err, Error::IndexCorrupt(_)));
    }

    #[test]
    fn test_trait_objects_are_accepted() {
        let embedder: Arc<dyn Embedder> = Arc::new(KeywordEmbedder::new(vec!["snow", "rain"]));
        let index: Arc<dyn VectorIndex> =
            Arc::new(FlatIndex::new(Metric::L2, 2, vec![vec![0.0, 1.0]]).unwrap());
        let retriever =
            Retriever::new(embedder, index, Arc::new(RecordStore::new(vec![Record::new(0, "Rain")])))
                .unwrap();

        assert_eq!(retriever.retrieve("rain", 1).unwrap()[0].text, "Rain");
    }
}
