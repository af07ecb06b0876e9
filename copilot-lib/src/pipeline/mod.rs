//! End-to-end question answering
//!
//! ```text
//! query -> Retriever -> PromptBuilder -> LanguageModel -> Classifier -> Answer
//! ```
//!
//! Each step depends on the previous one, so a query runs strictly in
//! sequence. Any failure short-circuits; no partial answer is produced.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::classify::{Category, Classifier};
use crate::embed::Embedder;
use crate::generate::LanguageModel;
use crate::index::VectorIndex;
use crate::prompt::PromptBuilder;
use crate::retrieve::{validate_query, RankedPassage, Retriever};
use crate::{Error, Result};

/// A categorized explanation with the passages it was grounded on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub category: Category,
    pub explanation: String,
    pub passages: Vec<RankedPassage>,
    /// The model's full response, before classification
    pub response: String,
}

/// Retrieval-augmented delay explainer.
///
/// Holds only shared, read-only state; `ask` can be called from several
/// threads at once.
pub struct Copilot<E, I, L>
where
    E: Embedder + ?Sized,
    I: VectorIndex + ?Sized,
    L: LanguageModel + ?Sized,
{
    retriever: Retriever<E, I>,
    prompts: PromptBuilder,
    model: Arc<L>,
    classifier: Classifier,
}

impl<E, I, L> Copilot<E, I, L>
where
    E: Embedder + ?Sized,
    I: VectorIndex + ?Sized,
    L: LanguageModel + ?Sized,
{
    #[must_use]
    pub fn new(retriever: Retriever<E, I>, model: Arc<L>) -> Self {
        Self {
            retriever,
            prompts: PromptBuilder::default(),
            model,
            classifier: Classifier::default(),
        }
    }

    /// Replace the classifier, e.g. with a newer synonym table.
    #[must_use]
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Answer a delay question using the `k` most similar records.
    pub fn ask(&self, query: &str, k: usize) -> Result<Answer> {
        validate_query(query)?;

        let passages = self.retriever.retrieve(query, k)?;
        let prompt = self.prompts.build(query, &passages);
        debug!(passages = passages.len(), prompt_chars = prompt.len(), "built prompt");

        let response = self.model.generate(&prompt)?;
        if response.trim().is_empty() {
            return Err(Error::GenerationUnavailable(format!(
                "{} returned an empty response",
                self.model.model_name()
            )));
        }

        let classification = self.classifier.classify(&response);
        if !classification.detected {
            warn!(
                table_version = self.classifier.table().version,
                "response did not open with a known category, falling back to Unknown"
            );
        }

        Ok(Answer {
            category: classification.category,
            explanation: classification.explanation,
            passages,
            response,
        })
    }

    #[must_use]
    pub fn retriever(&self) -> &Retriever<E, I> {
        &self.retriever
    }

    #[must_use]
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }
}
