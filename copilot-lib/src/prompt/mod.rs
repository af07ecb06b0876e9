//! Prompt assembly
//!
//! The prompt carries a fixed output contract: the answer must open with one
//! category token, exactly as spelled in [`Category::as_str`], so the
//! [`Classifier`](crate::classify::Classifier) can read it back.
//!
//! Layout:
//!
//! ```text
//! <instructions>
//!
//! Context:
//! 1. <passage>
//! 2. <passage>
//!
//! Question: <query>
//! Answer (2-3 sentences):
//! ```

use crate::classify::Category;
use crate::retrieve::RankedPassage;

/// Builds prompts deterministically from a query and its passages.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    instructions: String,
}

impl PromptBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            instructions: default_instructions(),
        }
    }

    /// The fixed instruction block placed at the top of every prompt.
    #[must_use]
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    #[must_use]
    pub fn build(&self, query: &str, passages: &[RankedPassage]) -> String {
        format!(
            "{}\n\nContext:\n{}\n\nQuestion: {query}\nAnswer (2-3 sentences):",
            self.instructions,
            context_block(passages),
        )
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One `"<rank>. <text>"` line per passage, in the given order.
#[must_use]
pub fn context_block(passages: &[RankedPassage]) -> String {
    passages
        .iter()
        .map(|p| format!("{}. {}", p.rank, p.text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn default_instructions() -> String {
    let tokens: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();

    format!(
        "You are Fulfillment-Copilot, an expert logistics assistant that explains shipment delays. \
         Begin your answer with exactly ONE word, spelled exactly as one of: {}. \
         That word must be the first word of the response, followed by a brief explanation. \
         If no context passage supports any category, the first word must be exactly '{}'. \
         Use ONLY the context below and no outside knowledge.",
        tokens.join(", "),
        Category::Unknown,
    )
}
