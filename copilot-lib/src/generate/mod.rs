//! Language model access
//!
//! The model is a black box: a prompt goes in, the full response text comes
//! back. No streaming; the classifier needs the complete answer.

use crate::Result;

/// Trait for generative models
pub trait LanguageModel: Send + Sync {
    /// Generate a complete response for `prompt`
    ///
    /// Fails with [`Error::GenerationUnavailable`](crate::Error::GenerationUnavailable)
    /// when the call fails or yields no usable text.
    fn generate(&self, prompt: &str) -> Result<String>;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

mod openai;
pub use openai::*;
