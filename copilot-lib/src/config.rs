//! Runtime settings
//!
//! Defaults match the artifacts produced by the indexing step and the chat
//! model the prompt contract was tuned against. The CLI overrides any field
//! from flags or environment variables.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_INDEX_PATH: &str = "data/index/shipments.json";
pub const DEFAULT_RECORDS_PATH: &str = "data/index/records.json";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_CHAT_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_EVAL_TOP_K: usize = 3;

/// Settings for loading artifacts and reaching the language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Persisted vector index
    pub index_path: PathBuf,
    /// Persisted record store, positionally aligned with the index
    pub records_path: PathBuf,
    /// Chat model identifier
    pub chat_model: String,
    /// Base URL of an OpenAI-compatible API
    pub chat_endpoint: String,
    pub temperature: f32,
    /// Per-request timeout for the chat call, in seconds
    pub timeout_secs: u64,
    pub top_k: usize,
}

impl Settings {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from(DEFAULT_INDEX_PATH),
            records_path: PathBuf::from(DEFAULT_RECORDS_PATH),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            chat_endpoint: DEFAULT_CHAT_ENDPOINT.to_string(),
            temperature: 0.2,
            timeout_secs: 30,
            top_k: DEFAULT_TOP_K,
        }
    }
}
