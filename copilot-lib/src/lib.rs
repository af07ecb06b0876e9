//! Fulfillment Copilot - explains shipment delays from historical records
//!
//! # Architecture
//!
//! ```text
//! Query -> Embedder -> VectorIndex -> RecordStore
//!                                          |
//!                     RankedPassages <-----+
//!                           |
//!                     PromptBuilder -> LanguageModel -> Classifier -> Answer
//! ```
//!
//! The index and record store are built by an external indexing step and
//! loaded once; everything here reads them without mutation.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use copilot_lib::{
//!     embed::MiniLmEmbedder, generate::OpenAiChat, index::FlatIndex,
//!     pipeline::Copilot, retrieve::Retriever, store::RecordStore,
//! };
//!
//! let retriever = Retriever::new(
//!     Arc::new(MiniLmEmbedder::new()?),
//!     Arc::new(FlatIndex::load("data/index/shipments.json")?),
//!     Arc::new(RecordStore::load("data/index/records.json")?),
//! )?;
//! let copilot = Copilot::new(retriever, Arc::new(OpenAiChat::new(key, "gpt-4o-mini", endpoint, timeout)?));
//!
//! let answer = copilot.ask("Why was my shipment delayed?", 5)?;
//! println!("{}: {}", answer.category, answer.explanation);
//! ```

pub mod classify;
pub mod config;
pub mod embed;
pub mod error;
pub mod eval;
pub mod generate;
pub mod index;
pub mod pipeline;
pub mod prompt;
pub mod retrieve;
pub mod store;

pub use error::{Error, Result};
