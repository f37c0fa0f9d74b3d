//! Grounded product question answering.
//!
//! Answers questions about one product from two evidence collections:
//! official facts and external reviews. Sensitive questions are refused,
//! facts are preferred, and reviews are a fallback for subjective questions.
//!
//! The model and the semantic store are injected as trait objects, so the
//! pipeline runs unchanged against a live LLM and an in-memory store, or
//! against scripted collaborators in tests.

pub mod config;
pub mod corpus;
pub mod embeddings;
pub mod rag;
pub mod rules;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::KnowledgeConfig;
pub use corpus::{load_corpus, CorpusChunk};
pub use rag::{AnswerResult, AnswerStatus, Citation, CitationType, Pipeline, ProbeOutcome};
pub use rules::{KeywordCategory, KeywordRule, KeywordTable};
pub use store::{MemoryStore, SemanticStore, StoreHit};
pub use types::{DocumentSource, RetrievedDocument, ReviewMetadata, SearchStrategy};

use carqa_core::AppResult;
use std::path::Path;
use std::sync::Arc;

/// Load the corpus configured for `workspace` into a memory store.
pub async fn build_memory_store(workspace: &Path, config: &KnowledgeConfig) -> AppResult<MemoryStore> {
    let corpus_dir = config.corpus_dir(workspace);
    let chunks = load_corpus(&corpus_dir)?;

    for tag in [&config.sources.facts, &config.sources.external] {
        if !chunks.iter().any(|chunk| &chunk.source == tag) {
            tracing::warn!("Corpus at {:?} has no chunks for source '{}'", corpus_dir, tag);
        }
    }

    let embedder = embeddings::create_provider(&config.embedding).await?;
    let store = MemoryStore::build(chunks, embedder, config.embedding.batch_size).await?;

    tracing::info!("Memory store ready with {} chunks", store.len());
    Ok(store)
}

/// Shared handle type used by servers.
pub type SharedPipeline = Arc<Pipeline>;
