//! Semantic store abstraction and the in-memory implementation.

use crate::corpus::CorpusChunk;
use crate::embeddings::EmbeddingProvider;
use crate::types::ReviewMetadata;
use async_trait::async_trait;
use carqa_core::AppResult;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One candidate returned by a store query.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreHit {
    pub id: String,
    pub content: String,

    /// Source tag of the chunk
    pub source: String,

    /// Lower is more similar, never negative
    pub distance: f32,

    pub review: Option<ReviewMetadata>,
}

/// Similarity search over corpus chunks.
#[async_trait]
pub trait SemanticStore: Send + Sync {
    /// Up to `k` nearest chunks to `text`, ascending by distance.
    ///
    /// With `source_filter`, only chunks whose source tag equals it exactly
    /// are considered.
    async fn query(
        &self,
        text: &str,
        k: usize,
        source_filter: Option<&str>,
    ) -> AppResult<Vec<StoreHit>>;
}

/// Cosine distance `1 - cos(a, b)`, clamped at zero.
///
/// A zero vector is maximally distant from everything.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    (1.0 - dot / (norm_a * norm_b)).max(0.0)
}

#[derive(Debug)]
struct StoreEntry {
    chunk: CorpusChunk,
    embedding: Vec<f32>,
}

/// Corpus chunks embedded once at startup and searched by brute force.
#[derive(Debug)]
pub struct MemoryStore {
    entries: Vec<StoreEntry>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl MemoryStore {
    /// Embed `chunks` in batches of `batch_size` and build the store.
    pub async fn build(
        chunks: Vec<CorpusChunk>,
        embedder: Arc<dyn EmbeddingProvider>,
        batch_size: usize,
    ) -> AppResult<Self> {
        tracing::info!(
            "Embedding {} chunks with {} ({})",
            chunks.len(),
            embedder.provider_name(),
            embedder.model_name()
        );

        let mut entries = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(batch_size.max(1)) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embeddings = embedder.embed_batch(&texts).await?;

            entries.extend(
                batch
                    .iter()
                    .cloned()
                    .zip(embeddings)
                    .map(|(chunk, embedding)| StoreEntry { chunk, embedding }),
            );
        }

        Ok(Self { entries, embedder })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Chunk count per source tag.
    pub fn source_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.chunk.source.clone()).or_insert(0) += 1;
        }
        counts
    }
}

#[async_trait]
impl SemanticStore for MemoryStore {
    async fn query(
        &self,
        text: &str,
        k: usize,
        source_filter: Option<&str>,
    ) -> AppResult<Vec<StoreHit>> {
        let query_embedding = self.embedder.embed(text).await?;

        let mut scored: Vec<(&StoreEntry, f32)> = self
            .entries
            .iter()
            .filter(|entry| source_filter.map_or(true, |tag| entry.chunk.source == tag))
            .map(|entry| (entry, cosine_distance(&query_embedding, &entry.embedding)))
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);

        tracing::debug!(
            "Store query '{}' ({:?}) matched {} chunks",
            text,
            source_filter,
            scored.len()
        );

        Ok(scored
            .into_iter()
            .map(|(entry, distance)| StoreHit {
                id: entry.chunk.id.clone(),
                content: entry.chunk.content.clone(),
                source: entry.chunk.source.clone(),
                distance,
                review: entry.chunk.review.clone(),
            })
            .collect())
    }
}
