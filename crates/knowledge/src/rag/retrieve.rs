//! Multi-query retrieval.

use crate::config::{RetrievalConfig, SourceTags};
use crate::store::{SemanticStore, StoreHit};
use crate::types::{DocumentSource, RetrievedDocument};
use futures::future::join_all;
use std::collections::HashMap;

/// Run every search term against one domain and merge the results.
///
/// Terms are queried concurrently; a failing term is logged and skipped.
/// The merge happens in term order, so the result does not depend on which
/// request finishes first.
pub async fn retrieve(
    store: &dyn SemanticStore,
    queries: &[String],
    source: DocumentSource,
    tags: &SourceTags,
    limits: &RetrievalConfig,
) -> Vec<RetrievedDocument> {
    let tag = tags.tag(source);

    let results = join_all(
        queries
            .iter()
            .map(|query| store.query(query, limits.per_query, Some(tag))),
    )
    .await;

    let mut candidates = Vec::new();
    for (query, result) in queries.iter().zip(results) {
        match result {
            Ok(hits) => {
                tracing::debug!("Query '{}' returned {} {} hits", query, hits.len(), source);
                candidates.extend(hits.into_iter().map(|hit| to_document(hit, source)));
            }
            Err(e) => {
                tracing::warn!("Query '{}' failed, skipping: {}", query, e);
            }
        }
    }

    let merged = merge_candidates(candidates, limits.max_results);
    tracing::info!(
        "Retrieved {} {} documents from {} queries",
        merged.len(),
        source,
        queries.len()
    );
    merged
}

fn to_document(hit: StoreHit, source: DocumentSource) -> RetrievedDocument {
    RetrievedDocument::new(hit.id, hit.content, source, hit.distance)
        .with_review_metadata(hit.review)
}

/// Deduplicate by `doc_id`, keeping the lowest distance, then return the
/// `limit` closest documents.
///
/// On equal distances the earlier candidate wins, both when deduplicating
/// and when ordering.
pub fn merge_candidates(
    candidates: Vec<RetrievedDocument>,
    limit: usize,
) -> Vec<RetrievedDocument> {
    let mut merged: Vec<RetrievedDocument> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for doc in candidates {
        match positions.get(&doc.doc_id) {
            Some(&i) => {
                if doc.distance < merged[i].distance {
                    merged[i] = doc;
                }
            }
            None => {
                positions.insert(doc.doc_id.clone(), merged.len());
                merged.push(doc);
            }
        }
    }

    merged.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    merged.truncate(limit);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, distance: f32) -> RetrievedDocument {
        RetrievedDocument::new(id, format!("content of {}", id), DocumentSource::Facts, distance)
    }

    #[test]
    fn test_duplicate_keeps_lowest_distance() {
        let merged = merge_candidates(vec![doc("a", 0.5), doc("a", 0.2)], 5);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].distance, 0.2);
    }

    #[test]
    fn test_sorted_and_capped() {
        let candidates = vec![
            doc("a", 0.9),
            doc("b", 0.1),
            doc("c", 0.5),
            doc("d", 0.3),
            doc("e", 0.7),
            doc("f", 0.2),
            doc("b", 0.05),
        ];

        let merged = merge_candidates(candidates, 5);
        let ids: Vec<&str> = merged.iter().map(|d| d.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "f", "d", "c", "e"]);
        assert!(merged.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_ties_keep_first_seen() {
        let mut first = doc("a", 0.4);
        first.content = "first".to_string();
        let mut second = doc("a", 0.4);
        second.content = "second".to_string();

        let merged = merge_candidates(vec![doc("z", 0.4), first, second], 5);
        assert_eq!(merged[0].doc_id, "z");
        assert_eq!(merged[1].content, "first");
    }

    #[test]
    fn test_empty_input() {
        assert!(merge_candidates(Vec::new(), 5).is_empty());
    }
}
