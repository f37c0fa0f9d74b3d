//! Cross-module tests for the answering pipeline.


use crate::config::KnowledgeConfig;
use crate::rag::Pipeline;
use crate::store::{SemanticStore, StoreHit};
use crate::types::ReviewMetadata;
use async_trait::async_trait;
use carqa_core::{AppError, AppResult};
use carqa_llm::ScriptedClient;
use carqa_prompt::PromptLibrary;
use std::sync::{Arc, Mutex};

pub(crate) const FACTS: &str = "byd_seal_facts.md";
pub(crate) const EXTERNAL: &str = "byd_seal_external.json";

/// Prompt fragments that identify each pipeline call.
pub(crate) const CLASSIFY_MARKER: &str = "Determine the appropriate search strategy";
pub(crate) const FACTS_PLAN_MARKER: &str = "facts database";
pub(crate) const EXTERNAL_PLAN_MARKER: &str = "relevant reviews and opinions";
pub(crate) const ANSWER_MARKER: &str = "CRITICAL RULES";

/// Store returning fixed hits, whatever the query text.
///
/// Hits are filtered by source tag and ordered by distance like a real
/// store. Queries listed in `failing` return an error, and `panicking`
/// makes every query panic.
#[derive(Default)]
pub(crate) struct StaticStore {
    hits: Vec<StoreHit>,
    failing: Vec<String>,
    panicking: bool,
    queries: Mutex<Vec<(String, Option<String>)>>,
}

impl StaticStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn hit(mut self, id: &str, source: &str, distance: f32, content: &str) -> Self {
        self.hits.push(StoreHit {
            id: id.to_string(),
            content: content.to_string(),
            source: source.to_string(),
            distance,
            review: None,
        });
        self
    }

    pub(crate) fn review(
        mut self,
        id: &str,
        distance: f32,
        content: &str,
        channel: &str,
    ) -> Self {
        self.hits.push(StoreHit {
            id: id.to_string(),
            content: content.to_string(),
            source: EXTERNAL.to_string(),
            distance,
            review: Some(ReviewMetadata {
                title: Some(format!("{} review", channel)),
                channel: Some(channel.to_string()),
                views: None,
                subscribers: None,
            }),
        });
        self
    }

    pub(crate) fn failing(mut self, query: &str) -> Self {
        self.failing.push(query.to_string());
        self
    }

    pub(crate) fn panicking(mut self) -> Self {
        self.panicking = true;
        self
    }

    /// `(query, source filter)` pairs in call order.
    pub(crate) fn queries(&self) -> Vec<(String, Option<String>)> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SemanticStore for StaticStore {
    async fn query(
        &self,
        text: &str,
        k: usize,
        source_filter: Option<&str>,
    ) -> AppResult<Vec<StoreHit>> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push((text.to_string(), source_filter.map(str::to_string)));
        }

        if self.panicking {
            panic!("store index corrupted");
        }

        if self.failing.iter().any(|q| q == text) {
            return Err(AppError::Store(format!("query '{}' timed out", text)));
        }

        let mut hits: Vec<StoreHit> = self
            .hits
            .iter()
            .filter(|hit| source_filter.map_or(true, |tag| hit.source == tag))
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        Ok(hits)
    }
}

pub(crate) fn pipeline(client: Arc<ScriptedClient>, store: Arc<StaticStore>) -> Pipeline {
    Pipeline::new(
        client,
        "test-model",
        store,
        PromptLibrary::builtin().expect("built-in prompts"),
        KnowledgeConfig::default(),
    )
}
