//! Domain types shared by the store, corpus loader and answering pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a question may be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Commercially sensitive, never answered
    Refuse,
    /// Answer from official facts only
    FactsOnly,
    /// Facts first, external reviews as a fallback
    ExternalSafe,
}

impl SearchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStrategy::Refuse => "refuse",
            SearchStrategy::FactsOnly => "facts_only",
            SearchStrategy::ExternalSafe => "external_safe",
        }
    }

    /// Read a strategy out of free-form model output.
    ///
    /// Substrings are checked case-insensitively in the order
    /// "refuse", "facts", "external".
    pub fn from_reply(reply: &str) -> Option<Self> {
        let reply = reply.trim().to_lowercase();
        if reply.contains("refuse") {
            Some(SearchStrategy::Refuse)
        } else if reply.contains("facts") {
            Some(SearchStrategy::FactsOnly)
        } else if reply.contains("external") {
            Some(SearchStrategy::ExternalSafe)
        } else {
            None
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two evidence collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSource {
    Facts,
    External,
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSource::Facts => f.write_str("facts"),
            DocumentSource::External => f.write_str("external"),
        }
    }
}

/// Structured metadata of a review video, attached at corpus load time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribers: Option<String>,
}

impl ReviewMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.channel.is_none()
            && self.views.is_none()
            && self.subscribers.is_none()
    }
}

/// A chunk returned by retrieval.
///
/// `doc_id` and `chunk_id` always carry the same value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub content: String,
    pub source: DocumentSource,
    pub doc_id: String,
    pub chunk_id: String,

    /// Store distance, lower is a stronger match
    pub distance: f32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_metadata: Option<ReviewMetadata>,
}

impl RetrievedDocument {
    pub fn new(
        doc_id: impl Into<String>,
        content: impl Into<String>,
        source: DocumentSource,
        distance: f32,
    ) -> Self {
        let doc_id = doc_id.into();
        Self {
            content: content.into(),
            source,
            chunk_id: doc_id.clone(),
            doc_id,
            distance: distance.max(0.0),
            review_metadata: None,
        }
    }

    pub fn with_review_metadata(mut self, metadata: Option<ReviewMetadata>) -> Self {
        self.review_metadata = metadata;
        self
    }
}
