//! Retrieval adequacy assessment.
//!
//! Confidence comes only from store distances: a low average distance and a
//! tight spread both raise it. The constants are heuristics and are kept as
//! configured.

use crate::config::{AdequacyConfig, ScoreProfile};
use crate::rules::{KeywordCategory, KeywordTable};
use crate::types::{DocumentSource, RetrievedDocument};

/// Which kind of evidence backs an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceKind {
    /// Every used document is from the facts domain
    Facts,
    /// At least one used document is a review
    ExternalReviews,
}

impl EvidenceKind {
    pub fn of(documents: &[RetrievedDocument]) -> Self {
        if documents
            .iter()
            .all(|doc| doc.source == DocumentSource::Facts)
        {
            EvidenceKind::Facts
        } else {
            EvidenceKind::ExternalReviews
        }
    }

    fn profile(self, config: &AdequacyConfig) -> &ScoreProfile {
        match self {
            EvidenceKind::Facts => &config.facts,
            EvidenceKind::ExternalReviews => &config.external,
        }
    }
}

/// Confidence in `[0, 1]` from the mean and variance of distances.
pub fn confidence_score(
    documents: &[RetrievedDocument],
    kind: EvidenceKind,
    config: &AdequacyConfig,
) -> f32 {
    if documents.is_empty() {
        return 0.0;
    }

    let count = documents.len() as f32;
    let mean = documents.iter().map(|d| d.distance).sum::<f32>() / count;
    let variance = documents
        .iter()
        .map(|d| (d.distance - mean).powi(2))
        .sum::<f32>()
        / count;

    let profile = kind.profile(config);
    let distance_confidence = (1.0 - mean / profile.distance_scale).max(0.0);
    let consistency_confidence = (1.0 - variance * profile.variance_scale).max(0.0);

    (config.distance_weight * distance_confidence
        + config.consistency_weight * consistency_confidence)
        .min(1.0)
}

/// Whether `score` clears the threshold for `kind` (inclusive).
pub fn meets_threshold(score: f32, kind: EvidenceKind, config: &AdequacyConfig) -> bool {
    score >= kind.profile(config).threshold
}

/// Decide whether the used documents justify presenting the answer.
///
/// Opinion questions are never adequately answered by facts alone.
pub fn is_adequate(
    question: &str,
    documents: &[RetrievedDocument],
    keywords: &KeywordTable,
    config: &AdequacyConfig,
) -> bool {
    if documents.is_empty() {
        return false;
    }

    let kind = EvidenceKind::of(documents);
    if kind == EvidenceKind::Facts && keywords.matches(question, KeywordCategory::Opinion) {
        tracing::debug!("Opinion question backed only by facts");
        return false;
    }

    let score = confidence_score(documents, kind, config);
    let adequate = meets_threshold(score, kind, config);
    tracing::debug!(
        "Confidence {:.3} for {:?} evidence, adequate: {}",
        score,
        kind,
        adequate
    );
    adequate
}
