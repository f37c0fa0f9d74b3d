//! Citation selection and review metadata extraction.

use crate::config::{CitationConfig, SourceTags};
use crate::rag::types::{Citation, CitationType};
use crate::types::{DocumentSource, RetrievedDocument, ReviewMetadata};

/// Labels written by the corpus loader, in any order.
const KNOWN_LABELS: &[&str] = &[
    "Title: ",
    "Description: ",
    "Transcript: ",
    "Channel: ",
    "Views: ",
    "Channel Subscribers: ",
    "Video Length: ",
    "Resolution: ",
    "Published: ",
    "brand: ",
    "product: ",
    "region: ",
];

/// Pick and annotate the documents to cite.
///
/// The single closest facts document is cited if any facts were used, and
/// up to `max_external` reviews by ascending distance.
pub fn build_citations(
    used: &[RetrievedDocument],
    tags: &SourceTags,
    config: &CitationConfig,
) -> Vec<Citation> {
    let mut citations = Vec::new();

    if let Some(best) = used
        .iter()
        .filter(|doc| doc.source == DocumentSource::Facts)
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
    {
        citations.push(base_citation(best, tags, CitationType::Facts));
    }

    let mut external: Vec<&RetrievedDocument> = used
        .iter()
        .filter(|doc| doc.source == DocumentSource::External)
        .collect();
    external.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    citations.extend(
        external
            .into_iter()
            .take(config.max_external)
            .map(|doc| review_citation(doc, tags, config)),
    );

    citations
}

fn base_citation(doc: &RetrievedDocument, tags: &SourceTags, kind: CitationType) -> Citation {
    Citation {
        source: tags.tag(doc.source).to_string(),
        doc_id: doc.doc_id.clone(),
        chunk_id: doc.chunk_id.clone(),
        kind,
        title: None,
        channel: None,
        views: None,
        subscribers: None,
    }
}

fn review_citation(doc: &RetrievedDocument, tags: &SourceTags, config: &CitationConfig) -> Citation {
    let metadata = match &doc.review_metadata {
        Some(metadata) => metadata.clone(),
        None => parse_review_metadata(&doc.content),
    };

    Citation {
        title: metadata
            .title
            .map(|t| shorten_title(&t, config.title_max_chars)),
        channel: metadata.channel,
        views: metadata.views,
        subscribers: metadata.subscribers,
        ..base_citation(doc, tags, CitationType::ExternalReview)
    }
}

/// Best-effort extraction of review fields from labelled text.
///
/// A value runs until the next known label or newline; views and
/// subscriber counts also stop at the first whitespace. Missing or empty
/// values are `None`.
pub fn parse_review_metadata(content: &str) -> ReviewMetadata {
    ReviewMetadata {
        title: label_value(content, "Title: ", false),
        channel: label_value(content, "Channel: ", false),
        views: label_value(content, "Views: ", true),
        subscribers: label_value(content, "Channel Subscribers: ", true),
    }
}

fn label_value(content: &str, label: &str, single_word: bool) -> Option<String> {
    let start = content.find(label)? + label.len();
    let rest = &content[start..];

    let mut end = rest.find('\n').unwrap_or(rest.len());
    for other in KNOWN_LABELS {
        let needle = format!(" {}", other);
        if let Some(pos) = rest.find(&needle) {
            end = end.min(pos);
        }
    }

    let mut value = rest[..end].trim();
    if single_word {
        value = value.split_whitespace().next().unwrap_or("");
    }

    (!value.is_empty()).then(|| value.to_string())
}

/// Cut titles longer than `max` characters at the last space before `max`,
/// adding "...". Titles without such a space are cut at `max`.
pub fn shorten_title(title: &str, max: usize) -> String {
    let Some((limit, _)) = title.char_indices().nth(max) else {
        return title.to_string();
    };

    let head = &title[..limit];
    match head.rfind(' ') {
        Some(space) if space > 0 => format!("{}...", &head[..space]),
        _ => format!("{}...", head),
    }
}
