//! Context assembly under a character budget.

use crate::config::{ContextConfig, SourceTags};
use crate::types::RetrievedDocument;

/// Evidence text for the answer prompt and the documents it contains.
#[derive(Debug, Clone, Default)]
pub struct AssembledContext {
    pub text: String,
    pub documents: Vec<RetrievedDocument>,
}

/// Build the context from documents in rank order.
///
/// Each document is cut to `max_document_chars` (plus "...") and formatted
/// as a block. Blocks are added while the running total stays within
/// `budget_chars`; the first block that does not fit ends assembly.
/// Lengths count characters, not bytes.
pub fn assemble_context(
    documents: &[RetrievedDocument],
    tags: &SourceTags,
    limits: &ContextConfig,
) -> AssembledContext {
    let mut blocks = Vec::new();
    let mut used = Vec::new();
    let mut total = 0usize;

    for doc in documents {
        let content = truncate_chars(&doc.content, limits.max_document_chars);
        let block = format!(
            "Document {} (Source: {}):\n{}\n",
            doc.doc_id,
            tags.tag(doc.source),
            content
        );

        let length = block.chars().count();
        if total + length > limits.budget_chars {
            tracing::debug!(
                "Context budget reached at {} ({} + {} > {})",
                doc.doc_id,
                total,
                length,
                limits.budget_chars
            );
            break;
        }

        total += length;
        blocks.push(block);
        used.push(doc.clone());
    }

    AssembledContext {
        text: blocks.join("\n"),
        documents: used,
    }
}

/// First `max` characters of `text`, with "..." appended when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentSource;

    fn doc(id: &str, content: String) -> RetrievedDocument {
        RetrievedDocument::new(id, content, DocumentSource::Facts, 0.2)
    }

    #[test]
    fn test_block_format() {
        let docs = vec![
            doc("f_0", "Range: 570 km".to_string()),
            doc("f_1", "Battery: 82.5 kWh".to_string()),
        ];

        let context = assemble_context(&docs, &SourceTags::default(), &ContextConfig::default());
        assert_eq!(
            context.text,
            "Document f_0 (Source: byd_seal_facts.md):\nRange: 570 km\n\n\
             Document f_1 (Source: byd_seal_facts.md):\nBattery: 82.5 kWh\n"
        );
        assert_eq!(context.documents.len(), 2);
    }

    #[test]
    fn test_truncates_long_content() {
        let text = "x".repeat(2000);
        let truncated = truncate_chars(&text, 1500);
        assert_eq!(truncated.chars().count(), 1503);
        assert!(truncated.ends_with("x..."));

        assert_eq!(truncate_chars(&"y".repeat(1500), 1500), "y".repeat(1500));
    }

    #[test]
    fn test_truncation_counts_characters() {
        let text = "é".repeat(10);
        assert_eq!(truncate_chars(&text, 4), "éééé...");
    }

    #[test]
    fn test_document_over_budget_is_excluded_whole() {
        // Each block is 1546 characters, so only three fit in 6000
        let docs: Vec<RetrievedDocument> = (0..5)
            .map(|i| doc(&format!("f_{}", i), "z".repeat(1600)))
            .collect();

        let context = assemble_context(&docs, &SourceTags::default(), &ContextConfig::default());

        assert_eq!(context.documents.len(), 3);
        assert!(context.text.chars().count() <= 6000 + 2);
        assert!(!context.text.contains("Document f_3"));
        assert!(context.text.ends_with("...\n"));
    }

    #[test]
    fn test_stops_at_first_document_that_does_not_fit() {
        let limits = ContextConfig {
            budget_chars: 120,
            max_document_chars: 1500,
        };
        let docs = vec![
            doc("a", "short".to_string()),
            doc("b", "w".repeat(200)),
            doc("c", "tiny".to_string()),
        ];

        let context = assemble_context(&docs, &SourceTags::default(), &limits);
        let ids: Vec<&str> = context.documents.iter().map(|d| d.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn test_no_documents() {
        let context = assemble_context(&[], &SourceTags::default(), &ContextConfig::default());
        assert!(context.text.is_empty());
        assert!(context.documents.is_empty());
    }
}
