//! Search term planning.
//!
//! The model proposes short search terms for one evidence domain. When it
//! fails, or proposes nothing usable, terms are cut from the question itself.

use crate::config::KnowledgeConfig;
use crate::rag::model::ModelHandle;
use crate::types::DocumentSource;
use carqa_prompt::PromptLibrary;

/// Most search terms kept from a planner reply.
pub const MAX_QUERIES: usize = 7;

/// Search terms must be longer than this many characters.
const MIN_QUERY_CHARS: usize = 2;

/// Fallback keywords must be longer than this many characters.
const FALLBACK_MIN_TOKEN_CHARS: usize = 3;

const FALLBACK_MAX_QUERIES: usize = 5;

/// Search terms for `question` in the `source` domain.
pub async fn plan_queries(
    model: &ModelHandle,
    prompts: &PromptLibrary,
    config: &KnowledgeConfig,
    source: DocumentSource,
    question: &str,
) -> Vec<String> {
    let definition = match source {
        DocumentSource::Facts => &prompts.plan_facts,
        DocumentSource::External => &prompts.plan_external,
    };

    let reply = match prompts.render(
        definition,
        &[("question", question), ("product", &config.product)],
    ) {
        Ok(built) => model.complete(&built).await,
        Err(e) => Err(e),
    };

    let queries = match reply {
        Ok(text) => {
            let strip: &[String] = match source {
                DocumentSource::Facts => &config.product_terms,
                DocumentSource::External => &[],
            };
            parse_planner_reply(&text, strip)
        }
        Err(e) => {
            tracing::warn!("{} planner failed ({}), using question keywords", source, e);
            return fallback_queries(question);
        }
    };

    if queries.is_empty() {
        tracing::warn!("{} planner returned no usable terms, using question keywords", source);
        return fallback_queries(question);
    }

    tracing::debug!("{} search terms: {:?}", source, queries);
    queries
}

/// Turn a one-term-per-line reply into search terms.
///
/// List markers and wrapping quotes are dropped, `strip_terms` are removed as
/// whole words, and terms of two characters or fewer are discarded.
pub fn parse_planner_reply(reply: &str, strip_terms: &[String]) -> Vec<String> {
    reply
        .lines()
        .map(clean_line)
        .map(|line| strip_product_terms(&line, strip_terms))
        .filter(|query| query.chars().count() > MIN_QUERY_CHARS)
        .take(MAX_QUERIES)
        .collect()
}

fn clean_line(line: &str) -> String {
    let mut line = line.trim();

    if let Some(rest) = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
    {
        line = rest;
    } else {
        let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits > 0 {
            let rest = &line[digits..];
            if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
                line = rest;
            }
        }
    }

    let line = line.trim().trim_matches(|c| c == '"' || c == '“' || c == '”');
    let line = match line.strip_prefix('\'').and_then(|l| l.strip_suffix('\'')) {
        Some(inner) => inner,
        None => line,
    };

    line.trim().to_string()
}

/// Remove product name tokens (whole words, any case) from a search term.
pub fn strip_product_terms(query: &str, terms: &[String]) -> String {
    if terms.is_empty() {
        return query.trim().to_string();
    }

    let mut patterns: Vec<Vec<String>> = terms
        .iter()
        .map(|t| t.split_whitespace().map(str::to_lowercase).collect::<Vec<_>>())
        .filter(|words| !words.is_empty())
        .collect();
    // Longest phrases first so "byd seal" goes before "byd"
    patterns.sort_by(|a, b| b.len().cmp(&a.len()));

    let words: Vec<&str> = query.split_whitespace().collect();
    let normalized: Vec<String> = words
        .iter()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .collect();

    let mut kept = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        let matched = patterns.iter().find(|pattern| {
            normalized.get(i..i + pattern.len()) == Some(pattern.as_slice())
        });

        match matched {
            Some(pattern) => i += pattern.len(),
            None => {
                kept.push(words[i]);
                i += 1;
            }
        }
    }

    kept.join(" ")
}

/// Keywords from the question: lowercase word tokens longer than three
/// characters, at most five.
pub fn fallback_queries(question: &str) -> Vec<String> {
    question
        .to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() > FALLBACK_MIN_TOKEN_CHARS)
        .take(FALLBACK_MAX_QUERIES)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use carqa_llm::ScriptedClient;
    use std::sync::Arc;

    fn product_terms() -> Vec<String> {
        KnowledgeConfig::default().product_terms
    }

    #[test]
    fn test_fallback_queries() {
        assert_eq!(
            fallback_queries("What is the battery capacity of the BYD Seal?"),
            vec!["what", "battery", "capacity", "seal"]
        );
        assert_eq!(
            fallback_queries("How does the seal_u handle cornering, braking, charging and towing?"),
            vec!["does", "seal_u", "handle", "cornering", "braking"]
        );
        assert!(fallback_queries("Is it ok?").is_empty());
    }

    #[test]
    fn test_parse_reply_cleans_lines() {
        let reply = "1. battery capacity\n- \"kWh\"\n* energy storage\n\nab\n  driving range  ";
        assert_eq!(
            parse_planner_reply(reply, &[]),
            vec!["battery capacity", "kWh", "energy storage", "driving range"]
        );
    }

    #[test]
    fn test_parse_reply_caps_at_seven() {
        let reply = (1..=10).map(|i| format!("term {}", i)).collect::<Vec<_>>().join("\n");
        assert_eq!(parse_planner_reply(&reply, &[]).len(), MAX_QUERIES);
    }

    #[test]
    fn test_strip_product_terms() {
        let terms = product_terms();
        assert_eq!(strip_product_terms("BYD Seal battery", &terms), "battery");
        assert_eq!(strip_product_terms("range of the byd", &terms), "range of the");
        assert_eq!(strip_product_terms("Seal, trim levels", &terms), "trim levels");
        // Whole words only
        assert_eq!(strip_product_terms("sealant bydx", &terms), "sealant bydx");
    }

    #[test]
    fn test_product_only_lines_are_dropped() {
        let reply = "BYD Seal\nSeal range\nbyd";
        assert_eq!(parse_planner_reply(reply, &product_terms()), vec!["range"]);
    }

    #[tokio::test]
    async fn test_plan_facts_strips_and_sets_request() {
        let client = Arc::new(ScriptedClient::new().on(
            "facts database",
            "BYD Seal battery capacity\nkWh\nbattery size",
        ));
        let model = ModelHandle::new(client.clone(), "m");
        let prompts = PromptLibrary::builtin().unwrap();
        let config = KnowledgeConfig::default();

        let queries = plan_queries(
            &model,
            &prompts,
            &config,
            DocumentSource::Facts,
            "What is the BYD Seal battery capacity?",
        )
        .await;

        assert_eq!(queries, vec!["battery capacity", "kWh", "battery size"]);
        let calls = client.calls();
        assert_eq!(calls[0].max_tokens, Some(200));
        assert_eq!(calls[0].temperature, Some(0.3));
    }

    #[tokio::test]
    async fn test_plan_external_keeps_product_words() {
        let client = ScriptedClient::new().on("relevant reviews and opinions", "Seal interior\ncabin");
        let model = ModelHandle::new(Arc::new(client), "m");
        let prompts = PromptLibrary::builtin().unwrap();

        let queries = plan_queries(
            &model,
            &prompts,
            &KnowledgeConfig::default(),
            DocumentSource::External,
            "What about the interior?",
        )
        .await;

        assert_eq!(queries, vec!["Seal interior", "cabin"]);
    }

    #[tokio::test]
    async fn test_plan_falls_back_on_failure() {
        let model = ModelHandle::new(Arc::new(ScriptedClient::new()), "m");
        let prompts = PromptLibrary::builtin().unwrap();

        let queries = plan_queries(
            &model,
            &prompts,
            &KnowledgeConfig::default(),
            DocumentSource::Facts,
            "What is the towing capacity?",
        )
        .await;

        assert_eq!(queries, vec!["what", "towing", "capacity"]);
    }

    #[tokio::test]
    async fn test_plan_falls_back_on_empty_reply() {
        let model = ModelHandle::new(Arc::new(ScriptedClient::new().otherwise("ok\n\n")), "m");
        let prompts = PromptLibrary::builtin().unwrap();

        let queries = plan_queries(
            &model,
            &prompts,
            &KnowledgeConfig::default(),
            DocumentSource::External,
            "Comfort on long trips?",
        )
        .await;

        assert_eq!(queries, vec!["comfort", "long", "trips"]);
    }
}
