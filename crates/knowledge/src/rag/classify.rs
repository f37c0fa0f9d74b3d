//! Strategy classification.

use crate::rag::model::ModelHandle;
use crate::rules::{KeywordCategory, KeywordTable};
use crate::types::SearchStrategy;
use carqa_prompt::PromptLibrary;

/// Raw result of asking the model for a strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// The reply named a strategy
    Recognized(SearchStrategy),
    /// The model answered with something else
    Unrecognized(String),
    /// Rendering or the model call failed
    Failed(String),
}

impl ProbeOutcome {
    /// The strategy to act on; anything but a recognized reply is `FactsOnly`.
    pub fn strategy(&self) -> SearchStrategy {
        match self {
            ProbeOutcome::Recognized(strategy) => *strategy,
            _ => SearchStrategy::FactsOnly,
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, ProbeOutcome::Recognized(_))
    }
}

/// Ask the model which strategy applies to `question`.
pub async fn probe(
    model: &ModelHandle,
    prompts: &PromptLibrary,
    keywords: &KeywordTable,
    question: &str,
) -> ProbeOutcome {
    let refuse_topics = keywords.topic_list(KeywordCategory::Sensitive);
    let facts_topics = keywords.topic_list(KeywordCategory::Specification);
    let external_topics = keywords.topic_list(KeywordCategory::Experience);

    let built = match prompts.render(
        &prompts.classify,
        &[
            ("question", question),
            ("refuse_topics", &refuse_topics),
            ("facts_topics", &facts_topics),
            ("external_topics", &external_topics),
        ],
    ) {
        Ok(built) => built,
        Err(e) => return ProbeOutcome::Failed(e.to_string()),
    };

    match model.complete(&built).await {
        Ok(reply) => match SearchStrategy::from_reply(&reply) {
            Some(strategy) => ProbeOutcome::Recognized(strategy),
            None => ProbeOutcome::Unrecognized(reply),
        },
        Err(e) => ProbeOutcome::Failed(e.to_string()),
    }
}

/// Classify `question`, defaulting to `FactsOnly` when the model fails or
/// gives an unusable answer.
pub async fn classify(
    model: &ModelHandle,
    prompts: &PromptLibrary,
    keywords: &KeywordTable,
    question: &str,
) -> SearchStrategy {
    let outcome = probe(model, prompts, keywords, question).await;

    match &outcome {
        ProbeOutcome::Recognized(strategy) => {
            tracing::debug!("Classifier chose {}", strategy);
        }
        ProbeOutcome::Unrecognized(reply) => {
            tracing::warn!("Unrecognized classifier reply {:?}, using facts_only", reply);
        }
        ProbeOutcome::Failed(e) => {
            tracing::warn!("Classifier failed ({}), using facts_only", e);
        }
    }

    outcome.strategy()
}

#[cfg(test)]
mod tests {
    use super::*;
    use carqa_llm::ScriptedClient;
    use std::sync::Arc;

    async fn run(client: ScriptedClient, question: &str) -> SearchStrategy {
        let model = ModelHandle::new(Arc::new(client), "test-model");
        let prompts = PromptLibrary::builtin().unwrap();
        classify(&model, &prompts, &KeywordTable::default(), question).await
    }

    #[tokio::test]
    async fn test_recognized_reply() {
        let client = ScriptedClient::new().otherwise("Refuse");
        assert_eq!(run(client, "How much is it?").await, SearchStrategy::Refuse);

        let client = ScriptedClient::new().otherwise("external_safe");
        assert_eq!(
            run(client, "Do people like it?").await,
            SearchStrategy::ExternalSafe
        );
    }

    #[tokio::test]
    async fn test_model_failure_defaults_to_facts() {
        let client = ScriptedClient::new().fail_on("search strategy", "timeout");
        assert_eq!(run(client, "Anything").await, SearchStrategy::FactsOnly);
    }

    #[tokio::test]
    async fn test_unrecognized_reply_defaults_to_facts() {
        let client = ScriptedClient::new().otherwise("I am not sure");
        assert_eq!(run(client, "Anything").await, SearchStrategy::FactsOnly);
    }

    #[tokio::test]
    async fn test_request_settings_and_topics() {
        let client = Arc::new(ScriptedClient::new().otherwise("facts_only"));
        let model = ModelHandle::new(client.clone(), "test-model");
        let prompts = PromptLibrary::builtin().unwrap();

        classify(&model, &prompts, &KeywordTable::default(), "Range?").await;

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].max_tokens, Some(50));
        assert_eq!(calls[0].temperature, Some(0.1));
        assert!(calls[0].prompt.contains("pricing, cost, price"));
        assert!(calls[0].prompt.contains("\"Range?\""));
    }

    #[tokio::test]
    async fn test_probe_reports_raw_outcome() {
        let model = ModelHandle::new(Arc::new(ScriptedClient::new().otherwise("pong")), "m");
        let prompts = PromptLibrary::builtin().unwrap();

        let outcome = probe(&model, &prompts, &KeywordTable::default(), "ping").await;
        assert_eq!(outcome, ProbeOutcome::Unrecognized("pong".to_string()));
        assert!(!outcome.is_recognized());
    }
}
