//! Question answering orchestration.
//!
//! Facts are always searched first. Reviews are only consulted when the
//! question was classified `external_safe` and the facts did not produce an
//! adequate answer.

use crate::config::KnowledgeConfig;
use crate::rag::adequacy::is_adequate;
use crate::rag::citations::build_citations;
use crate::rag::classify::{classify, probe, ProbeOutcome};
use crate::rag::generate::generate_answer;
use crate::rag::model::ModelHandle;
use crate::rag::plan::plan_queries;
use crate::rag::retrieve::retrieve;
use crate::rag::types::AnswerResult;
use crate::store::SemanticStore;
use crate::types::{DocumentSource, SearchStrategy};
use carqa_llm::LlmClient;
use carqa_prompt::PromptLibrary;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// The answering pipeline with its collaborators.
///
/// Holds no per-question state; share it behind an `Arc`.
pub struct Pipeline {
    model: ModelHandle,
    store: Arc<dyn SemanticStore>,
    prompts: PromptLibrary,
    config: KnowledgeConfig,
}

impl Pipeline {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
        store: Arc<dyn SemanticStore>,
        prompts: PromptLibrary,
        config: KnowledgeConfig,
    ) -> Self {
        Self {
            model: ModelHandle::new(llm, model),
            store,
            prompts,
            config,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.model()
    }

    pub fn provider_name(&self) -> &str {
        self.model.provider()
    }

    pub fn config(&self) -> &KnowledgeConfig {
        &self.config
    }

    /// Answer a question. Never fails: a panic anywhere in the pipeline is
    /// reported as an `error` result.
    pub async fn ask(&self, question: &str) -> AnswerResult {
        match AssertUnwindSafe(self.run(question)).catch_unwind().await {
            Ok(result) => {
                tracing::info!(
                    "Answered with status {} and {} citations",
                    result.status.as_str(),
                    result.citations.len()
                );
                result
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!("Pipeline aborted: {}", message);
                AnswerResult::error(&message)
            }
        }
    }

    /// Raw classifier outcome for `question`, used for liveness checks.
    pub async fn probe_classifier(&self, question: &str) -> ProbeOutcome {
        probe(&self.model, &self.prompts, &self.config.keywords, question).await
    }

    async fn run(&self, question: &str) -> AnswerResult {
        let strategy = classify(&self.model, &self.prompts, &self.config.keywords, question).await;
        tracing::info!("Search strategy: {}", strategy);

        if strategy == SearchStrategy::Refuse {
            return AnswerResult::refused();
        }

        if let Some(result) = self.answer_from(DocumentSource::Facts, question).await {
            return result;
        }

        if strategy == SearchStrategy::ExternalSafe {
            if let Some(result) = self.answer_from(DocumentSource::External, question).await {
                return result;
            }
        }

        AnswerResult::no_information()
    }

    /// Plan, retrieve, generate and assess within one domain.
    ///
    /// `None` when nothing was retrieved or the answer was not adequate.
    async fn answer_from(&self, source: DocumentSource, question: &str) -> Option<AnswerResult> {
        let queries = plan_queries(&self.model, &self.prompts, &self.config, source, question).await;
        let documents = retrieve(
            self.store.as_ref(),
            &queries,
            source,
            &self.config.sources,
            &self.config.retrieval,
        )
        .await;

        if documents.is_empty() {
            tracing::info!("No {} documents found", source);
            return None;
        }

        let generated = generate_answer(
            &self.model,
            &self.prompts,
            &self.config.sources,
            &self.config.context,
            question,
            &documents,
        )
        .await;

        if !is_adequate(
            question,
            &generated.used,
            &self.config.keywords,
            &self.config.adequacy,
        ) {
            tracing::info!("{} evidence judged inadequate", source);
            return None;
        }

        let citations = build_citations(&generated.used, &self.config.sources, &self.config.citations);
        Some(AnswerResult::answered(generated.answer, citations))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected failure".to_string()
    }
}
