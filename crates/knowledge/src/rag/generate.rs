//! Grounded answer generation.

use crate::config::{ContextConfig, SourceTags};
use crate::rag::context::assemble_context;
use crate::rag::model::ModelHandle;
use crate::types::RetrievedDocument;
use carqa_core::AppResult;
use carqa_prompt::PromptLibrary;

pub const NO_DOCUMENTS_ANSWER: &str = "I couldn't find any relevant information.";

pub const EMPTY_ANSWER: &str =
    "I couldn't generate a proper answer from the available information.";

/// Generated text plus the documents that made it into the context.
#[derive(Debug, Clone)]
pub struct GeneratedAnswer {
    pub answer: String,
    pub used: Vec<RetrievedDocument>,
}

/// Answer `question` from `documents`. Never fails: model errors become
/// the answer text.
pub async fn generate_answer(
    model: &ModelHandle,
    prompts: &PromptLibrary,
    tags: &SourceTags,
    limits: &ContextConfig,
    question: &str,
    documents: &[RetrievedDocument],
) -> GeneratedAnswer {
    if documents.is_empty() {
        return GeneratedAnswer {
            answer: NO_DOCUMENTS_ANSWER.to_string(),
            used: Vec::new(),
        };
    }

    let context = assemble_context(documents, tags, limits);
    tracing::debug!(
        "Generating from {} of {} documents ({} chars)",
        context.documents.len(),
        documents.len(),
        context.text.chars().count()
    );

    let answer = match complete(model, prompts, question, &context.text).await {
        Ok(text) if text.trim().is_empty() => EMPTY_ANSWER.to_string(),
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            tracing::warn!("Answer generation failed: {}", e);
            format!("I encountered an error while generating the answer: {}", e)
        }
    };

    GeneratedAnswer {
        answer,
        used: context.documents,
    }
}

async fn complete(
    model: &ModelHandle,
    prompts: &PromptLibrary,
    question: &str,
    context: &str,
) -> AppResult<String> {
    let built = prompts.render(&prompts.answer, &[("question", question), ("context", context)])?;
    model.complete(&built).await
}
