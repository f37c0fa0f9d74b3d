//! Pipeline construction from the resolved configuration.

use carqa_core::{config::AppConfig, AppError, AppResult};
use carqa_knowledge::config::get_prompts_dir;
use carqa_knowledge::{build_memory_store, KnowledgeConfig, Pipeline};
use carqa_llm::create_client;
use carqa_prompt::PromptLibrary;
use std::sync::Arc;

/// Build the answering pipeline for the configured workspace.
///
/// Loads pipeline settings and prompt overrides, embeds the corpus into a
/// memory store and connects the configured LLM provider.
pub async fn build_pipeline(config: &AppConfig) -> AppResult<Pipeline> {
    config.validate()?;

    let knowledge = KnowledgeConfig::load(&config.workspace)?;
    let prompts_dir = get_prompts_dir(&config.workspace);
    let prompts = PromptLibrary::load(Some(&prompts_dir))?;

    let store = build_memory_store(&config.workspace, &knowledge).await?;
    if store.is_empty() {
        tracing::warn!("Corpus is empty, every answerable question will find nothing");
    }

    let endpoint = config.provider_endpoint();
    let api_key = config.resolve_api_key(&config.provider);
    let client = create_client(&config.provider, endpoint.as_deref(), api_key.as_deref())
        .map_err(AppError::Config)?;

    let pipeline = Pipeline::new(
        client,
        config.model.clone(),
        Arc::new(store),
        prompts,
        knowledge,
    );

    tracing::info!(
        "Pipeline ready: {} via {} for {}",
        pipeline.model_name(),
        pipeline.provider_name(),
        pipeline.config().product
    );
    Ok(pipeline)
}
