//! Model handle shared by the pipeline stages.

use carqa_core::AppResult;
use carqa_llm::{LlmClient, LlmRequest};
use carqa_prompt::BuiltPrompt;
use std::sync::Arc;

/// An LLM client bound to a model name.
#[derive(Clone)]
pub struct ModelHandle {
    client: Arc<dyn LlmClient>,
    model: String,
}

impl ModelHandle {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider(&self) -> &str {
        self.client.provider_name()
    }

    /// Send a rendered prompt with its generation settings.
    pub async fn complete(&self, prompt: &BuiltPrompt) -> AppResult<String> {
        let request = LlmRequest::new(prompt.user.clone(), self.model.clone())
            .with_max_tokens(prompt.generation.max_tokens)
            .with_temperature(prompt.generation.temperature);

        tracing::debug!(
            "Calling {} ({}) for prompt '{}'",
            self.client.provider_name(),
            self.model,
            prompt.metadata.source_prompt_id
        );

        let response = self.client.complete(&request).await?;
        Ok(response.content)
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("provider", &self.client.provider_name())
            .field("model", &self.model)
            .finish()
    }
}
