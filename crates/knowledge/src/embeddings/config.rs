//! Embedding configuration types.

use carqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Embedding configuration for the memory store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider name: "trigram" or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Texts embedded per provider call while loading the corpus
    pub batch_size: usize,

    /// Provider base URL, when it differs from the provider default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            batch_size: 100,
            endpoint: None,
        }
    }
}

impl EmbeddingConfig {
    /// Configuration for an Ollama embedding model.
    pub fn ollama(model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            provider: "ollama".to_string(),
            model: model.into(),
            dimensions,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        if self.batch_size == 0 {
            return Err(AppError::Config(
                "Embedding batch size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
