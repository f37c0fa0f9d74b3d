//! Scripted LLM client for tests and offline runs.
//!
//! Replies are chosen by the first rule whose needle occurs in the prompt;
//! unmatched prompts get the default reply. Every request is recorded.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use carqa_core::{AppError, AppResult};
use std::sync::Mutex;

/// A canned outcome for a completion call.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    Fail(String),
}

/// Deterministic `LlmClient` driven by prompt substrings.
#[derive(Debug)]
pub struct ScriptedClient {
    rules: Vec<(String, ScriptedReply)>,
    default: ScriptedReply,
    calls: Mutex<Vec<LlmRequest>>,
}

impl ScriptedClient {
    /// A client that fails every call until rules are added.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            default: ScriptedReply::Fail("no scripted reply".to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reply with `text` when the prompt contains `needle`.
    pub fn on(mut self, needle: impl Into<String>, text: impl Into<String>) -> Self {
        self.rules
            .push((needle.into(), ScriptedReply::Text(text.into())));
        self
    }

    /// Fail with `message` when the prompt contains `needle`.
    pub fn fail_on(mut self, needle: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules
            .push((needle.into(), ScriptedReply::Fail(message.into())));
        self
    }

    /// Reply used when no rule matches.
    pub fn otherwise(mut self, text: impl Into<String>) -> Self {
        self.default = ScriptedReply::Text(text.into());
        self
    }

    /// Requests received so far, in call order.
    pub fn calls(&self) -> Vec<LlmRequest> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn reply_for(&self, prompt: &str) -> &ScriptedReply {
        self.rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply)
            .unwrap_or(&self.default)
    }
}

impl Default for ScriptedClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }

        match self.reply_for(&request.prompt) {
            ScriptedReply::Text(text) => Ok(LlmResponse {
                content: text.clone(),
                model: request.model.clone(),
                usage: LlmUsage::default(),
            }),
            ScriptedReply::Fail(message) => Err(AppError::Llm(message.clone())),
        }
    }
}
