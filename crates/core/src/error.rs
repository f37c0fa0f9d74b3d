//! Error types for carqa.
//!
//! This module defines a unified error enum that covers every failure category
//! in the workspace: configuration, I/O, language model, semantic store,
//! prompt rendering, pipeline and input validation errors.

use thiserror::Error;

/// Unified error type for carqa.
///
/// Collaborator calls (model, store) return `Result<T, AppError>` so each
/// caller can match on the outcome and apply its own fallback.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Language model provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Semantic store and embedding errors
    #[error("Store error: {0}")]
    Store(String),

    /// Prompt loading and rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Answering pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// Rejected user input
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
