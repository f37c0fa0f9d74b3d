//! Prompt system for carqa.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions, built in and overridable per workspace
//! - Handlebars template rendering
//! - Per-prompt generation settings (token cap, temperature)

pub mod builder;
pub mod library;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use library::PromptLibrary;
pub use loader::{ids, list_prompts, load_prompt};
pub use types::{
    BuiltPrompt, BuiltPromptMetadata, GenerationSettings, PromptDefinition, PromptInputSpec,
    PromptOutputSpec,
};
