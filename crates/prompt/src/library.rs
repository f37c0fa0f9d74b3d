//! The set of prompts a question-answering run needs, loaded once.

use crate::builder::build_prompt;
use crate::loader::{ids, load_prompt};
use crate::types::{BuiltPrompt, PromptDefinition};
use carqa_core::AppResult;
use std::collections::HashMap;
use std::path::Path;

/// Classifier, planner and answer prompts resolved at startup.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    pub classify: PromptDefinition,
    pub plan_facts: PromptDefinition,
    pub plan_external: PromptDefinition,
    pub answer: PromptDefinition,
}

impl PromptLibrary {
    /// Load every prompt, preferring files in `overrides_dir`.
    pub fn load(overrides_dir: Option<&Path>) -> AppResult<Self> {
        Ok(Self {
            classify: load_prompt(overrides_dir, ids::CLASSIFY)?,
            plan_facts: load_prompt(overrides_dir, ids::PLAN_FACTS)?,
            plan_external: load_prompt(overrides_dir, ids::PLAN_EXTERNAL)?,
            answer: load_prompt(overrides_dir, ids::ANSWER)?,
        })
    }

    /// Built-in prompts only.
    pub fn builtin() -> AppResult<Self> {
        Self::load(None)
    }

    pub fn definitions(&self) -> [&PromptDefinition; 4] {
        [
            &self.classify,
            &self.plan_facts,
            &self.plan_external,
            &self.answer,
        ]
    }

    /// Render `definition` with `(name, value)` pairs.
    pub fn render(
        &self,
        definition: &PromptDefinition,
        vars: &[(&str, &str)],
    ) -> AppResult<BuiltPrompt> {
        let variables: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        build_prompt(definition, variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_library() {
        let library = PromptLibrary::builtin().unwrap();
        assert_eq!(library.classify.id, ids::CLASSIFY);
        assert_eq!(library.answer.id, ids::ANSWER);
        assert_eq!(library.definitions().len(), 4);
    }

    #[test]
    fn test_render_planner() {
        let library = PromptLibrary::builtin().unwrap();
        let built = library
            .render(
                &library.plan_facts,
                &[("question", "What is the range?"), ("product", "BYD Seal")],
            )
            .unwrap();

        assert!(built.user.contains("\"What is the range?\""));
        assert!(built.user.contains("BYD Seal facts database"));
        assert_eq!(built.generation.max_tokens, 200);
    }

    #[test]
    fn test_render_answer_keeps_context_verbatim() {
        let library = PromptLibrary::builtin().unwrap();
        let context = "Document 1 (Source: byd_seal_facts.md):\nRange is 570 km & more\n";
        let built = library
            .render(&library.answer, &[("question", "Range?"), ("context", context)])
            .unwrap();

        assert!(built.user.contains(context));
        assert!(built.user.contains("CRITICAL RULES"));
    }
}
