//! Prompt loader for built-in and workspace prompt definitions.
//!
//! Built-in definitions are compiled into the binary. A workspace can override
//! any of them by dropping `<id>.yml` into its prompts directory
//! (`.carqa/prompts/`).

use crate::types::PromptDefinition;
use carqa_core::{AppError, AppResult};
use std::path::Path;

/// Identifiers of the prompts shipped with carqa.
pub mod ids {
    pub const CLASSIFY: &str = "strategy.classify";
    pub const PLAN_FACTS: &str = "plan.facts";
    pub const PLAN_EXTERNAL: &str = "plan.external";
    pub const ANSWER: &str = "answer.grounded";
}

const BUILTIN_PROMPTS: [(&str, &str); 4] = [
    (
        ids::CLASSIFY,
        include_str!("../prompts/strategy.classify.yml"),
    ),
    (ids::PLAN_FACTS, include_str!("../prompts/plan.facts.yml")),
    (
        ids::PLAN_EXTERNAL,
        include_str!("../prompts/plan.external.yml"),
    ),
    (ids::ANSWER, include_str!("../prompts/answer.grounded.yml")),
];

/// Load a prompt definition by ID.
///
/// Looks for `<id>.yml` in `overrides_dir` first, then falls back to the
/// built-in definition.
///
/// # Example
/// ```no_run
/// use carqa_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Some(Path::new(".carqa/prompts")), "answer.grounded")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(overrides_dir: Option<&Path>, prompt_id: &str) -> AppResult<PromptDefinition> {
    if let Some(dir) = overrides_dir {
        let prompt_file = dir.join(format!("{}.yml", prompt_id));
        if prompt_file.exists() {
            tracing::debug!("Loading prompt override from: {:?}", prompt_file);

            let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
                AppError::Prompt(format!(
                    "Failed to read prompt file {:?}: {}",
                    prompt_file, e
                ))
            })?;

            let definition = parse_prompt(&contents, &prompt_file.display().to_string())?;
            tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);
            return Ok(definition);
        }
    }

    let (_, contents) = BUILTIN_PROMPTS
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)))?;

    parse_prompt(contents, prompt_id)
}

/// List all available prompt IDs: built-ins plus workspace files.
pub fn list_prompts(overrides_dir: Option<&Path>) -> AppResult<Vec<String>> {
    let mut prompt_ids: Vec<String> = BUILTIN_PROMPTS
        .iter()
        .map(|(id, _)| id.to_string())
        .collect();

    if let Some(dir) = overrides_dir.filter(|dir| dir.exists()) {
        for entry in walkdir::WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if !prompt_ids.iter().any(|id| id == stem) {
                        prompt_ids.push(stem.to_string());
                    }
                }
            }
        }
    }

    prompt_ids.sort();
    Ok(prompt_ids)
}

fn parse_prompt(contents: &str, origin: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents)
        .map_err(|e| AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", origin, e)))?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}
