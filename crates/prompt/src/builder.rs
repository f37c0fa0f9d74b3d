//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use carqa_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Every variable declared under `input.variables` must be present in
/// `variables`; extra entries are passed through to the template untouched.
///
/// # Example
/// ```no_run
/// use carqa_prompt::{build_prompt, load_prompt};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = load_prompt(None, "plan.facts")?;
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "What is the range?".to_string());
/// vars.insert("product".to_string(), "BYD Seal".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    if let Some(missing) = definition
        .input
        .variables
        .iter()
        .find(|name| !variables.contains_key(*name))
    {
        return Err(AppError::Prompt(format!(
            "Prompt '{}' requires variable '{}'",
            definition.id, missing
        )));
    }

    let user = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt::new(
        user,
        definition.generation.clone(),
        definition.id.clone(),
        variables,
    ))
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text, never HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}
