//! Prompts command handler.

use carqa_core::{config::AppConfig, AppResult};
use carqa_knowledge::config::get_prompts_dir;
use carqa_prompt::{list_prompts, load_prompt};
use clap::Args;

/// List available prompt definitions
#[derive(Args, Debug)]
pub struct PromptsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PromptsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let prompts_dir = get_prompts_dir(&config.workspace);
        let ids = list_prompts(Some(&prompts_dir))?;

        let mut rows = Vec::with_capacity(ids.len());
        for id in &ids {
            let definition = load_prompt(Some(&prompts_dir), id)?;
            let overridden = prompts_dir.join(format!("{}.yml", id)).exists();
            rows.push((definition, overridden));
        }

        if self.json {
            let output: Vec<serde_json::Value> = rows
                .iter()
                .map(|(def, overridden)| {
                    serde_json::json!({
                        "id": def.id,
                        "title": def.title,
                        "maxTokens": def.generation.max_tokens,
                        "temperature": def.generation.temperature,
                        "override": overridden,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            for (def, overridden) in &rows {
                let marker = if *overridden { " (workspace)" } else { "" };
                println!("{:<20} {}{}", def.id, def.title, marker);
            }
        }

        Ok(())
    }
}
