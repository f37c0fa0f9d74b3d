//! Corpus command handler.
//!
//! Loads and embeds the corpus exactly as `ask` and `serve` do, then reports
//! what ended up in the store.

use carqa_core::{config::AppConfig, AppResult};
use carqa_knowledge::{build_memory_store, KnowledgeConfig};
use clap::Args;

/// Show what the corpus contains
#[derive(Args, Debug)]
pub struct CorpusCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CorpusCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing corpus command");

        let knowledge = KnowledgeConfig::load(&config.workspace)?;
        let store = build_memory_store(&config.workspace, &knowledge).await?;
        let counts = store.source_counts();

        let role = |tag: &str| match knowledge.sources.source_of(tag) {
            Some(source) => source.to_string(),
            None => "unused".to_string(),
        };

        if self.json {
            let sources: Vec<serde_json::Value> = counts
                .iter()
                .map(|(tag, count)| {
                    serde_json::json!({ "source": tag, "role": role(tag), "chunks": count })
                })
                .collect();
            let output = serde_json::json!({
                "dir": knowledge.corpus_dir(&config.workspace),
                "embedding": {
                    "provider": knowledge.embedding.provider,
                    "model": knowledge.embedding.model,
                },
                "total": store.len(),
                "sources": sources,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Corpus: {}", knowledge.corpus_dir(&config.workspace).display());
            println!(
                "Embedding: {} ({})",
                knowledge.embedding.provider, knowledge.embedding.model
            );
            for (tag, count) in &counts {
                println!("  {:<28} {:<9} {} chunks", tag, role(tag), count);
            }
            println!("Total: {} chunks", store.len());
        }

        Ok(())
    }
}
