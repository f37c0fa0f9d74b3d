//! Ask command handler.
//!
//! Runs one question through the full pipeline and prints the answer with
//! its citations.

use crate::{bootstrap::build_pipeline, server::validate_question};
use carqa_core::{config::AppConfig, AppError, AppResult};
use carqa_knowledge::{AnswerResult, Citation, CitationType};
use clap::Args;
use std::path::PathBuf;

/// Answer a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "question")]
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let question = self.get_question()?;
        validate_question(&question)?;

        let pipeline = build_pipeline(config).await?;
        let result = pipeline.ask(&question).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print!("{}", render_text(&result));
        }

        Ok(())
    }

    fn get_question(&self) -> AppResult<String> {
        if let Some(question) = &self.question {
            return Ok(question.clone());
        }

        match &self.file {
            Some(path) => Ok(std::fs::read_to_string(path)?.trim().to_string()),
            None => Err(AppError::Validation("No question provided".to_string())),
        }
    }
}

/// Plain-text rendering: the answer, then one line per citation.
fn render_text(result: &AnswerResult) -> String {
    let mut out = format!("{}\n", result.answer);

    if !result.citations.is_empty() {
        out.push_str("\nSources:\n");
        for (i, citation) in result.citations.iter().enumerate() {
            out.push_str(&format!("  [{}] {}\n", i + 1, describe(citation)));
        }
    }

    out
}

fn describe(citation: &Citation) -> String {
    match citation.kind {
        CitationType::Facts => format!("{} ({})", citation.source, citation.chunk_id),
        CitationType::ExternalReview => {
            let mut parts = vec![citation
                .title
                .clone()
                .unwrap_or_else(|| citation.chunk_id.clone())];
            if let Some(channel) = &citation.channel {
                parts.push(channel.clone());
            }
            if let Some(views) = &citation.views {
                parts.push(format!("{} views", views));
            }
            parts.join(" | ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carqa_knowledge::AnswerStatus;

    fn citation(kind: CitationType, chunk_id: &str) -> Citation {
        Citation {
            source: "byd_seal_facts.md".to_string(),
            doc_id: chunk_id.to_string(),
            chunk_id: chunk_id.to_string(),
            kind,
            title: None,
            channel: None,
            views: None,
            subscribers: None,
        }
    }

    #[test]
    fn test_render_without_citations() {
        let text = render_text(&AnswerResult::refused());
        assert!(text.starts_with("I cannot answer this question"));
        assert!(!text.contains("Sources:"));
    }

    #[test]
    fn test_render_lists_citations() {
        let mut review = citation(CitationType::ExternalReview, "byd_seal_external.json_4");
        review.source = "byd_seal_external.json".to_string();
        review.title = Some("BYD Seal long-term review".to_string());
        review.channel = Some("Auto Weekly".to_string());
        review.views = Some("12,345".to_string());

        let result = AnswerResult {
            answer: "82.5 kWh.".to_string(),
            status: AnswerStatus::Answered,
            citations: vec![citation(CitationType::Facts, "byd_seal_facts.md_3"), review],
        };

        let text = render_text(&result);
        assert!(text.contains("[1] byd_seal_facts.md (byd_seal_facts.md_3)"));
        assert!(text.contains("[2] BYD Seal long-term review | Auto Weekly | 12,345 views"));
    }

    #[test]
    fn test_question_required() {
        let cmd = AskCommand {
            question: None,
            file: None,
            json: false,
        };
        assert!(cmd.get_question().is_err());
    }

    #[test]
    fn test_question_from_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("question.txt");
        std::fs::write(&path, "What is the range?\n").unwrap();

        let cmd = AskCommand {
            question: None,
            file: Some(path),
            json: false,
        };
        assert_eq!(cmd.get_question().unwrap(), "What is the range?");
    }
}
