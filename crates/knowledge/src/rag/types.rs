//! Answer and citation types returned by the pipeline.

use serde::{Deserialize, Serialize};

pub const REFUSED_MESSAGE: &str = "I cannot answer this question as it may involve sensitive information like pricing, warranty, or availability that should only come from official facts.";

pub const NO_INFORMATION_MESSAGE: &str =
    "I couldn't find any relevant information about this question in the available data sources.";

/// Outcome of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    Refused,
    Answered,
    NoInformationFound,
    Error,
}

impl AnswerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerStatus::Refused => "refused",
            AnswerStatus::Answered => "answered",
            AnswerStatus::NoInformationFound => "no_information_found",
            AnswerStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationType {
    Facts,
    ExternalReview,
}

/// A document backing an answer.
///
/// Review fields are only present on external review citations, and only
/// when a value was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Source tag of the cited document
    pub source: String,
    pub doc_id: String,
    pub chunk_id: String,

    #[serde(rename = "type")]
    pub kind: CitationType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscribers: Option<String>,
}

/// What `ask` returns for every question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub answer: String,
    pub status: AnswerStatus,
    pub citations: Vec<Citation>,
}

impl AnswerResult {
    pub fn answered(answer: String, citations: Vec<Citation>) -> Self {
        Self {
            answer,
            status: AnswerStatus::Answered,
            citations,
        }
    }

    pub fn refused() -> Self {
        Self {
            answer: REFUSED_MESSAGE.to_string(),
            status: AnswerStatus::Refused,
            citations: Vec::new(),
        }
    }

    pub fn no_information() -> Self {
        Self {
            answer: NO_INFORMATION_MESSAGE.to_string(),
            status: AnswerStatus::NoInformationFound,
            citations: Vec::new(),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            answer: format!(
                "I encountered an error while processing your question: {}",
                message
            ),
            status: AnswerStatus::Error,
            citations: Vec::new(),
        }
    }
}
