//! Corpus loading.
//!
//! Markdown files are split into sections at heading lines; JSON files hold
//! review records, one chunk per record. Chunk ids are `<filename>_<index>`
//! and the source tag of a chunk is its file name.

use crate::types::ReviewMetadata;
use carqa_core::{AppError, AppResult};
use serde_json::Value;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// A unit of corpus text, ready to be embedded.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusChunk {
    pub id: String,
    pub source: String,
    pub content: String,
    pub review: Option<ReviewMetadata>,
}

/// Load every `.md` and `.json` file directly under `dir`.
///
/// Files are visited in name order so chunk order is stable across runs.
pub fn load_corpus(dir: &Path) -> AppResult<Vec<CorpusChunk>> {
    if !dir.is_dir() {
        return Err(AppError::Store(format!(
            "Corpus directory not found: {:?}",
            dir
        )));
    }

    let mut chunks = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        let loaded = match path.extension().and_then(|e| e.to_str()) {
            Some("md") => load_markdown(path, filename)?,
            Some("json") => load_reviews(path, filename)?,
            _ => {
                tracing::debug!("Skipping non-corpus file {:?}", path);
                continue;
            }
        };

        tracing::info!("Loaded {} chunks from {}", loaded.len(), filename);
        chunks.extend(loaded);
    }

    Ok(chunks)
}

fn load_markdown(path: &Path, filename: &str) -> AppResult<Vec<CorpusChunk>> {
    let content = fs::read_to_string(path)?;

    Ok(split_markdown(&content)
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(i, text)| CorpusChunk {
            id: format!("{}_{}", filename, i),
            source: filename.to_string(),
            content: text,
            review: None,
        })
        .collect())
}

/// Split markdown into sections starting at lines that begin with `#`.
///
/// A file with at most one section is split into blank-line paragraphs
/// instead.
pub fn split_markdown(content: &str) -> Vec<String> {
    let mut sections: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in content.split('\n') {
        if line.starts_with('#') && !current.is_empty() {
            sections.push(current.join("\n"));
            current = vec![line];
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        sections.push(current.join("\n"));
    }

    if sections.len() <= 1 {
        return content
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
    }

    sections
}

fn load_reviews(path: &Path, filename: &str) -> AppResult<Vec<CorpusChunk>> {
    let raw = fs::read_to_string(path)?;
    let data: Value = serde_json::from_str(&raw).map_err(|e| {
        AppError::Serialization(format!("Failed to parse {:?}: {}", path, e))
    })?;

    let items = match data {
        Value::Array(items) => items,
        Value::Object(_) => vec![data],
        _ => {
            tracing::warn!("{:?} holds neither an array nor an object, skipping", path);
            return Ok(Vec::new());
        }
    };

    Ok(items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            let (content, review) = review_item(item);
            if content.trim().is_empty() {
                return None;
            }
            Some(CorpusChunk {
                id: format!("{}_{}", filename, i),
                source: filename.to_string(),
                content,
                review,
            })
        })
        .collect())
}

/// Text of a JSON value when it carries something worth indexing.
fn field_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Flatten one review record into labelled text plus structured metadata.
pub fn review_item(item: &Value) -> (String, Option<ReviewMetadata>) {
    let fields = match item {
        Value::String(s) => return (s.clone(), None),
        Value::Object(fields) => fields,
        Value::Null => return (String::new(), None),
        other => return (other.to_string(), None),
    };

    let title = field_text(fields.get("title"));
    let channel = field_text(fields.get("channel_title"));
    let views = field_text(fields.get("views"));
    let subscribers = field_text(fields.get("subscribers"));
    let transcript = fields
        .get("transcriptText")
        .and_then(|t| field_text(t.get("content")));

    let labelled = [
        ("Title", title.clone()),
        ("Description", field_text(fields.get("description"))),
        ("Transcript", transcript),
        ("Channel", channel.clone()),
        ("Views", views.clone()),
        ("Channel Subscribers", subscribers.clone()),
        (
            "Video Length",
            field_text(fields.get("totalSeconds")).map(|s| format!("{} seconds", s)),
        ),
        ("Resolution", field_text(fields.get("resolution"))),
        ("Published", field_text(fields.get("publishedAt"))),
        ("brand", field_text(fields.get("brand"))),
        ("product", field_text(fields.get("product"))),
        ("region", field_text(fields.get("region"))),
    ];

    let content = labelled
        .iter()
        .filter_map(|(label, value)| value.as_ref().map(|v| format!("{}: {}", label, v)))
        .collect::<Vec<_>>()
        .join(" ");

    let metadata = ReviewMetadata {
        title,
        channel,
        views,
        subscribers,
    };

    (content, (!metadata.is_empty()).then_some(metadata))
}
