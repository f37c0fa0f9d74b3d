//! Pipeline configuration.
//!
//! Loaded from `.carqa/pipeline.yaml` when present, otherwise every value
//! falls back to its default. Partial files are fine: missing keys keep
//! their defaults.

use crate::embeddings::EmbeddingConfig;
use crate::rules::KeywordTable;
use crate::types::DocumentSource;
use carqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Full configuration of the answering pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Product name rendered into planner prompts
    pub product: String,

    /// Tokens removed from facts search terms (whole words, any case)
    pub product_terms: Vec<String>,

    pub sources: SourceTags,
    pub corpus: CorpusConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub context: ContextConfig,
    pub adequacy: AdequacyConfig,
    pub citations: CitationConfig,
    pub keywords: KeywordTable,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            product: "BYD Seal".to_string(),
            product_terms: vec!["byd seal".to_string(), "byd".to_string(), "seal".to_string()],
            sources: SourceTags::default(),
            corpus: CorpusConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            context: ContextConfig::default(),
            adequacy: AdequacyConfig::default(),
            citations: CitationConfig::default(),
            keywords: KeywordTable::default(),
        }
    }
}

/// Exact-match source tags for the two evidence collections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceTags {
    pub facts: String,
    pub external: String,
}

impl Default for SourceTags {
    fn default() -> Self {
        Self {
            facts: "byd_seal_facts.md".to_string(),
            external: "byd_seal_external.json".to_string(),
        }
    }
}

impl SourceTags {
    /// Tag string for a source.
    pub fn tag(&self, source: DocumentSource) -> &str {
        match source {
            DocumentSource::Facts => &self.facts,
            DocumentSource::External => &self.external,
        }
    }

    /// Source for a tag, if the tag is one of ours.
    pub fn source_of(&self, tag: &str) -> Option<DocumentSource> {
        if tag == self.facts {
            Some(DocumentSource::Facts)
        } else if tag == self.external {
            Some(DocumentSource::External)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CorpusConfig {
    /// Directory holding the `.md` and `.json` corpus files, relative to the workspace
    pub dir: PathBuf,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Candidates requested from the store per search term
    pub per_query: usize,

    /// Documents kept after merging
    pub max_results: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            per_query: 5,
            max_results: 5,
        }
    }
}

/// Context budget, measured in characters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContextConfig {
    pub budget_chars: usize,
    pub max_document_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            budget_chars: 6000,
            max_document_chars: 1500,
        }
    }
}

/// Confidence scoring constants for one evidence kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreProfile {
    /// Minimum confidence for an adequate answer (inclusive)
    pub threshold: f32,

    /// Average distance at which distance confidence reaches zero
    pub distance_scale: f32,

    /// Multiplier applied to the distance variance
    pub variance_scale: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdequacyConfig {
    pub facts: ScoreProfile,
    pub external: ScoreProfile,
    pub distance_weight: f32,
    pub consistency_weight: f32,
}

impl Default for AdequacyConfig {
    fn default() -> Self {
        Self {
            facts: ScoreProfile {
                threshold: 0.4,
                distance_scale: 1.5,
                variance_scale: 1.5,
            },
            external: ScoreProfile {
                threshold: 0.5,
                distance_scale: 2.0,
                variance_scale: 2.0,
            },
            distance_weight: 0.7,
            consistency_weight: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CitationConfig {
    /// Maximum external review citations
    pub max_external: usize,

    /// Titles longer than this are shortened at a word boundary
    pub title_max_chars: usize,
}

impl Default for CitationConfig {
    fn default() -> Self {
        Self {
            max_external: 5,
            title_max_chars: 200,
        }
    }
}

impl KnowledgeConfig {
    /// Load pipeline configuration for a workspace.
    ///
    /// Reads `.carqa/pipeline.yaml` if it exists, otherwise returns defaults.
    pub fn load(workspace: &Path) -> AppResult<Self> {
        let config_path = get_config_path(workspace);

        if !config_path.exists() {
            tracing::debug!("No pipeline config at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| {
            AppError::Config(format!("Failed to read config at {:?}: {}", config_path, e))
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Config(format!("Failed to parse config at {:?}: {}", config_path, e))
        })?;

        config.validate()?;
        tracing::debug!("Loaded pipeline config from {:?}", config_path);
        Ok(config)
    }

    /// Save configuration to `.carqa/pipeline.yaml`.
    pub fn save(&self, workspace: &Path) -> AppResult<()> {
        let config_path = get_config_path(workspace);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let yaml = serde_yaml::to_string(self)?;
        fs::write(&config_path, yaml).map_err(|e| {
            AppError::Config(format!("Failed to write config to {:?}: {}", config_path, e))
        })?;

        tracing::debug!("Saved pipeline config to {:?}", config_path);
        Ok(())
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        if self.sources.facts.is_empty() || self.sources.external.is_empty() {
            return Err(AppError::Config("Source tags cannot be empty".to_string()));
        }

        if self.sources.facts == self.sources.external {
            return Err(AppError::Config(format!(
                "Facts and external sources share the tag '{}'",
                self.sources.facts
            )));
        }

        if self.retrieval.per_query == 0 || self.retrieval.max_results == 0 {
            return Err(AppError::Config(
                "Retrieval counts must be greater than zero".to_string(),
            ));
        }

        if self.context.max_document_chars == 0 || self.context.budget_chars == 0 {
            return Err(AppError::Config(
                "Context limits must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Corpus directory resolved against the workspace.
    pub fn corpus_dir(&self, workspace: &Path) -> PathBuf {
        if self.corpus.dir.is_absolute() {
            self.corpus.dir.clone()
        } else {
            workspace.join(&self.corpus.dir)
        }
    }
}

/// Get the path to the pipeline config file.
pub fn get_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".carqa").join("pipeline.yaml")
}

/// Get the directory holding prompt overrides.
pub fn get_prompts_dir(workspace: &Path) -> PathBuf {
    workspace.join(".carqa").join("prompts")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_default_config() {
        let temp = TempDir::new().unwrap();
        let config = KnowledgeConfig::load(temp.path()).unwrap();

        assert_eq!(config.sources.facts, "byd_seal_facts.md");
        assert_eq!(config.retrieval.per_query, 5);
        assert_eq!(config.context.budget_chars, 6000);
        assert_eq!(config.adequacy.external.threshold, 0.5);
    }

    #[test]
    fn test_save_and_load_config() {
        let temp = TempDir::new().unwrap();
        let mut config = KnowledgeConfig::default();
        config.product = "Dolphin".to_string();
        config.citations.max_external = 3;

        config.save(temp.path()).unwrap();

        let loaded = KnowledgeConfig::load(temp.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".carqa");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("pipeline.yaml"),
            "sources:\n  facts: facts.md\ncontext:\n  budget_chars: 4000\n",
        )
        .unwrap();

        let config = KnowledgeConfig::load(temp.path()).unwrap();
        assert_eq!(config.sources.facts, "facts.md");
        assert_eq!(config.sources.external, "byd_seal_external.json");
        assert_eq!(config.context.budget_chars, 4000);
        assert_eq!(config.context.max_document_chars, 1500);
    }

    #[test]
    fn test_identical_tags_rejected() {
        let mut config = KnowledgeConfig::default();
        config.sources.external = config.sources.facts.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_source_tags_lookup() {
        let tags = SourceTags::default();
        assert_eq!(tags.tag(DocumentSource::External), "byd_seal_external.json");
        assert_eq!(tags.source_of("byd_seal_facts.md"), Some(DocumentSource::Facts));
        assert_eq!(tags.source_of("other.md"), None);
    }

    #[test]
    fn test_relative_corpus_dir_resolves_against_workspace() {
        let config = KnowledgeConfig::default();
        assert_eq!(
            config.corpus_dir(Path::new("/srv/carqa")),
            PathBuf::from("/srv/carqa/data")
        );
    }
}
