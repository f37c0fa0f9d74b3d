//! Keyword rule tables.
//!
//! Each rule maps a keyword to a category. The opinion rules drive the
//! adequacy override; the other categories are rendered into the strategy
//! classification prompt as topic examples.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCategory {
    /// The question asks what people think
    Opinion,
    /// Commercial topics that are always refused
    Sensitive,
    /// Technical topics answered from facts
    Specification,
    /// Subjective topics that may use reviews
    Experience,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub category: KeywordCategory,
}

impl KeywordRule {
    pub fn new(keyword: impl Into<String>, category: KeywordCategory) -> Self {
        Self {
            keyword: keyword.into(),
            category,
        }
    }
}

/// An ordered list of keyword rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordTable {
    rules: Vec<KeywordRule>,
}

const OPINION: &[&str] = &[
    "review",
    "reviewer",
    "youtuber",
    "youtube",
    "opinion",
    "say",
    "think",
    "feel",
    "experience",
    "what do",
];

const SENSITIVE: &[&str] = &[
    "pricing",
    "cost",
    "price",
    "how much",
    "warranty",
    "guarantee",
    "coverage",
    "availability",
    "stock",
    "when available",
    "release date",
    "purchasing",
    "buying",
    "where to buy",
];

const SPECIFICATION: &[&str] = &[
    "technical specifications",
    "features",
    "specs",
    "battery capacity",
    "range",
    "performance",
    "dimensions",
    "size",
    "weight",
];

const EXPERIENCE: &[&str] = &[
    "reviews",
    "opinions",
    "experiences",
    "what reviewers say",
    "what people think",
    "user experiences and impressions",
];

impl Default for KeywordTable {
    fn default() -> Self {
        let groups = [
            (KeywordCategory::Opinion, OPINION),
            (KeywordCategory::Sensitive, SENSITIVE),
            (KeywordCategory::Specification, SPECIFICATION),
            (KeywordCategory::Experience, EXPERIENCE),
        ];

        let rules = groups
            .iter()
            .flat_map(|(category, keywords)| {
                keywords
                    .iter()
                    .map(move |keyword| KeywordRule::new(*keyword, *category))
            })
            .collect();

        Self { rules }
    }
}

impl KeywordTable {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// Whether `text` contains any keyword of `category`, ignoring case.
    pub fn matches(&self, text: &str, category: KeywordCategory) -> bool {
        let text = text.to_lowercase();
        self.rules
            .iter()
            .filter(|rule| rule.category == category)
            .any(|rule| text.contains(&rule.keyword.to_lowercase()))
    }

    /// Keywords of a category, in table order.
    pub fn keywords(&self, category: KeywordCategory) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|rule| rule.category == category)
            .map(|rule| rule.keyword.as_str())
            .collect()
    }

    /// Comma-separated keywords of a category, for prompt rendering.
    pub fn topic_list(&self, category: KeywordCategory) -> String {
        self.keywords(category).join(", ")
    }
}
