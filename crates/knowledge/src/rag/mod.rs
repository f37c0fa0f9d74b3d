//! Retrieval-augmented answering pipeline.
//!
//! Stages, in call order: strategy classification, search term planning,
//! multi-query retrieval, context assembly and generation, adequacy
//! assessment, citation building.

pub mod adequacy;
pub mod ask;
pub mod citations;
pub mod classify;
pub mod context;
pub mod generate;
pub mod model;
pub mod plan;
pub mod retrieve;
pub mod types;

pub use ask::Pipeline;
pub use classify::ProbeOutcome;
pub use types::{AnswerResult, AnswerStatus, Citation, CitationType};
