//! Command handlers for the carqa CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod corpus;
pub mod prompts;
pub mod serve;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use corpus::CorpusCommand;
pub use prompts::PromptsCommand;
pub use serve::ServeCommand;
