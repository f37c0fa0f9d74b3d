//! carqa core library
//!
//! This crate provides the foundational utilities shared by every carqa crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Application configuration (providers, server, workspace)

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};
