//! Aniharvest: a crawl-and-recover pipeline for a ranked anime catalog
//!
//! This crate enumerates a paginated ranking list, persists every detail page
//! as a raw HTML document under a partitioned storage layout, recovers missing
//! or failed fetches with a bounded retry loop, and deterministically derives
//! structured TSV records from whatever was saved. Every phase is idempotent:
//! work already on disk is skipped, so re-running converges instead of
//! repeating itself.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod progress;
pub mod storage;

use thiserror::Error;

/// Main error type for aniharvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Extraction error: {0}")]
    Extraction(#[from] extract::ExtractionError),

    #[error("Malformed target list at line {line}: {reason}")]
    ListFormat { line: usize, reason: String },

    #[error("No target with sequence index {0}")]
    MissingTarget(usize),

    #[error("Review fetch for target {seq} still failing after {attempts} attempts")]
    ReviewsExhausted { seq: usize, attempts: u32 },

    #[error("Worker task failed: {0}")]
    Task(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for aniharvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::Target;
pub use config::Config;
pub use crawler::{FetchFailure, RecoveryController};
pub use storage::Layout;
