//! Configuration module for aniharvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use aniharvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Storage root: {}", config.storage.root);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CatalogConfig, Config, FetchConfig, HttpConfig, ReviewsConfig, StorageConfig};

// Re-export parser functions
pub use parser::load_config;
