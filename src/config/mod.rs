//! Configuration module for Plethora
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use plethora::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("plethora.toml")).unwrap();
//! println!("Fetching with {} workers", config.pipeline.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CacheBackend, CacheConfig, Config, HttpConfig, PipelineConfig, PolitenessConfig,
    SearchConfig,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::{validate, validate_pipeline_config, MAX_WORKERS};
