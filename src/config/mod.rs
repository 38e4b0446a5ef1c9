//! Configuration module for Excavator
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use excavator::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("excavator.toml")).unwrap();
//! println!("Crawling {}", config.excavator.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, ExcavatorConfig, HttpConfig, OutputConfig, RadicalType};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
