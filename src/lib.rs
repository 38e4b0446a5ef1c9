//! Excavator: a cache-backed dictionary crawler
//!
//! This crate crawls a character dictionary site, discovering radical→character
//! links and fetching each character's detail page. Every fetched page is kept
//! in a content-addressed cache on disk so a resource is only downloaded once,
//! and every record passes a dedup gate so it is only written once.

pub mod cache;
pub mod config;
pub mod document;
pub mod excavator;
pub mod net;
pub mod output;
pub mod pipeline;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Excavator operations
#[derive(Debug, Error)]
pub enum ExcavatorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cache error: {0}")]
    Cache(#[from] cache::CacheError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] net::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Document error: {0}")]
    Document(#[from] document::DocumentError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Workspace error at {path}: {source}")]
    Workspace {
        path: String,
        source: std::io::Error,
    },

    #[error("Stage {stage} failed: {message}")]
    Stage { stage: String, message: String },

    #[error("Downstream of stage {stage} hung up")]
    DownstreamClosed { stage: String },

    #[error("Run cancelled")]
    Cancelled,
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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Excavator operations
pub type Result<T> = std::result::Result<T, ExcavatorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use cache::{ContentCache, ResourceKey};
pub use config::Config;
pub use excavator::{Excavator, RadicalType, RunSummary, Step};
pub use net::Fetcher;
pub use pipeline::{Message, PersistOutcome, StageReport};
pub use storage::{Character, RadicalCharacter};
