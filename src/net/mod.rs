//! Network access for the crawler
//!
//! This module contains:
//! - HTTP client construction from configuration
//! - Request specifications (the opaque "how to build this request" collaborator)
//! - The cache-backed fetcher that only touches the network on a cache miss

mod fetcher;
mod request;

pub use fetcher::Fetcher;
pub use request::{FormQuery, GetPage, RequestSpec};

use crate::cache::CacheError;
use crate::config::HttpConfig;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while fetching a resource on a cache miss
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {identity}")]
    Status { identity: String, status: u16 },

    #[error("Request for {identity} failed: {source}")]
    Transport {
        identity: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Fetch of {identity} cancelled")]
    Cancelled { identity: String },
}

impl FetchError {
    /// HTTP status code, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use excavator::config::HttpConfig;
/// use excavator::net::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}
