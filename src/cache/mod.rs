//! Content-addressed page cache
//!
//! Every remote resource is stored on disk under a file named by the SHA-256
//! fingerprint of its identity (usually its URL):
//!
//! ```text
//! <workspace>/<cache-dir>/<hex fingerprint>
//! ```
//!
//! Entries hold the exact response bytes. They are written once and never
//! modified or evicted by this module.

mod key;
mod store;

pub use key::ResourceKey;
pub use store::ContentCache;

use thiserror::Error;

/// Errors raised by cache lookups and writes
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("No cache entry for key {0}")]
    NotFound(ResourceKey),

    #[error("Cache IO error for key {key}: {source}")]
    Io {
        key: ResourceKey,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
