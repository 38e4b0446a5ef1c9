//! Cache-backed fetcher
//!
//! Every request goes through the content cache first:
//!
//! 1. Derive the resource key from the request identity
//! 2. On a hit, open the cached entry (no network access)
//! 3. On a miss, send the request, require a 2xx status, store the full body
//!    in the cache and reopen the stored entry
//!
//! There is no retry and no fallback: a failed fetch is reported to the
//! calling stage, which decides what to do with the item.
//!
//! Two concurrent fetches of the same uncached identity may both miss and both
//! hit the network. Both then write identical bytes to the same entry, so the
//! race costs a duplicate request but never corrupts the cache.

use crate::cache::{ContentCache, ResourceKey};
use crate::net::{FetchError, FetchResult, RequestSpec};
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

/// Fetch coordinator: cache lookup, network on miss, cached bytes out
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    cache: ContentCache,
    cancel: CancellationToken,
}

impl Fetcher {
    /// Creates a fetcher that never gets cancelled
    pub fn new(client: Client, cache: ContentCache) -> Self {
        Self::with_cancellation(client, cache, CancellationToken::new())
    }

    /// Creates a fetcher that refuses new network calls once `cancel` fires
    ///
    /// Cache hits are still served after cancellation.
    pub fn with_cancellation(client: Client, cache: ContentCache, cancel: CancellationToken) -> Self {
        Self {
            client,
            cache,
            cancel,
        }
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Fetches the resource named by `identity`
    ///
    /// # Arguments
    ///
    /// * `identity` - Cache identity of the resource (usually its URL)
    /// * `request` - Builds the network request on a miss
    ///
    /// # Returns
    ///
    /// An open handle on the cache entry holding the resource
    pub async fn fetch(&self, identity: &str, request: &dyn RequestSpec) -> FetchResult<File> {
        let key = ResourceKey::from_identity(identity);

        if self.cache.has(&key).await {
            tracing::debug!(identity, key = %key, "cache hit");
            return Ok(self.cache.open(&key).await?);
        }

        if self.cancel.is_cancelled() {
            return Err(FetchError::Cancelled {
                identity: identity.to_string(),
            });
        }

        tracing::info!(identity, key = %key, "cache miss, fetching");
        let body = self.download(identity, request).await?;
        let written = self.cache.store_bytes(&key, &body).await?;
        tracing::debug!(identity, key = %key, bytes = written, "cached response");

        Ok(self.cache.open(&key).await?)
    }

    /// Fetches a resource using the identity its request spec declares
    pub async fn fetch_request(&self, request: &dyn RequestSpec) -> FetchResult<File> {
        let identity = request.identity();
        self.fetch(&identity, request).await
    }

    /// Fetches a resource and reads the cached entry fully into memory
    pub async fn fetch_bytes(&self, request: &dyn RequestSpec) -> FetchResult<Vec<u8>> {
        let identity = request.identity();
        let mut file = self.fetch(&identity, request).await?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)
            .await
            .map_err(|source| crate::cache::CacheError::Io {
                key: ResourceKey::from_identity(&identity),
                source,
            })?;
        Ok(content)
    }

    /// Fetches a resource as text, replacing invalid UTF-8 sequences
    pub async fn fetch_text(&self, request: &dyn RequestSpec) -> FetchResult<String> {
        let bytes = self.fetch_bytes(request).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn download(&self, identity: &str, request: &dyn RequestSpec) -> FetchResult<Vec<u8>> {
        let transport = |source| FetchError::Transport {
            identity: identity.to_string(),
            source,
        };

        let response = request
            .build(&self.client)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(identity, status = status.as_u16(), "unexpected status");
            return Err(FetchError::Status {
                identity: identity.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        Ok(body.to_vec())
    }
}
