//! Discovery stages
//!
//! Both stages produce `RadicalCharacter` links for the detail stage:
//!
//! - `StoredRadicals` pages through links persisted by an earlier run
//! - `RadicalQueries` asks the site for them, one scripted query per radical,
//!   and persists every link it has not seen before

use crate::document::{decode_radical_response, extract_query_values};
use crate::net::{FormQuery, GetPage};
use crate::pipeline::{persist_if_absent, Emitter, StageReport};
use crate::storage::{lock, RadicalCharacter, SharedStorage, StorageError};
use crate::Fetcher;
use tokio_util::sync::CancellationToken;

/// Replays stored radical links in insertion order
pub struct StoredRadicals {
    storage: SharedStorage,
    batch_size: usize,
    cancel: CancellationToken,
}

impl StoredRadicals {
    pub const NAME: &'static str = "stored_radicals";

    pub fn new(storage: SharedStorage, batch_size: usize, cancel: CancellationToken) -> Self {
        Self {
            storage,
            batch_size: batch_size.max(1),
            cancel,
        }
    }

    /// Emits every stored link, `batch_size` rows per storage query
    ///
    /// Pages up to the row count taken before the first batch. A failed batch
    /// query is logged, its rows counted as failed and paging moves on to the
    /// next offset. A poisoned storage lock ends the stage.
    pub async fn run(self, out: Emitter<RadicalCharacter>) -> StageReport {
        let mut report = StageReport::new(Self::NAME);

        let total = match lock(&self.storage).and_then(|guard| guard.count_radical_characters()) {
            Ok(total) => total as usize,
            Err(e) => {
                tracing::error!(error = %e, "cannot count stored radical links");
                report.error = Some(e.to_string());
                return report;
            }
        };
        tracing::info!(total, batch_size = self.batch_size, "replaying stored radical links");

        let mut offset = 0;
        while offset < total {
            if self.cancel.is_cancelled() {
                tracing::info!(offset, "stored radical discovery cancelled");
                report.cancelled = true;
                break;
            }

            // The guard must be gone before emitting, or the detail stage
            // would wait on the lock while we wait on the channel.
            let batch = match lock(&self.storage)
                .and_then(|guard| guard.find_radical_characters(self.batch_size, offset))
            {
                Ok(batch) => batch,
                Err(StorageError::LockPoisoned) => {
                    tracing::error!(offset, "storage lock poisoned");
                    report.error = Some(StorageError::LockPoisoned.to_string());
                    return report;
                }
                Err(e) => {
                    let skipped = self.batch_size.min(total - offset);
                    tracing::error!(offset, limit = self.batch_size, error = %e, "failed to read batch");
                    report.failed += skipped as u64;
                    offset += self.batch_size;
                    continue;
                }
            };

            if batch.is_empty() {
                break;
            }

            tracing::debug!(offset, count = batch.len(), "read stored radical batch");
            offset += batch.len();
            report.received += batch.len() as u64;

            for record in batch {
                if let Err(e) = out.emit(record).await {
                    report.record_hang_up(&e, &self.cancel);
                    return report;
                }
                report.emitted += 1;
            }
        }

        report
    }
}

/// Discovers radical links through the site's radical query endpoint
pub struct RadicalQueries {
    fetcher: Fetcher,
    storage: SharedStorage,
    index_url: String,
    query_url: String,
    cancel: CancellationToken,
}

impl RadicalQueries {
    pub const NAME: &'static str = "radical_queries";

    /// # Arguments
    ///
    /// * `index_url` - Radical index page listing the query values
    /// * `query_url` - Endpoint the form queries are posted to
    pub fn new(
        fetcher: Fetcher,
        storage: SharedStorage,
        index_url: impl Into<String>,
        query_url: impl Into<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            fetcher,
            storage,
            index_url: index_url.into(),
            query_url: query_url.into(),
            cancel,
        }
    }

    /// Queries every radical on the index page and emits the links found
    ///
    /// Links already stored are not written again but are still emitted, so
    /// a rerun can pick up detail pages an earlier run never reached. A
    /// failed query or a link the gate could not write is counted and
    /// skipped. Only an unreadable index page ends the stage early.
    pub async fn run(self, out: Emitter<RadicalCharacter>) -> StageReport {
        let mut report = StageReport::new(Self::NAME);

        let values = match self.index_values().await {
            Ok(values) => values,
            Err(e) => {
                tracing::error!(url = %self.index_url, error = %e, "cannot read radical index");
                report.error = Some(e.to_string());
                return report;
            }
        };
        tracing::info!(url = %self.index_url, radicals = values.len(), "radical index loaded");

        for value in values {
            if self.cancel.is_cancelled() {
                tracing::info!("radical query discovery cancelled");
                report.cancelled = true;
                break;
            }

            let query = FormQuery::new(&self.query_url, &[("wd", value.as_str())])
                .with_referer(&self.index_url);

            let body = match self.fetcher.fetch_bytes(&query).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(radical = %value, error = %e, "radical query failed");
                    report.failed += 1;
                    continue;
                }
            };

            let records = match decode_radical_response(&body) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(radical = %value, error = %e, "unreadable radical query response");
                    report.failed += 1;
                    continue;
                }
            };
            tracing::debug!(radical = %value, count = records.len(), "radical query answered");

            for record in records {
                report.received += 1;

                match persist_if_absent(&self.storage, &record) {
                    Ok(outcome) => report.record_persist(outcome),
                    Err(e) => {
                        tracing::error!(url = %record.url, error = %e, "failed to store radical link");
                        report.failed += 1;
                        continue;
                    }
                }

                if let Err(e) = out.emit(record).await {
                    report.record_hang_up(&e, &self.cancel);
                    return report;
                }
                report.emitted += 1;
            }
        }

        report
    }

    async fn index_values(&self) -> crate::Result<Vec<String>> {
        let html = self.fetcher.fetch_text(&GetPage::new(&self.index_url)).await?;
        Ok(extract_query_values(&html)?)
    }
}
