//! Run orchestration
//!
//! The `Excavator` owns everything a run shares: the workspace, the storage
//! handle and the cancellation token. `run` wires the stages for the requested
//! step and drains the last channel until its end-of-stream marker.
//!
//! ```text
//! all:        radical queries ──C1──▶ character details ──C2──▶ drain
//! radical:    radical queries ──C1──▶ drain
//! character:  stored radicals ──C1──▶ character details ──C2──▶ drain
//! ```

use crate::cache::ContentCache;
use crate::config::Config;
use crate::net::build_http_client;
use crate::pipeline::{
    channel, spawn_stage, CharacterDetails, Message, RadicalQueries, StageInput, StageReport,
    StoredRadicals,
};
use crate::storage::{shared, SharedStorage, SqliteStorage};
use crate::url::join_url;
use crate::{ExcavatorError, Fetcher, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use crate::config::RadicalType;

/// Which part of the crawl to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Step {
    /// Radical queries feeding the character detail stage
    #[default]
    All,
    /// Radical queries only
    Radical,
    /// Character details for radical links stored by an earlier run
    Character,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Radical => "radical",
            Self::Character => "character",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "radical" => Ok(Self::Radical),
            "character" => Ok(Self::Character),
            other => Err(format!(
                "unknown step '{}' (expected all, radical or character)",
                other
            )),
        }
    }
}

/// Outcome of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub step: Step,

    /// One report per stage, in pipeline order
    pub stages: Vec<StageReport>,

    /// Items drained from the last channel
    pub drained: u64,
}

impl RunSummary {
    pub fn total_inserted(&self) -> u64 {
        self.stages.iter().map(|s| s.inserted).sum()
    }

    pub fn total_failed(&self) -> u64 {
        self.stages.iter().map(|s| s.failed).sum()
    }

    pub fn cancelled(&self) -> bool {
        self.stages.iter().any(|s| s.cancelled)
    }

    /// True if every stage ran to completion without dropping anything
    pub fn is_clean(&self) -> bool {
        self.stages.iter().all(StageReport::is_clean)
    }

    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == name)
    }
}

/// Crawl orchestrator
pub struct Excavator {
    config: Config,
    storage: Option<SharedStorage>,
    cancel: CancellationToken,
}

impl Excavator {
    /// Creates an orchestrator
    ///
    /// Nothing is opened or created until `run`; the SQLite database named in
    /// the configuration is opened then unless a storage handle was supplied
    /// with `with_storage`.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            storage: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `storage` instead of the configured database
    pub fn with_storage(mut self, storage: SharedStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Token that stops the run when cancelled
    ///
    /// Stages finish the item in hand, end their output and report
    /// themselves as cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn workspace(&self) -> &Path {
        Path::new(&self.config.excavator.workspace)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.workspace().join(&self.config.excavator.cache_dir)
    }

    /// Radical index page for the configured radical type
    pub fn index_url(&self) -> String {
        let radical_type = self.config.excavator.radical_type;
        format!(
            "{}/",
            join_url(&self.config.excavator.base_url, &[radical_type.index_path()])
        )
    }

    /// Endpoint radical queries are posted to
    pub fn query_url(&self) -> &str {
        &self.config.excavator.base_url
    }

    /// Runs one step of the crawl to completion
    ///
    /// Failing to create the workspace or open storage aborts the run before
    /// any stage starts. Once the stages run, per-item failures only show up
    /// in the summary.
    pub async fn run(&mut self, step: Step) -> Result<RunSummary> {
        if self.cancel.is_cancelled() {
            return Err(ExcavatorError::Cancelled);
        }

        let (fetcher, storage) = self.prepare().await?;
        let capacity = self.config.excavator.channel_capacity;

        tracing::info!(
            step = %step,
            base_url = %self.config.excavator.base_url,
            radical_type = self.config.excavator.radical_type.as_str(),
            "starting run"
        );

        let mut handles = Vec::new();
        let (c1_tx, c1_rx) = channel(capacity);

        if step == Step::Character {
            let stage = StoredRadicals::new(
                storage.clone(),
                self.config.excavator.batch_size,
                self.cancel.clone(),
            );
            handles.push(spawn_stage(StoredRadicals::NAME, c1_tx, |out| stage.run(out)));
        } else {
            let stage = RadicalQueries::new(
                fetcher.clone(),
                storage.clone(),
                self.index_url(),
                self.query_url(),
                self.cancel.clone(),
            );
            handles.push(spawn_stage(RadicalQueries::NAME, c1_tx, |out| stage.run(out)));
        }

        let drained = if step == Step::Radical {
            drain(c1_rx).await
        } else {
            let (c2_tx, c2_rx) = channel(capacity);
            let stage = CharacterDetails::new(
                fetcher,
                storage,
                &self.config.excavator.base_url,
                self.cancel.clone(),
            );
            let input = StageInput::new(CharacterDetails::NAME, c1_rx);
            handles.push(spawn_stage(CharacterDetails::NAME, c2_tx, |out| {
                stage.run(input, out)
            }));
            drain(c2_rx).await
        };

        let summary = RunSummary {
            step,
            stages: join_stages(handles).await?,
            drained,
        };

        tracing::info!(
            step = %step,
            drained = summary.drained,
            inserted = summary.total_inserted(),
            failed = summary.total_failed(),
            cancelled = summary.cancelled(),
            "run finished"
        );

        Ok(summary)
    }

    /// Creates the cache directory and opens storage
    async fn prepare(&mut self) -> Result<(Fetcher, SharedStorage)> {
        let cache_dir = self.cache_dir();
        tokio::fs::create_dir_all(&cache_dir)
            .await
            .map_err(|source| ExcavatorError::Workspace {
                path: cache_dir.display().to_string(),
                source,
            })?;

        let storage = match &self.storage {
            Some(storage) => storage.clone(),
            None => {
                let path = Path::new(&self.config.output.database_path);
                tracing::info!(path = %path.display(), "opening database");
                let storage = shared(SqliteStorage::new(path)?);
                self.storage = Some(storage.clone());
                storage
            }
        };

        let client = build_http_client(&self.config.http)?;
        let cache = ContentCache::new(cache_dir);
        let fetcher = Fetcher::with_cancellation(client, cache, self.cancel.clone());

        Ok((fetcher, storage))
    }
}

/// Reads a channel until its end-of-stream marker, returning the item count
async fn drain<T>(rx: mpsc::Receiver<Message<T>>) -> u64 {
    let mut input = StageInput::new("orchestrator", rx);
    let mut count = 0;
    while input.recv().await.is_some() {
        count += 1;
    }
    count
}

async fn join_stages(handles: Vec<JoinHandle<StageReport>>) -> Result<Vec<StageReport>> {
    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        let report = handle.await.map_err(|e| ExcavatorError::Stage {
            stage: "runner".to_string(),
            message: e.to_string(),
        })?;
        reports.push(report);
    }
    Ok(reports)
}
