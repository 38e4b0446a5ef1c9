//! Stage runner
//!
//! A stage reads from at most one input channel and writes to exactly one
//! output channel. `spawn_stage` runs the stage body in its own task and, once
//! that task is over (finished, returned early, or panicked), writes
//! `EndOfStream` to the output so the consumer never waits forever.

use crate::pipeline::{Message, PersistOutcome};
use crate::ExcavatorError;
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// What a stage did, reported once it has terminated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    /// Stage name
    pub stage: String,

    /// Items read from the input channel (or storage, for discovery)
    pub received: u64,

    /// Items written to the output channel
    pub emitted: u64,

    /// Records newly written to storage
    pub inserted: u64,

    /// Records skipped because storage already had them
    pub already_present: u64,

    /// Items dropped because of a fetch, parse or storage failure
    pub failed: u64,

    /// The stage stopped because the run was cancelled
    pub cancelled: bool,

    /// The error that ended the stage early, if any
    pub error: Option<String>,
}

impl StageReport {
    pub fn new(stage: &str) -> Self {
        Self {
            stage: stage.to_string(),
            ..Self::default()
        }
    }

    /// Counts the outcome of a persistence gate call
    pub fn record_persist(&mut self, outcome: PersistOutcome) {
        match outcome {
            PersistOutcome::Inserted => self.inserted += 1,
            PersistOutcome::AlreadyExists => self.already_present += 1,
        }
    }

    /// Records that the consumer stopped taking items
    ///
    /// During a cancelled run the consumer leaving is expected and marks the
    /// stage as cancelled; otherwise it is the stage's error.
    pub fn record_hang_up(&mut self, error: &ExcavatorError, cancel: &CancellationToken) {
        if cancel.is_cancelled() {
            tracing::info!(stage = %self.stage, "consumer stopped after cancellation");
            self.cancelled = true;
        } else {
            tracing::warn!(stage = %self.stage, error = %error, "consumer gone");
            self.error = Some(error.to_string());
        }
    }

    /// True if nothing was dropped and the stage ran to completion
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.error.is_none() && !self.cancelled
    }
}

/// Receiving side of a stage's input channel
pub struct StageInput<T> {
    stage: &'static str,
    rx: mpsc::Receiver<Message<T>>,
    finished: bool,
}

impl<T> StageInput<T> {
    pub fn new(stage: &'static str, rx: mpsc::Receiver<Message<T>>) -> Self {
        Self {
            stage,
            rx,
            finished: false,
        }
    }

    /// Receives the next item, or `None` once the input is exhausted
    ///
    /// A channel whose senders all went away without sending `EndOfStream`
    /// is treated as exhausted too, with a warning.
    pub async fn recv(&mut self) -> Option<T> {
        if self.finished {
            return None;
        }

        match self.rx.recv().await {
            Some(Message::Item(item)) => Some(item),
            Some(Message::EndOfStream) => {
                self.finished = true;
                None
            }
            None => {
                tracing::warn!(stage = self.stage, "input closed without end of stream");
                self.finished = true;
                None
            }
        }
    }

    /// Like `recv`, but gives up as soon as `cancel` fires
    pub async fn recv_or_cancel(&mut self, cancel: &CancellationToken) -> Option<T> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            item = self.recv() => item,
        }
    }

    /// True once the end of the input has been observed
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Sending side of a stage's output channel
///
/// Only items can be sent through an emitter; the end-of-stream marker is
/// written by the runner.
pub struct Emitter<T> {
    stage: &'static str,
    tx: mpsc::Sender<Message<T>>,
}

impl<T> Emitter<T> {
    pub fn stage(&self) -> &'static str {
        self.stage
    }

    /// Sends one item downstream, waiting while the consumer is busy
    ///
    /// Fails once the consumer has gone away; nothing the stage produces after
    /// that can be delivered.
    pub async fn emit(&self, item: T) -> Result<(), ExcavatorError> {
        self.tx
            .send(Message::Item(item))
            .await
            .map_err(|_| ExcavatorError::DownstreamClosed {
                stage: self.stage.to_string(),
            })
    }
}

/// Spawns a stage
///
/// `body` receives the stage's emitter and returns its report. The returned
/// handle resolves to that report after `EndOfStream` has been sent.
///
/// # Example
///
/// ```
/// use excavator::pipeline::{channel, spawn_stage, Message, StageInput, StageReport};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (tx, rx) = channel::<u32>(1);
/// let handle = spawn_stage("numbers", tx, |emitter| async move {
///     let mut report = StageReport::new("numbers");
///     for n in 0..3 {
///         if emitter.emit(n).await.is_ok() {
///             report.emitted += 1;
///         }
///     }
///     report
/// });
///
/// let mut input = StageInput::new("consumer", rx);
/// let mut seen = Vec::new();
/// while let Some(n) = input.recv().await {
///     seen.push(n);
/// }
/// assert_eq!(seen, vec![0, 1, 2]);
/// assert_eq!(handle.await.unwrap().emitted, 3);
/// # }
/// ```
pub fn spawn_stage<T, F, Fut>(
    name: &'static str,
    output: mpsc::Sender<Message<T>>,
    body: F,
) -> JoinHandle<StageReport>
where
    T: Send + 'static,
    F: FnOnce(Emitter<T>) -> Fut,
    Fut: Future<Output = StageReport> + Send + 'static,
{
    let emitter = Emitter {
        stage: name,
        tx: output.clone(),
    };
    let work = tokio::spawn(body(emitter));

    tokio::spawn(async move {
        tracing::debug!(stage = name, "stage started");

        let report = match work.await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(stage = name, error = %e, "stage task died");
                StageReport {
                    error: Some(e.to_string()),
                    ..StageReport::new(name)
                }
            }
        };

        if output.send(Message::EndOfStream).await.is_err() {
            tracing::debug!(stage = name, "consumer gone before end of stream");
        }

        tracing::info!(
            stage = name,
            received = report.received,
            emitted = report.emitted,
            inserted = report.inserted,
            already_present = report.already_present,
            failed = report.failed,
            "stage finished"
        );

        report
    })
}
