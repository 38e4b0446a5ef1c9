//! Crawl pipeline
//!
//! Stages run as independent tokio tasks connected by bounded channels:
//!
//! ```text
//! discovery ──C1──▶ character details ──C2──▶ orchestrator
//! ```
//!
//! Every channel carries `Message<T>`; a stage always finishes its output
//! with `Message::EndOfStream`, however its work loop ends. Per-item failures
//! are logged, counted in the stage's `StageReport` and skipped.

mod detail;
mod discovery;
mod gate;
mod message;
mod stage;
#[cfg(test)]
mod testing;

pub use detail::CharacterDetails;
pub use discovery::{RadicalQueries, StoredRadicals};
pub use gate::{persist_if_absent, Persist, PersistOutcome};
pub use message::{channel, Message};
pub use stage::{spawn_stage, Emitter, StageInput, StageReport};
