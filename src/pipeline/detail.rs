//! Character detail stage
//!
//! For every radical link: resolve the detail page URL, fetch it through the
//! cache, extract a fresh `Character` record, pass it through the gate and
//! forward it.

use crate::document::parse_character;
use crate::net::GetPage;
use crate::pipeline::{persist_if_absent, Emitter, StageInput, StageReport};
use crate::storage::{Character, RadicalCharacter, SharedStorage};
use crate::url::join_url;
use crate::Fetcher;
use tokio_util::sync::CancellationToken;

pub struct CharacterDetails {
    fetcher: Fetcher,
    storage: SharedStorage,
    base_url: String,
    cancel: CancellationToken,
}

impl CharacterDetails {
    pub const NAME: &'static str = "character_details";

    pub fn new(
        fetcher: Fetcher,
        storage: SharedStorage,
        base_url: impl Into<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            fetcher,
            storage,
            base_url: base_url.into(),
            cancel,
        }
    }

    /// Processes links until the input ends or the run is cancelled
    ///
    /// A link whose page cannot be fetched, parsed or stored is logged,
    /// counted as failed and skipped. Records already stored are forwarded
    /// without being written again.
    pub async fn run(
        self,
        mut input: StageInput<RadicalCharacter>,
        out: Emitter<Character>,
    ) -> StageReport {
        let mut report = StageReport::new(Self::NAME);

        while let Some(link) = input.recv_or_cancel(&self.cancel).await {
            report.received += 1;

            let record = match self.process(&link).await {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(url = %link.url, ch = %link.character, error = %e, "skipping character");
                    report.failed += 1;
                    continue;
                }
            };

            match persist_if_absent(&self.storage, &record) {
                Ok(outcome) => report.record_persist(outcome),
                Err(e) => {
                    tracing::error!(ch = %record.ch, error = %e, "failed to store character");
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

        if !input.is_finished() {
            tracing::info!("character details cancelled");
            report.cancelled = true;
        }

        report
    }

    async fn process(&self, link: &RadicalCharacter) -> crate::Result<Character> {
        let url = join_url(&self.base_url, &[&link.url]);
        let html = self.fetcher.fetch_text(&GetPage::new(url)).await?;
        Ok(parse_character(&html, Character::seeded_from(link))?)
    }
}
