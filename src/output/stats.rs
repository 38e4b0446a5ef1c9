//! Statistics from the crawl database
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::storage::Storage;
use crate::{Result, RunSummary};

/// Number of records persisted so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Radical → character links found by discovery
    pub radical_characters: u64,

    /// Character detail records
    pub characters: u64,
}

impl CrawlStatistics {
    /// Links whose character has no detail record yet
    ///
    /// Several links can point at the same character, so this is a lower
    /// bound of the work left rather than an exact count.
    pub fn pending(&self) -> u64 {
        self.radical_characters.saturating_sub(self.characters)
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(ExcavatorError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<CrawlStatistics> {
    Ok(CrawlStatistics {
        radical_characters: storage.count_radical_characters()?,
        characters: storage.count_characters()?,
    })
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Records:");
    println!("  Radical links: {}", stats.radical_characters);
    println!("  Characters: {}", stats.characters);
    println!();

    let coverage = if stats.radical_characters > 0 {
        (stats.characters as f64 / stats.radical_characters as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Coverage: {:.1}% ({} / {} radical links have a character record)",
        coverage, stats.characters, stats.radical_characters
    );
}

/// Prints the outcome of a run, one line per stage
pub fn print_run_summary(summary: &RunSummary) {
    println!("=== Run Summary ({}) ===\n", summary.step);

    for stage in &summary.stages {
        println!("{}:", stage.stage);
        println!("  Received: {}", stage.received);
        println!("  Emitted: {}", stage.emitted);
        println!("  Inserted: {}", stage.inserted);
        println!("  Already stored: {}", stage.already_present);
        println!("  Failed: {}", stage.failed);
        if stage.cancelled {
            println!("  Cancelled");
        }
        if let Some(error) = &stage.error {
            println!("  Stopped early: {}", error);
        }
        println!();
    }

    println!("Drained: {}", summary.drained);
}
