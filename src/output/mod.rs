//! Output module for reporting crawl results
//!
//! This module handles:
//! - Reading record counts back from storage (`--stats`)
//! - Printing the summary of a finished run

pub mod stats;

pub use stats::{load_statistics, print_run_summary, print_statistics, CrawlStatistics};
