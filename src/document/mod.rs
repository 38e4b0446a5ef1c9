//! Document parsing for dictionary pages
//!
//! Turns cached page bytes into records:
//! - the radical index page yields query values (`a[data-action]`)
//! - a radical query response (JSON) yields radical→character links
//! - a character detail page yields a character record
//!
//! Selectors and label names follow the site's markup and carry no meaning
//! for the rest of the pipeline.

mod character;
mod radical;

pub use character::parse_character;
pub use radical::{decode_radical_response, extract_query_values};

use thiserror::Error;

/// Errors raised while extracting fields from a document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid selector {selector}: {message}")]
    Selector { selector: String, message: String },

    #[error("Malformed radical response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No character data found on page for {ch}")]
    NoCharacterData { ch: String },
}

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;

pub(crate) fn selector(css: &str) -> DocumentResult<scraper::Selector> {
    scraper::Selector::parse(css).map_err(|e| DocumentError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

/// Collects an element's text with runs of whitespace collapsed to one space
pub(crate) fn element_text(element: &scraper::ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(|text| text.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}
