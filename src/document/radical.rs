//! Radical index and radical query parsing

use crate::document::{element_text, selector, DocumentResult};
use crate::storage::RadicalCharacter;
use scraper::Html;
use serde::Deserialize;

/// One group of a radical query response
#[derive(Debug, Deserialize)]
struct RadicalGroup {
    #[serde(rename = "RadicalCharacterArray", default)]
    characters: Vec<RadicalCharacter>,
}

/// Extracts the query values behind the radical index links
///
/// Every `<a href data-action="...">` on the index page names one radical the
/// site's script would query for. Empty values are skipped; order and
/// duplicates are kept as they appear on the page.
pub fn extract_query_values(html: &str) -> DocumentResult<Vec<String>> {
    let document = Html::parse_document(html);
    let links = selector("a[href][data-action]")?;

    let values = document
        .select(&links)
        .filter_map(|element| {
            let value = element.value().attr("data-action")?.trim();
            if value.is_empty() {
                tracing::trace!(text = %element_text(&element), "skipping link without query value");
                None
            } else {
                Some(value.to_string())
            }
        })
        .collect();

    Ok(values)
}

/// Decodes a radical query response into radical→character links
///
/// The response is a JSON array of groups, each carrying a
/// `RadicalCharacterArray` of `{zi, bushou, url, py, num}` objects. Links
/// are returned flattened, in response order.
pub fn decode_radical_response(body: &[u8]) -> DocumentResult<Vec<RadicalCharacter>> {
    let groups: Vec<RadicalGroup> = serde_json::from_slice(body)?;
    Ok(groups
        .into_iter()
        .flat_map(|group| group.characters)
        .collect())
}
