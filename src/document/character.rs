//! Character detail page extraction
//!
//! A detail page carries its data in three places:
//!
//! | Selector | Content |
//! |----------|---------|
//! | `div.info > p.mui-ellipsis` | Summary line of `label：value` pairs |
//! | `ul.hanyu-cha-info > li` | One `label：value` pair per item |
//! | `ul.hanyu-cha-ul > li` | Free-text dictionary notes |
//!
//! A page with none of them is rejected; anything else is best effort.

use crate::document::{element_text, selector, DocumentError, DocumentResult};
use crate::storage::Character;
use scraper::Html;

const SUMMARY_SELECTOR: &str = "div.info > p.mui-ellipsis";
const INFO_SELECTOR: &str = "div > ul.hanyu-cha-info > li";
const NOTES_SELECTOR: &str = "div > ul.hanyu-cha-ul > li";

/// Fills `record` from a character detail page
///
/// `record` should be a fresh record seeded from the discovery link; fields
/// the page supplies overwrite the seed, the rest keep their seeded value.
///
/// # Example
///
/// ```
/// use excavator::document::parse_character;
/// use excavator::storage::Character;
///
/// let html = r#"<div class="info"><p class="mui-ellipsis">拼音：zhōng 部首：丨 总笔画：4</p></div>"#;
/// let seed = Character { ch: "中".to_string(), ..Character::default() };
/// let ch = parse_character(html, seed).unwrap();
/// assert_eq!(ch.radical, "丨");
/// assert_eq!(ch.total_strokes, Some(4));
/// ```
pub fn parse_character(html: &str, mut record: Character) -> DocumentResult<Character> {
    let document = Html::parse_document(html);
    let mut found = false;

    let summary = selector(SUMMARY_SELECTOR)?;
    for element in document.select(&summary) {
        found = true;
        for (label, value) in labelled_fields(&element_text(&element)) {
            apply_field(&mut record, &label, &value);
        }
    }

    let info = selector(INFO_SELECTOR)?;
    for element in document.select(&info) {
        found = true;
        if let Some((label, value)) = split_label(&element_text(&element)) {
            apply_field(&mut record, label, value);
        }
    }

    let notes = selector(NOTES_SELECTOR)?;
    for element in document.select(&notes) {
        found = true;
        let text = element_text(&element);
        if !text.is_empty() {
            record.comments.push(text);
        }
    }

    if !found {
        return Err(DocumentError::NoCharacterData { ch: record.ch });
    }

    Ok(record)
}

/// Splits `label：value` (full-width or ASCII colon)
fn split_label(text: &str) -> Option<(&str, &str)> {
    let (index, colon) = text.char_indices().find(|(_, c)| *c == '：' || *c == ':')?;
    let label = text[..index].trim();
    if label.is_empty() {
        return None;
    }
    Some((label, text[index + colon.len_utf8()..].trim()))
}

/// Splits a summary line into `(label, value)` pairs
///
/// A whitespace-separated token containing a colon starts a new field; other
/// tokens extend the value of the current one, so multi-word values such as
/// several readings survive.
fn labelled_fields(text: &str) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = Vec::new();

    for token in text.split_whitespace() {
        if let Some((label, value)) = split_label(token) {
            fields.push((label.to_string(), value.to_string()));
        } else if let Some((_, value)) = fields.last_mut() {
            if !value.is_empty() {
                value.push(' ');
            }
            value.push_str(token);
        }
    }

    fields
}

fn apply_field(record: &mut Character, label: &str, value: &str) {
    let value = clean_value(value);
    if value.is_empty() {
        return;
    }

    match label {
        "拼音" | "读音" => record.pinyin = split_list(value),
        "部首" => record.radical = value.to_string(),
        "部外" | "部外笔画" => record.radical_strokes = parse_count(value),
        "总笔画" | "笔画" => record.total_strokes = parse_count(value),
        "康熙" | "康熙字典" => record.kangxi = Some(value.to_string()),
        "康熙笔画" => record.kangxi_strokes = parse_count(value),
        "五行" => record.wuxing = Some(value.to_string()),
        "吉凶" => record.lucky = Some(value.to_string()),
        "繁体" => record.traditional = Some(value.to_string()),
        "异体" | "异体字" => record.variants = split_list(value),
        _ => tracing::trace!(label, value, "ignoring unknown field"),
    }
}

fn clean_value(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | '，' | ';' | '；' | '。'))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '，' | '、'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_count(value: &str) -> Option<u32> {
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
