//! Page label tokenizer
//!
//! A label is the part of a page's file name after its page-number field.
//! It holds zero or more outline entries, each optionally introduced by a
//! level marker:
//!
//! ```text
//! p.005 2 title ※note ❶2.1 title
//!       ^^^^^^^^^^^^^^ ^^^^^^^^^^^
//!       level 0        level 1
//! ```

use crate::constants::{LEVEL_MARKERS, NOTE_DELIMITER, marker_level};
use crate::types::{LabelToken, PageLabel};
use regex::Regex;
use std::sync::LazyLock;

/// One optional marker followed by a run of non-marker characters
static ENTRY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let markers: String = LEVEL_MARKERS.iter().collect();
    Regex::new(&format!("[{markers}]?[^{markers}]+")).expect("valid label entry regex")
});

/// Split a raw label into outline tokens
///
/// Entries whose title is empty once the marker, the note and surrounding
/// whitespace are removed produce no token.
pub fn tokenize(raw_label: &str) -> Vec<LabelToken> {
    ENTRY_PATTERN
        .find_iter(raw_label)
        .filter_map(|entry| parse_entry(entry.as_str()))
        .collect()
}

fn parse_entry(entry: &str) -> Option<LabelToken> {
    let mut chars = entry.chars();
    let (level, body) = match chars.next().and_then(marker_level) {
        Some(level) => (level, chars.as_str()),
        None => (0, entry),
    };

    let title = match body.split_once(NOTE_DELIMITER) {
        Some((title, _note)) => title,
        None => body,
    };

    LabelToken::new(level, title).ok()
}

/// Label part of a file stem: everything after the first whitespace-delimited field
///
/// `"p.001 1 title"` gives `"1 title"`; a stem without a second field gives `""`.
pub fn page_label(stem: &str) -> &str {
    stem.trim_start()
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim_start())
        .unwrap_or("")
}

/// Tokenize the labels of an ordered list of file stems
///
/// The position of each stem in the iterator becomes its page index.
pub fn page_labels<I, S>(stems: I) -> Vec<PageLabel>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    stems
        .into_iter()
        .enumerate()
        .map(|(page_index, stem)| PageLabel::new(page_index, tokenize(page_label(stem.as_ref()))))
        .collect()
}
