//! Line tokenizer: turns a response blob into candidate record lines.

use tracing::debug;

/// Leading list markers the model uses in front of records.
const BULLETS: &[char] = &['-', '*', '•', '–', '—'];

/// A cleaned record line and its 1-based position in the response.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Line<'a> {
    pub number: usize,
    pub text: &'a str,
}

/// Yield the lines of `text` that can hold a record.
///
/// Each line is trimmed and loses its bullet and ordinal prefix. Blank lines
/// and lines without `separator` are dropped here, before any field
/// splitting happens.
pub fn candidate_lines(text: &str, separator: char) -> impl Iterator<Item = Line<'_>> {
    text.lines().enumerate().filter_map(move |(idx, raw)| {
        let cleaned = strip_line_noise(raw);
        if cleaned.is_empty() {
            return None;
        }
        if !cleaned.contains(separator) {
            debug!(line = idx + 1, "skipping line without '{separator}' separator");
            return None;
        }
        Some(Line {
            number: idx + 1,
            text: cleaned,
        })
    })
}

/// Strip surrounding whitespace, bullet markers and `1.` / `2)` numbering.
///
/// Markers may be stacked (`- 1. word`); digits followed by `.` and another
/// digit are treated as content (`1.5`), not numbering.
pub fn strip_line_noise(raw: &str) -> &str {
    let mut rest = raw.trim();
    loop {
        let unbulleted = rest.trim_start_matches(BULLETS).trim_start();
        let unnumbered = strip_ordinal(unbulleted).unwrap_or(unbulleted);
        if unnumbered.len() == rest.len() {
            return rest;
        }
        rest = unnumbered;
    }
}

fn strip_ordinal(s: &str) -> Option<&str> {
    let end = s
        .char_indices()
        .find(|(_, c)| !is_digit(*c))
        .map(|(idx, _)| idx)?;
    if end == 0 {
        return None;
    }
    let rest = s[end..].strip_prefix(|c: char| c == '.' || c == ')')?;
    if rest.starts_with(is_digit) {
        return None;
    }
    Some(rest.trim_start())
}

// ASCII and Arabic-Indic digits.
fn is_digit(c: char) -> bool {
    c.is_ascii_digit() || ('\u{0660}'..='\u{0669}').contains(&c)
}
