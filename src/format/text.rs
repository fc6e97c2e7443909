//! Pure text helpers: truncation, indentation and previews.
//!
//! Lengths are counted in Unicode scalar values so multibyte content is
//! never split mid-character.

use std::borrow::Cow;

use super::contract::{TRUNCATION_MARKER_PREFIX, TRUNCATION_MARKER_SUFFIX};
use crate::session::DetailLevel;

/// Longest single-line preview used by the minimal tier.
pub const PREVIEW_CHARS: usize = 80;

/// Cut `text` to `max_len` characters and append a marker recording the
/// original length. Verbose output is never truncated.
pub fn truncate(text: &str, max_len: usize, detail: DetailLevel) -> Cow<'_, str> {
    if detail == DetailLevel::Verbose {
        return Cow::Borrowed(text);
    }
    let original = text.chars().count();
    if original <= max_len {
        return Cow::Borrowed(text);
    }
    let prefix: String = text.chars().take(max_len).collect();
    Cow::Owned(format!(
        "{}{}{}{}",
        prefix, TRUNCATION_MARKER_PREFIX, original, TRUNCATION_MARKER_SUFFIX
    ))
}

/// Recover the original length recorded by [`truncate`], if present.
pub fn truncated_length(text: &str) -> Option<usize> {
    let start = text.rfind(TRUNCATION_MARKER_PREFIX)? + TRUNCATION_MARKER_PREFIX.len();
    let rest = &text[start..];
    let end = rest.find(TRUNCATION_MARKER_SUFFIX)?;
    rest[..end].parse().ok()
}

/// Prefix every non-blank line with `indent_size * level` spaces.
///
/// Blank lines are emitted empty so trailing whitespace never appears.
pub fn indent(text: &str, level: usize, indent_size: usize) -> String {
    let pad = " ".repeat(indent_size * level);
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strip up to `width` leading spaces from every line.
pub fn dedent(lines: &[&str], width: usize) -> String {
    lines
        .iter()
        .map(|line| {
            let strip = line
                .chars()
                .take(width)
                .take_while(|c| *c == ' ')
                .count();
            &line[strip..]
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse all whitespace runs (including newlines) into single spaces.
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Single-line preview no longer than `max_len` characters plus an ellipsis.
pub fn preview(text: &str, max_len: usize) -> String {
    let flat = single_line(text);
    if flat.chars().count() <= max_len {
        flat
    } else {
        let cut: String = flat.chars().take(max_len).collect();
        format!("{}...", cut)
    }
}
