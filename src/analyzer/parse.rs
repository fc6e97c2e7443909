//! Parser for the textual record format
//!
//! Records are delimited by the separator line. A header line that shows up
//! while a record is already open also starts a new record, which is how
//! single-line minimal records are picked up. Anything that fails to parse
//! is skipped.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::types::{key, LogEntry, MetaValue};
use crate::event::EventKind;
use crate::format::contract::{label, parse_seconds, parse_timestamp, SEGMENT_DELIMITER, SEPARATOR};
use crate::format::text::{dedent, truncated_length};

fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^\[(?P<ts>[^\]]+)\] (?P<kind>[A-Z_]+)(?: Session: (?P<sid>.+?))?(?: \[\+(?P<elapsed>[0-9]+(?:\.[0-9]+)?)s\])?(?P<rest> \| .*)?$",
        )
        .expect("header pattern is valid")
    })
}

struct Header<'a> {
    timestamp: &'a str,
    kind: &'a str,
    session: Option<&'a str>,
    elapsed: Option<&'a str>,
    rest: &'a str,
}

fn parse_header(line: &str) -> Option<Header<'_>> {
    if !line.starts_with('[') {
        return None;
    }
    let caps = header_pattern().captures(line)?;
    Some(Header {
        timestamp: caps.name("ts")?.as_str(),
        kind: caps.name("kind")?.as_str(),
        session: caps.name("sid").map(|m| m.as_str()),
        elapsed: caps.name("elapsed").map(|m| m.as_str()),
        rest: caps.name("rest").map_or("", |m| m.as_str()),
    })
}

/// Parse every record in `text`, in file order.
pub fn parse(text: &str) -> Vec<LogEntry> {
    let mut parser = Parser::default();
    for line in text.lines() {
        parser.feed(line);
    }
    parser.finish()
}

#[derive(Default)]
struct Parser<'a> {
    current: Vec<&'a str>,
    entries: Vec<LogEntry>,
    last_session: Option<String>,
}

impl<'a> Parser<'a> {
    fn feed(&mut self, line: &'a str) {
        if line == SEPARATOR {
            self.close();
            return;
        }
        if parse_header(line).is_some() && !self.current.is_empty() {
            self.close();
        }
        if self.current.is_empty() && line.trim().is_empty() {
            return;
        }
        self.current.push(line);
    }

    fn close(&mut self) {
        let lines = std::mem::take(&mut self.current);
        if lines.is_empty() {
            return;
        }
        match build_entry(&lines) {
            Some(mut entry) => {
                // Carry the last explicit session forward to records without one.
                match &entry.session_id {
                    Some(id) => self.last_session = Some(id.clone()),
                    None => entry.session_id = self.last_session.clone(),
                }
                self.entries.push(entry);
            }
            None => {
                tracing::debug!(first_line = lines[0], "skipping malformed log record");
            }
        }
    }

    fn finish(mut self) -> Vec<LogEntry> {
        self.close();
        self.entries
    }
}

fn build_entry(lines: &[&str]) -> Option<LogEntry> {
    let header = parse_header(lines[0])?;
    let timestamp = parse_timestamp(header.timestamp)?;
    let event_type = EventKind::from_label(header.kind)?;
    let elapsed = header.elapsed.and_then(|e| e.parse::<f64>().ok());

    let mut end = lines.len();
    while end > 1 && lines[end - 1].trim().is_empty() {
        end -= 1;
    }
    let lines = &lines[..end];

    let mut fields = segment_fields(header.rest);
    fields.extend(body_fields(&lines[1..]));
    // A label seen twice came from inside a value; the first one is real.
    let mut seen: Vec<&'static str> = Vec::with_capacity(fields.len());
    fields.retain(|(name, _)| {
        let first = !seen.contains(name);
        if first {
            seen.push(*name);
        }
        first
    });

    let session_id = header
        .session
        .map(str::to_string)
        .or_else(|| {
            fields
                .iter()
                .find(|(name, _)| *name == label::SESSION)
                .map(|(_, value)| value.trim().to_string())
        })
        .filter(|id| !id.is_empty());

    Some(LogEntry {
        timestamp,
        event_type,
        session_id,
        elapsed,
        metadata: metadata(&fields),
        raw: lines.join("\n"),
    })
}

/// Match `Label: value` or `Label:` for a known label at column 0.
fn split_label(line: &str) -> Option<(&'static str, Option<&str>)> {
    if line.starts_with(char::is_whitespace) {
        return None;
    }
    let (name, value) = match line.split_once(": ") {
        Some((name, value)) => (name, Some(value)),
        None => (line.strip_suffix(':')?, None),
    };
    let known = label::ALL.iter().find(|known| **known == name)?;
    Some((*known, value))
}

/// Fields of a minimal record, from the part of the header after the elapsed time.
fn segment_fields(rest: &str) -> Vec<(&'static str, String)> {
    let Some(body) = rest.strip_prefix(SEGMENT_DELIMITER) else {
        return Vec::new();
    };
    let mut fields: Vec<(&'static str, String)> = Vec::new();
    for segment in body.split(SEGMENT_DELIMITER) {
        match split_label(segment) {
            Some((name, Some(value))) => fields.push((name, value.to_string())),
            // The delimiter occurred inside a value.
            _ => {
                if let Some((_, value)) = fields.last_mut() {
                    value.push_str(SEGMENT_DELIMITER);
                    value.push_str(segment);
                }
            }
        }
    }
    fields
}

/// Fields of a block body: labeled lines, each optionally followed by an
/// indented payload.
fn body_fields(lines: &[&str]) -> Vec<(&'static str, String)> {
    let mut fields = Vec::new();
    let mut current: Option<(&'static str, Option<&str>, Vec<&str>)> = None;

    for &line in lines {
        if let Some((name, inline)) = split_label(line) {
            if let Some(done) = current.take() {
                fields.push(finish_field(done));
            }
            current = Some((name, inline, Vec::new()));
        } else if let Some((_, _, nested)) = current.as_mut() {
            nested.push(line);
        }
    }
    if let Some(done) = current {
        fields.push(finish_field(done));
    }
    fields
}

fn finish_field((name, inline, mut nested): (&'static str, Option<&str>, Vec<&str>)) -> (&'static str, String) {
    while nested.last().is_some_and(|line| line.trim().is_empty()) {
        nested.pop();
    }
    let width = nested
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);
    let payload = dedent(&nested, width);

    let value = match (inline, nested.is_empty()) {
        (Some(inline), true) => inline.to_string(),
        (Some(inline), false) => format!("{}\n{}", inline, payload),
        (None, _) => payload,
    };
    (name, value)
}

/// Metadata key for a field label.
fn field_key(name: &str) -> String {
    match name {
        label::TOOL => key::TOOL_NAME.to_string(),
        label::MESSAGE => key::ERROR_MESSAGE.to_string(),
        other => other.to_lowercase().replace(' ', "_"),
    }
}

fn metadata(fields: &[(&'static str, String)]) -> BTreeMap<String, MetaValue> {
    let mut meta = BTreeMap::new();

    for (name, value) in fields {
        if let Some(original) = truncated_length(value) {
            meta.insert(
                format!("{}{}", field_key(name), key::ORIGINAL_LENGTH_SUFFIX),
                MetaValue::Number(original as f64),
            );
        }

        match *name {
            label::QUERY => {
                meta.insert(key::QUERY.to_string(), text(value));
            }
            label::INTENT => {
                meta.insert(key::INTENT.to_string(), text(value));
            }
            label::REQUIRES_TOOLS => {
                meta.insert(key::REQUIRES_TOOLS.to_string(), text(value));
            }
            label::TOOL => {
                meta.insert(key::TOOL_NAME.to_string(), text(value));
            }
            label::STATUS => {
                meta.insert(key::STATUS.to_string(), text(value));
            }
            label::MODEL => {
                meta.insert(key::MODEL.to_string(), text(value));
            }
            label::ERROR_TYPE => {
                meta.insert(key::ERROR_TYPE.to_string(), text(value));
            }
            label::MESSAGE => {
                meta.insert(key::ERROR_MESSAGE.to_string(), text(value));
            }
            label::CONFIDENCE => {
                if let Ok(confidence) = value.trim().parse::<f64>() {
                    meta.insert(key::CONFIDENCE.to_string(), MetaValue::Number(confidence));
                }
            }
            label::DURATION => {
                if let Some(seconds) = parse_seconds(value) {
                    meta.insert(key::DURATION.to_string(), MetaValue::Number(seconds));
                }
            }
            label::TOTAL_DURATION => {
                if let Some(seconds) = parse_seconds(value) {
                    meta.insert(key::TOTAL_DURATION.to_string(), MetaValue::Number(seconds));
                }
            }
            label::TOKENS => {
                for (name, count) in parse_tokens(value) {
                    meta.insert(name.to_string(), MetaValue::Number(count));
                }
            }
            // Payloads stay in the raw record.
            _ => {}
        }
    }
    meta
}

fn text(value: &str) -> MetaValue {
    MetaValue::Text(value.trim().to_string())
}

/// `prompt=10, completion=5, total=15`
fn parse_tokens(value: &str) -> Vec<(&'static str, f64)> {
    value
        .split(',')
        .filter_map(|part| {
            let (name, count) = part.trim().split_once('=')?;
            let slot = match name.trim() {
                "prompt" => key::PROMPT_TOKENS,
                "completion" => key::COMPLETION_TOKENS,
                "total" => key::TOTAL_TOKENS,
                _ => return None,
            };
            Some((slot, count.trim().parse::<f64>().ok()?))
        })
        .collect()
}
