//! JSON and CSV export of parsed entries.

use serde::Serialize;
use std::collections::BTreeMap;

use super::types::{LogEntry, MetaValue};

/// ISO-8601 local timestamp with milliseconds.
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

pub const CSV_HEADER: [&str; 8] = [
    "Timestamp",
    "Event Type",
    "Session ID",
    "Elapsed Time (s)",
    "Duration (s)",
    "Status",
    "Operation",
    "Details",
];

#[derive(Serialize)]
struct JsonEntry<'a> {
    timestamp: String,
    event_type: &'static str,
    session_id: Option<&'a str>,
    elapsed_time: Option<f64>,
    metadata: &'a BTreeMap<String, MetaValue>,
    raw_content: &'a str,
}

impl<'a> From<&'a LogEntry> for JsonEntry<'a> {
    fn from(entry: &'a LogEntry) -> Self {
        Self {
            timestamp: entry.timestamp.format(ISO_FORMAT).to_string(),
            event_type: entry.event_type.label(),
            session_id: entry.session_id.as_deref(),
            elapsed_time: entry.elapsed,
            metadata: &entry.metadata,
            raw_content: &entry.raw,
        }
    }
}

/// Pretty-printed JSON array, one object per entry.
pub fn to_json(entries: &[LogEntry]) -> serde_json::Result<String> {
    let rows: Vec<JsonEntry<'_>> = entries.iter().map(JsonEntry::from).collect();
    serde_json::to_string_pretty(&rows)
}

/// CSV with a fixed header; absent values are empty cells.
pub fn to_csv(entries: &[LogEntry]) -> String {
    let mut out = String::new();
    push_row(&mut out, CSV_HEADER.iter().map(|s| s.to_string()));
    for entry in entries {
        push_row(
            &mut out,
            [
                entry.timestamp.format(ISO_FORMAT).to_string(),
                entry.event_type.label().to_string(),
                entry.session_id.clone().unwrap_or_default(),
                seconds(entry.elapsed),
                seconds(entry.duration()),
                entry.status().unwrap_or_default().to_string(),
                entry.operation().unwrap_or_default().to_string(),
                entry.details().unwrap_or_default(),
            ],
        );
    }
    out
}

fn seconds(value: Option<f64>) -> String {
    value.map(|v| format!("{:.3}", v)).unwrap_or_default()
}

fn push_row(out: &mut String, cells: impl IntoIterator<Item = String>) {
    let row: Vec<String> = cells.into_iter().map(|cell| escape(&cell)).collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

/// Quote a cell when it contains a delimiter, quote or line break.
fn escape(cell: &str) -> String {
    if cell.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
