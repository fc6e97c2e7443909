//! The textual record format shared by the formatter and the analyzer.
//!
//! ```text
//! ================================================================================
//! [2026-01-19 10:00:00.123] TOOL_EXECUTION Session: 20260119-100000-1a2b3c4d [+1.250s]
//! Tool: search
//! Status: success
//! Duration: 0.532s
//! Input:
//!   {"q": "rust"}
//! Output:
//!   3 results
//! ```
//!
//! Minimal records are a single header line with ` | Label: value` segments.

use chrono::{DateTime, Local, NaiveDateTime};
use std::time::Duration;

/// Fixed-width rule line that opens every normal/verbose block.
pub const SEPARATOR: &str =
    "================================================================================";

/// Local time with millisecond precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Joins segments of a minimal record.
pub const SEGMENT_DELIMITER: &str = " | ";

pub const TRUNCATION_MARKER_PREFIX: &str = "... [truncated, original length: ";
pub const TRUNCATION_MARKER_SUFFIX: &str = " chars]";

/// Body field labels.
pub mod label {
    pub const SESSION: &str = "Session";
    pub const QUERY: &str = "Query";
    pub const INTENT: &str = "Intent";
    pub const REQUIRES_TOOLS: &str = "Requires Tools";
    pub const CONFIDENCE: &str = "Confidence";
    pub const REASONING: &str = "Reasoning";
    pub const TOOL: &str = "Tool";
    pub const RATIONALE: &str = "Rationale";
    pub const STATUS: &str = "Status";
    pub const DURATION: &str = "Duration";
    pub const INPUT: &str = "Input";
    pub const OUTPUT: &str = "Output";
    pub const MODEL: &str = "Model";
    pub const TOKENS: &str = "Tokens";
    pub const PROMPT: &str = "Prompt";
    pub const RESPONSE: &str = "Response";
    pub const ERROR_TYPE: &str = "Error Type";
    pub const MESSAGE: &str = "Message";
    pub const STACK_TRACE: &str = "Stack Trace";
    pub const TOTAL_DURATION: &str = "Total Duration";
    pub const ANSWER: &str = "Answer";

    pub const ALL: &[&str] = &[
        SESSION,
        QUERY,
        INTENT,
        REQUIRES_TOOLS,
        CONFIDENCE,
        REASONING,
        TOOL,
        RATIONALE,
        STATUS,
        DURATION,
        INPUT,
        OUTPUT,
        MODEL,
        TOKENS,
        PROMPT,
        RESPONSE,
        ERROR_TYPE,
        MESSAGE,
        STACK_TRACE,
        TOTAL_DURATION,
        ANSWER,
    ];

    pub fn is_known(candidate: &str) -> bool {
        ALL.contains(&candidate)
    }
}

pub fn format_timestamp(timestamp: &DateTime<Local>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT).ok()
}

/// Seconds with millisecond precision, as written in `Duration:` fields.
pub fn format_seconds(duration: Duration) -> String {
    format!("{:.3}s", duration.as_secs_f64())
}

/// Parse a `1.234s` value back into seconds.
pub fn parse_seconds(text: &str) -> Option<f64> {
    let text = text.trim();
    let number = text.strip_suffix('s').unwrap_or(text);
    number.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Render the header line shared by every tier.
pub fn header(
    timestamp: &DateTime<Local>,
    event_label: &str,
    session_id: Option<&str>,
    elapsed: Option<Duration>,
) -> String {
    let mut line = format!("[{}] {}", format_timestamp(timestamp), event_label);
    if let Some(id) = session_id {
        line.push_str(&format!(" {}: {}", label::SESSION, id));
    }
    if let Some(elapsed) = elapsed {
        line.push_str(&format!(" [+{}]", format_seconds(elapsed)));
    }
    line
}
