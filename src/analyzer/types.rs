//! Structured records recovered from a log file.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::event::EventKind;

/// Metadata keys produced by the parser.
pub mod key {
    pub const QUERY: &str = "query";
    pub const INTENT: &str = "intent";
    pub const REQUIRES_TOOLS: &str = "requires_tools";
    pub const CONFIDENCE: &str = "confidence";
    pub const TOOL_NAME: &str = "tool_name";
    pub const STATUS: &str = "status";
    pub const DURATION: &str = "duration";
    pub const MODEL: &str = "model";
    pub const PROMPT_TOKENS: &str = "prompt_tokens";
    pub const COMPLETION_TOKENS: &str = "completion_tokens";
    pub const TOTAL_TOKENS: &str = "total_tokens";
    pub const ERROR_TYPE: &str = "error_type";
    pub const ERROR_MESSAGE: &str = "error_message";
    pub const TOTAL_DURATION: &str = "total_duration";

    /// Suffix for the recovered length of a truncated field.
    pub const ORIGINAL_LENGTH_SUFFIX: &str = "_original_length";
}

/// A metadata value: a number when the field is numeric, text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Number(f64),
    Text(String),
}

impl MetaValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetaValue::Number(n) => Some(*n),
            MetaValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            MetaValue::Number(_) => None,
        }
    }
}

impl std::fmt::Display for MetaValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetaValue::Number(n) => write!(f, "{}", n),
            MetaValue::Text(s) => f.write_str(s),
        }
    }
}

/// One parsed record.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: NaiveDateTime,
    pub event_type: EventKind,
    /// Explicit or carried forward from an earlier record
    pub session_id: Option<String>,
    /// Seconds since the session's query start
    pub elapsed: Option<f64>,
    pub metadata: BTreeMap<String, MetaValue>,
    /// The record as it appeared in the file, without the separator
    pub raw: String,
}

impl LogEntry {
    pub fn number(&self, key: &str) -> Option<f64> {
        self.metadata.get(key).and_then(MetaValue::as_f64)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(MetaValue::as_str)
    }

    /// The duration that timing analysis uses for this kind of record.
    pub fn duration(&self) -> Option<f64> {
        match self.event_type {
            EventKind::QueryComplete => self.number(key::TOTAL_DURATION),
            _ => self.number(key::DURATION),
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.text(key::STATUS)
    }

    /// Failed operations: ERROR records and anything with a failure status.
    pub fn is_error(&self) -> bool {
        self.event_type == EventKind::Error
            || self.status().is_some_and(|status| {
                ["error", "failed", "failure"]
                    .iter()
                    .any(|failed| status.eq_ignore_ascii_case(failed))
            })
    }

    /// Short name of what this record is about: tool, model or error type.
    pub fn operation(&self) -> Option<&str> {
        match self.event_type {
            EventKind::ToolSelection | EventKind::ToolExecution => self.text(key::TOOL_NAME),
            EventKind::LlmCall => self.text(key::MODEL),
            EventKind::Error => self.text(key::ERROR_TYPE),
            EventKind::QueryStart | EventKind::QueryAnalysis | EventKind::QueryComplete => None,
        }
    }

    /// Free-text detail worth showing next to the operation.
    pub fn details(&self) -> Option<String> {
        match self.event_type {
            EventKind::QueryStart => self.text(key::QUERY).map(str::to_string),
            EventKind::QueryAnalysis => self.text(key::INTENT).map(str::to_string),
            EventKind::Error => self.text(key::ERROR_MESSAGE).map(str::to_string),
            EventKind::LlmCall => self
                .number(key::TOTAL_TOKENS)
                .map(|tokens| format!("{} tokens", tokens)),
            EventKind::ToolSelection => self
                .number(key::CONFIDENCE)
                .map(|confidence| format!("confidence {:.2}", confidence)),
            EventKind::ToolExecution | EventKind::QueryComplete => None,
        }
    }
}

/// Summary statistics over one group of durations, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingStats {
    pub count: usize,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    /// Nearest-rank: the sorted sample at index `floor(0.95 * n)`, clamped
    pub p95: f64,
}

impl TimingStats {
    /// `None` for an empty sample.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let sum: f64 = sorted.iter().sum();
        let index = (count * 95 / 100).min(count - 1);
        Some(Self {
            count,
            avg: sum / count as f64,
            min: sorted[0],
            max: sorted[count - 1],
            p95: sorted[index],
        })
    }
}

/// Per-kind thresholds, in seconds, for [`super::LogAnalyzer::find_slow`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlowThresholds {
    pub tool: f64,
    pub llm: f64,
    pub query: f64,
}

impl Default for SlowThresholds {
    fn default() -> Self {
        Self {
            tool: 5.0,
            llm: 10.0,
            query: 30.0,
        }
    }
}

impl SlowThresholds {
    pub fn for_kind(&self, kind: EventKind) -> Option<f64> {
        match kind {
            EventKind::ToolExecution => Some(self.tool),
            EventKind::LlmCall => Some(self.llm),
            EventKind::QueryComplete => Some(self.query),
            _ => None,
        }
    }
}

/// A record whose duration exceeded its threshold.
#[derive(Debug, Clone, Copy)]
pub struct SlowOperation<'a> {
    pub entry: &'a LogEntry,
    pub duration: f64,
    pub threshold: f64,
}

impl SlowOperation<'_> {
    /// How many times over the threshold the operation took.
    pub fn ratio(&self) -> f64 {
        if self.threshold > 0.0 {
            self.duration / self.threshold
        } else {
            f64::INFINITY
        }
    }
}

/// Per-session rollup, in order of first appearance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub first_seen: NaiveDateTime,
    pub last_seen: NaiveDateTime,
    pub events: usize,
    pub queries: usize,
    pub tool_calls: usize,
    pub llm_calls: usize,
    pub errors: usize,
    /// Sum of QUERY_COMPLETE total durations
    pub total_duration: f64,
    pub total_tokens: u64,
}
