//! Typed flow events
//!
//! `Event` is the closed set of occurrences a recorder can log. `EventKind`
//! is its payload-free tag and owns the mapping to and from the textual
//! labels used in log headers, including legacy spellings accepted on read.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Token accounting reported by a model call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// One occurrence within a unit of work
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    QueryStart {
        query: String,
    },
    QueryAnalysis {
        intent: String,
        requires_tools: bool,
        reasoning: String,
        confidence: f64,
    },
    ToolSelection {
        tool_name: String,
        rationale: String,
        confidence: f64,
    },
    ToolExecution {
        tool_name: String,
        input: String,
        output: String,
        duration: Duration,
        status: String,
    },
    LlmCall {
        model: String,
        prompt: String,
        response: String,
        duration: Duration,
        token_usage: Option<TokenUsage>,
        status: String,
    },
    Error {
        error_type: String,
        message: String,
        stack_trace: Option<String>,
    },
    QueryComplete {
        final_answer: String,
        total_duration: Duration,
        status: String,
    },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::QueryStart { .. } => EventKind::QueryStart,
            Event::QueryAnalysis { .. } => EventKind::QueryAnalysis,
            Event::ToolSelection { .. } => EventKind::ToolSelection,
            Event::ToolExecution { .. } => EventKind::ToolExecution,
            Event::LlmCall { .. } => EventKind::LlmCall,
            Event::Error { .. } => EventKind::Error,
            Event::QueryComplete { .. } => EventKind::QueryComplete,
        }
    }
}

/// Payload-free event tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    QueryStart,
    QueryAnalysis,
    ToolSelection,
    ToolExecution,
    LlmCall,
    Error,
    QueryComplete,
}

/// Header labels accepted on read. The first entry for each kind is the
/// spelling the formatter emits; the rest are older spellings still found
/// in historical logs.
const LABELS: &[(&str, EventKind)] = &[
    ("QUERY_START", EventKind::QueryStart),
    ("QUERY_ANALYSIS", EventKind::QueryAnalysis),
    ("TOOL_SELECTION", EventKind::ToolSelection),
    ("TOOL_EXECUTION", EventKind::ToolExecution),
    ("TOOL_EXEC", EventKind::ToolExecution),
    ("LLM_CALL", EventKind::LlmCall),
    ("ERROR", EventKind::Error),
    ("QUERY_COMPLETE", EventKind::QueryComplete),
    ("COMPLETE", EventKind::QueryComplete),
];

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        EventKind::QueryStart,
        EventKind::QueryAnalysis,
        EventKind::ToolSelection,
        EventKind::ToolExecution,
        EventKind::LlmCall,
        EventKind::Error,
        EventKind::QueryComplete,
    ];

    /// Label written in record headers.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::QueryStart => "QUERY_START",
            EventKind::QueryAnalysis => "QUERY_ANALYSIS",
            EventKind::ToolSelection => "TOOL_SELECTION",
            EventKind::ToolExecution => "TOOL_EXECUTION",
            EventKind::LlmCall => "LLM_CALL",
            EventKind::Error => "ERROR",
            EventKind::QueryComplete => "QUERY_COMPLETE",
        }
    }

    /// Resolve a header label, including legacy aliases.
    pub fn from_label(label: &str) -> Option<Self> {
        LABELS
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, kind)| *kind)
    }

    /// Whether minimal records of this kind still carry the session ID.
    pub fn anchors_session(&self) -> bool {
        matches!(self, EventKind::QueryStart | EventKind::QueryComplete)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
