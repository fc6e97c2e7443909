//! Event formatter
//!
//! Maps a typed [`Event`] plus its elapsed time into the textual record the
//! writer persists. Three tiers are supported:
//!
//! - **minimal**: one line, single-line previews, session ID only on
//!   QUERY_START / QUERY_COMPLETE
//! - **normal**: separator-delimited block, long fields truncated
//! - **verbose**: same block, nothing truncated
//!
//! The analyzer parses this output back; see [`contract`] for the shared
//! grammar.

pub mod contract;
pub mod text;

use chrono::{DateTime, Local};
use std::fmt::Display;
use std::time::Duration;

use crate::event::{Event, TokenUsage};
use crate::session::DetailLevel;
use contract::{format_seconds, header, label, SEGMENT_DELIMITER, SEPARATOR};
use text::{indent, preview, single_line, truncate, PREVIEW_CHARS};

/// Rendering knobs, usually derived from [`crate::Config::format_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub detail_level: DetailLevel,
    pub max_content_length: usize,
    pub indent_size: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            detail_level: DetailLevel::Normal,
            max_content_length: 1000,
            indent_size: 2,
        }
    }
}

impl FormatOptions {
    pub fn with_detail_level(mut self, detail_level: DetailLevel) -> Self {
        self.detail_level = detail_level;
        self
    }
}

/// Render an event stamped with the current local time.
pub fn render(event: &Event, session_id: &str, elapsed: Duration, options: &FormatOptions) -> String {
    render_at(event, session_id, elapsed, Local::now(), options)
}

/// Render an event with an explicit timestamp.
pub fn render_at(
    event: &Event,
    session_id: &str,
    elapsed: Duration,
    timestamp: DateTime<Local>,
    options: &FormatOptions,
) -> String {
    match options.detail_level {
        DetailLevel::Minimal => render_minimal(event, session_id, elapsed, &timestamp, options),
        DetailLevel::Normal | DetailLevel::Verbose => {
            render_block(event, session_id, elapsed, &timestamp, options)
        }
    }
}

fn format_tokens(usage: &TokenUsage) -> String {
    format!(
        "prompt={}, completion={}, total={}",
        usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
    )
}

fn format_confidence(confidence: f64) -> String {
    format!("{:.2}", confidence)
}

/// Builds the body of a normal/verbose block.
struct Block<'a> {
    lines: Vec<String>,
    options: &'a FormatOptions,
}

impl<'a> Block<'a> {
    fn new(header: String, options: &'a FormatOptions) -> Self {
        Self {
            lines: vec![SEPARATOR.to_string(), header],
            options,
        }
    }

    fn scalar(&mut self, name: &str, value: impl Display) {
        self.lines
            .push(format!("{}: {}", name, single_line(&value.to_string())));
    }

    /// Inline when the (truncated) value fits on one line, nested otherwise.
    fn text(&mut self, name: &str, value: &str) {
        let value = truncate(value, self.options.max_content_length, self.options.detail_level);
        if value.contains('\n') {
            self.nested(name, &value);
        } else {
            self.lines.push(format!("{}: {}", name, value));
        }
    }

    /// Always nested under its label.
    fn payload(&mut self, name: &str, value: &str) {
        let value = truncate(value, self.options.max_content_length, self.options.detail_level);
        self.nested(name, &value);
    }

    fn nested(&mut self, name: &str, value: &str) {
        self.lines.push(format!("{}:", name));
        // Unindented payload lines would read back as labels.
        let body = indent(value, 1, self.options.indent_size.max(1));
        if !body.is_empty() {
            self.lines.push(body);
        }
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

fn render_block(
    event: &Event,
    session_id: &str,
    elapsed: Duration,
    timestamp: &DateTime<Local>,
    options: &FormatOptions,
) -> String {
    let head = header(
        timestamp,
        event.kind().label(),
        Some(session_id),
        Some(elapsed),
    );
    let mut block = Block::new(head, options);

    match event {
        Event::QueryStart { query } => {
            block.text(label::QUERY, query);
        }
        Event::QueryAnalysis {
            intent,
            requires_tools,
            reasoning,
            confidence,
        } => {
            block.text(label::INTENT, intent);
            block.scalar(label::REQUIRES_TOOLS, requires_tools);
            block.scalar(label::CONFIDENCE, format_confidence(*confidence));
            block.payload(label::REASONING, reasoning);
        }
        Event::ToolSelection {
            tool_name,
            rationale,
            confidence,
        } => {
            block.scalar(label::TOOL, tool_name);
            block.scalar(label::CONFIDENCE, format_confidence(*confidence));
            block.payload(label::RATIONALE, rationale);
        }
        Event::ToolExecution {
            tool_name,
            input,
            output,
            duration,
            status,
        } => {
            block.scalar(label::TOOL, tool_name);
            block.scalar(label::STATUS, status);
            block.scalar(label::DURATION, format_seconds(*duration));
            block.payload(label::INPUT, input);
            block.payload(label::OUTPUT, output);
        }
        Event::LlmCall {
            model,
            prompt,
            response,
            duration,
            token_usage,
            status,
        } => {
            block.scalar(label::MODEL, model);
            block.scalar(label::STATUS, status);
            block.scalar(label::DURATION, format_seconds(*duration));
            if let Some(usage) = token_usage {
                block.scalar(label::TOKENS, format_tokens(usage));
            }
            block.payload(label::PROMPT, prompt);
            block.payload(label::RESPONSE, response);
        }
        Event::Error {
            error_type,
            message,
            stack_trace,
        } => {
            block.scalar(label::ERROR_TYPE, error_type);
            block.text(label::MESSAGE, message);
            if let Some(trace) = stack_trace {
                block.payload(label::STACK_TRACE, trace);
            }
        }
        Event::QueryComplete {
            final_answer,
            total_duration,
            status,
        } => {
            block.scalar(label::STATUS, status);
            block.scalar(label::TOTAL_DURATION, format_seconds(*total_duration));
            block.payload(label::ANSWER, final_answer);
        }
    }

    block.finish()
}

/// Stand-in for [`SEGMENT_DELIMITER`] inside a minimal-record value.
const ESCAPED_DELIMITER: &str = " / ";

fn render_minimal(
    event: &Event,
    session_id: &str,
    elapsed: Duration,
    timestamp: &DateTime<Local>,
    options: &FormatOptions,
) -> String {
    let kind = event.kind();
    let session = kind.anchors_session().then_some(session_id);
    let mut line = header(timestamp, kind.label(), session, Some(elapsed));

    let width = options.max_content_length.min(PREVIEW_CHARS);
    let short = |text: &str| preview(text, width);
    let mut push = |name: &str, value: String| {
        line.push_str(SEGMENT_DELIMITER);
        line.push_str(name);
        line.push_str(": ");
        line.push_str(&value.replace(SEGMENT_DELIMITER, ESCAPED_DELIMITER));
    };

    match event {
        Event::QueryStart { query } => push(label::QUERY, short(query)),
        Event::QueryAnalysis {
            intent,
            requires_tools,
            confidence,
            ..
        } => {
            push(label::INTENT, short(intent));
            push(label::REQUIRES_TOOLS, requires_tools.to_string());
            push(label::CONFIDENCE, format_confidence(*confidence));
        }
        Event::ToolSelection {
            tool_name,
            confidence,
            ..
        } => {
            push(label::TOOL, single_line(tool_name));
            push(label::CONFIDENCE, format_confidence(*confidence));
        }
        Event::ToolExecution {
            tool_name,
            input,
            output,
            duration,
            status,
        } => {
            push(label::TOOL, single_line(tool_name));
            push(label::STATUS, single_line(status));
            push(label::DURATION, format_seconds(*duration));
            push(label::INPUT, short(input));
            push(label::OUTPUT, short(output));
        }
        Event::LlmCall {
            model,
            response,
            duration,
            token_usage,
            status,
            ..
        } => {
            push(label::MODEL, single_line(model));
            push(label::STATUS, single_line(status));
            push(label::DURATION, format_seconds(*duration));
            if let Some(usage) = token_usage {
                push(label::TOKENS, format_tokens(usage));
            }
            push(label::RESPONSE, short(response));
        }
        Event::Error {
            error_type,
            message,
            ..
        } => {
            push(label::ERROR_TYPE, single_line(error_type));
            push(label::MESSAGE, short(message));
        }
        Event::QueryComplete {
            final_answer,
            total_duration,
            status,
        } => {
            push(label::STATUS, single_line(status));
            push(label::TOTAL_DURATION, format_seconds(*total_duration));
            push(label::ANSWER, short(final_answer));
        }
    }

    line
}
