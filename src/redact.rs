//! Redaction of sensitive payloads.
//!
//! Content is tagged with a [`ContentKind`] so policy can differ per field:
//! prompts and responses can be replaced wholesale with a length marker,
//! while error and diagnostic text is always kept verbatim since it is what
//! an operator needs when something breaks.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

use crate::config::RedactionConfig;
use crate::event::Event;

/// What a piece of text is, for redaction purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Query,
    LlmRequest,
    LlmResponse,
    ToolInput,
    ToolOutput,
    Answer,
    Reasoning,
    Error,
    Diagnostic,
}

impl ContentKind {
    fn name(&self) -> &'static str {
        match self {
            ContentKind::Query => "query",
            ContentKind::LlmRequest => "prompt",
            ContentKind::LlmResponse => "response",
            ContentKind::ToolInput => "tool input",
            ContentKind::ToolOutput => "tool output",
            ContentKind::Answer => "answer",
            ContentKind::Reasoning => "reasoning",
            ContentKind::Error => "error",
            ContentKind::Diagnostic => "diagnostic",
        }
    }

    fn is_exempt(&self) -> bool {
        matches!(self, ContentKind::Error | ContentKind::Diagnostic)
    }
}

/// Replacement used by secret scrubbing.
pub const SECRET_MASK: &str = "[REDACTED]";

/// `key=value` / `key: value` pairs whose key names a credential.
fn credential_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?i)\b(api[_-]?key|access[_-]?token|refresh[_-]?token|token|secret|password|passwd|authorization|credential)(["']?\s*[:=]\s*["']?)([^\s"',;]+)"#,
        )
        .expect("credential pattern is valid")
    })
}

/// Bare bearer tokens and common provider key prefixes.
fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\bbearer\s+[A-Za-z0-9._~+/=-]+|\b(sk|pk|rk)-[A-Za-z0-9_-]{16,}")
            .expect("token pattern is valid")
    })
}

/// Text transform placed in front of the formatter.
#[derive(Debug, Clone)]
pub struct Redactor {
    redact_prompts: bool,
    redact_responses: bool,
    redact_tool_payloads: bool,
    scrub_secrets: bool,
}

impl Redactor {
    pub fn new(config: &RedactionConfig) -> Self {
        Self {
            redact_prompts: config.redact_prompts,
            redact_responses: config.redact_responses,
            redact_tool_payloads: config.redact_tool_payloads,
            scrub_secrets: config.scrub_secrets,
        }
    }

    /// Build a redactor only when redaction is switched on.
    pub fn from_config(config: &RedactionConfig) -> Option<Self> {
        config.enabled.then(|| Self::new(config))
    }

    fn replaces(&self, kind: ContentKind) -> bool {
        match kind {
            ContentKind::Query | ContentKind::LlmRequest => self.redact_prompts,
            ContentKind::LlmResponse | ContentKind::Answer => self.redact_responses,
            ContentKind::ToolInput | ContentKind::ToolOutput => self.redact_tool_payloads,
            ContentKind::Reasoning | ContentKind::Error | ContentKind::Diagnostic => false,
        }
    }

    /// Apply policy for `kind` to `text`.
    pub fn redact<'a>(&self, text: &'a str, kind: ContentKind) -> Cow<'a, str> {
        if kind.is_exempt() {
            return Cow::Borrowed(text);
        }
        // Empty text is replaced too; every redacted field carries a marker.
        if self.replaces(kind) {
            return Cow::Owned(marker(kind, text.chars().count()));
        }
        if self.scrub_secrets && !text.is_empty() {
            return scrub(text);
        }
        Cow::Borrowed(text)
    }

    fn redact_owned(&self, text: String, kind: ContentKind) -> String {
        let replaced = match self.redact(&text, kind) {
            Cow::Borrowed(_) => None,
            Cow::Owned(changed) => Some(changed),
        };
        replaced.unwrap_or(text)
    }

    /// Redact every free-text field of `event` according to its kind.
    pub fn apply(&self, event: Event) -> Event {
        match event {
            Event::QueryStart { query } => Event::QueryStart {
                query: self.redact_owned(query, ContentKind::Query),
            },
            Event::QueryAnalysis {
                intent,
                requires_tools,
                reasoning,
                confidence,
            } => Event::QueryAnalysis {
                intent: self.redact_owned(intent, ContentKind::Reasoning),
                requires_tools,
                reasoning: self.redact_owned(reasoning, ContentKind::Reasoning),
                confidence,
            },
            Event::ToolSelection {
                tool_name,
                rationale,
                confidence,
            } => Event::ToolSelection {
                tool_name,
                rationale: self.redact_owned(rationale, ContentKind::Reasoning),
                confidence,
            },
            Event::ToolExecution {
                tool_name,
                input,
                output,
                duration,
                status,
            } => Event::ToolExecution {
                tool_name,
                input: self.redact_owned(input, ContentKind::ToolInput),
                output: self.redact_owned(output, ContentKind::ToolOutput),
                duration,
                status,
            },
            Event::LlmCall {
                model,
                prompt,
                response,
                duration,
                token_usage,
                status,
            } => Event::LlmCall {
                model,
                prompt: self.redact_owned(prompt, ContentKind::LlmRequest),
                response: self.redact_owned(response, ContentKind::LlmResponse),
                duration,
                token_usage,
                status,
            },
            // Error text is what an operator needs; it is never touched.
            error @ Event::Error { .. } => error,
            Event::QueryComplete {
                final_answer,
                total_duration,
                status,
            } => Event::QueryComplete {
                final_answer: self.redact_owned(final_answer, ContentKind::Answer),
                total_duration,
                status,
            },
        }
    }
}

fn marker(kind: ContentKind, chars: usize) -> String {
    format!("[REDACTED {}: {} chars]", kind.name(), chars)
}

/// Mask credential-looking values, keeping the surrounding text.
pub fn scrub(text: &str) -> Cow<'_, str> {
    let tokens = token_pattern().replace_all(text, SECRET_MASK);
    if !credential_pattern().is_match(&tokens) {
        return tokens;
    }
    let masked = credential_pattern()
        .replace_all(&tokens, |caps: &regex::Captures| {
            format!("{}{}{}", &caps[1], &caps[2], SECRET_MASK)
        })
        .into_owned();
    Cow::Owned(masked)
}
