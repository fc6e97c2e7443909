//! Per-session recording façade
//!
//! A [`FlowRecorder`] stamps each event with the time elapsed since the
//! session (re)started, runs it through the optional [`Redactor`], renders
//! it and hands the text to a [`RecordSink`]. Recording never fails from the
//! caller's point of view: sink errors are logged and counted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::Config;
use crate::error::ConfigError;
use crate::event::{Event, TokenUsage};
use crate::format::{self, FormatOptions};
use crate::redact::Redactor;
use crate::session::Session;
use crate::writer::{self, RecordSink, WriterStats};

/// Records the events of one session. Safe to share across threads.
pub struct FlowRecorder {
    session_id: String,
    session: Mutex<Session>,
    options: FormatOptions,
    redactor: Option<Redactor>,
    sink: Option<Arc<dyn RecordSink>>,
    failures: AtomicU64,
}

impl std::fmt::Debug for FlowRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowRecorder")
            .field("session_id", &self.session_id)
            .field("options", &self.options)
            .field("enabled", &self.is_enabled())
            .field("redacting", &self.redactor.is_some())
            .finish()
    }
}

impl FlowRecorder {
    pub fn new(session: Session, sink: Arc<dyn RecordSink>, options: FormatOptions) -> Self {
        Self {
            session_id: session.id().to_string(),
            session: Mutex::new(session),
            options,
            redactor: None,
            sink: Some(sink),
            failures: AtomicU64::new(0),
        }
    }

    /// A recorder that accepts every call and writes nothing.
    pub fn disabled(session: Session) -> Self {
        Self {
            session_id: session.id().to_string(),
            session: Mutex::new(session),
            options: FormatOptions::default(),
            redactor: None,
            sink: None,
            failures: AtomicU64::new(0),
        }
    }

    /// Build a recorder writing to the configured log file.
    ///
    /// The configuration is validated first. Recorders built from the same
    /// configuration share one writer per log path.
    pub fn from_config(config: &Config, session: Session) -> Result<Self, ConfigError> {
        config.validate()?;
        if !config.logging.enabled {
            return Ok(Self::disabled(session));
        }
        let path = config.log_path();
        let sink = writer::shared_sink(&path, config)
            .map_err(|source| ConfigError::Writer { path, source })?;
        Ok(Self::new(session, sink, config.format_options())
            .with_redactor(Redactor::from_config(&config.redaction)))
    }

    pub fn with_redactor(mut self, redactor: Option<Redactor>) -> Self {
        self.redactor = redactor;
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Time since the session started or last saw a query start.
    pub fn elapsed(&self) -> Duration {
        self.session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .elapsed()
    }

    /// Number of records that could not be handed to the sink.
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> Option<WriterStats> {
        self.sink.as_ref().map(|sink| sink.stats())
    }

    /// Record any event at the current elapsed time.
    pub fn record(&self, event: Event) {
        if !self.is_enabled() {
            return;
        }
        let elapsed = self.elapsed();
        self.emit(event, elapsed);
    }

    /// Start a new query. Elapsed time restarts from zero here and only here.
    pub fn record_query_start(&self, query: &str) {
        if !self.is_enabled() {
            return;
        }
        self.session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .restart();
        self.emit(
            Event::QueryStart {
                query: query.to_string(),
            },
            Duration::ZERO,
        );
    }

    pub fn record_query_analysis(
        &self,
        intent: &str,
        requires_tools: bool,
        reasoning: &str,
        confidence: f64,
    ) {
        self.record_with(|| Event::QueryAnalysis {
            intent: intent.to_string(),
            requires_tools,
            reasoning: reasoning.to_string(),
            confidence,
        });
    }

    pub fn record_tool_selection(&self, tool_name: &str, rationale: &str, confidence: f64) {
        self.record_with(|| Event::ToolSelection {
            tool_name: tool_name.to_string(),
            rationale: rationale.to_string(),
            confidence,
        });
    }

    pub fn record_tool_execution(
        &self,
        tool_name: &str,
        input: &str,
        output: &str,
        duration: Duration,
        status: &str,
    ) {
        self.record_with(|| Event::ToolExecution {
            tool_name: tool_name.to_string(),
            input: input.to_string(),
            output: output.to_string(),
            duration,
            status: status.to_string(),
        });
    }

    pub fn record_llm_call(
        &self,
        model: &str,
        prompt: &str,
        response: &str,
        duration: Duration,
        token_usage: Option<TokenUsage>,
        status: &str,
    ) {
        self.record_with(|| Event::LlmCall {
            model: model.to_string(),
            prompt: prompt.to_string(),
            response: response.to_string(),
            duration,
            token_usage,
            status: status.to_string(),
        });
    }

    pub fn record_error(&self, error_type: &str, message: &str, stack_trace: Option<&str>) {
        self.record_with(|| Event::Error {
            error_type: error_type.to_string(),
            message: message.to_string(),
            stack_trace: stack_trace.map(str::to_string),
        });
    }

    pub fn record_query_complete(&self, final_answer: &str, total_duration: Duration, status: &str) {
        self.record_with(|| Event::QueryComplete {
            final_answer: final_answer.to_string(),
            total_duration,
            status: status.to_string(),
        });
    }

    /// Ask the sink to push pending records to disk.
    pub fn flush(&self) {
        if let Some(sink) = &self.sink {
            sink.flush();
        }
    }

    /// Shut the underlying sink down. Other recorders sharing it are
    /// affected too, so this belongs at process teardown.
    pub fn shutdown(&self, timeout: Duration) {
        if let Some(sink) = &self.sink {
            sink.shutdown(timeout);
        }
    }

    // Building the event is skipped entirely when disabled.
    fn record_with(&self, build: impl FnOnce() -> Event) {
        if !self.is_enabled() {
            return;
        }
        self.record(build());
    }

    fn emit(&self, event: Event, elapsed: Duration) {
        let Some(sink) = &self.sink else {
            return;
        };
        let kind = event.kind();
        let event = match &self.redactor {
            Some(redactor) => redactor.apply(event),
            None => event,
        };
        let text = format::render(&event, &self.session_id, elapsed, &self.options);
        if let Err(e) = sink.write(text) {
            self.failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                session = %self.session_id,
                event = %kind,
                error = %e,
                "failed to record event"
            );
        }
    }
}
