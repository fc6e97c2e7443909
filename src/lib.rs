//! Flow Log Library
//!
//! Records every step of a unit of work (a "query") as a chronological
//! sequence of typed events, persists them through a non-blocking batched
//! writer with optional rotation, and parses the resulting text logs back
//! into structured entries for offline analysis.

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod format;
pub mod recorder;
pub mod redact;
pub mod rotation;
pub mod session;
pub mod writer;

pub use analyzer::{LogAnalyzer, LogEntry, SlowThresholds, TimingStats};
pub use config::Config;
pub use error::{AnalyzerError, ConfigError, SinkError};
pub use event::{Event, EventKind, TokenUsage};
pub use format::FormatOptions;
pub use recorder::FlowRecorder;
pub use redact::{ContentKind, Redactor};
pub use session::{DetailLevel, Session};
pub use writer::{AsyncWriter, RecordSink, SyncWriter, WriterStats};
