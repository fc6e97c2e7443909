//! Configuration type definitions and defaults

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::session::DetailLevel;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub writer: WriterConfig,
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub redaction: RedactionConfig,
}

/// What gets recorded and how it is rendered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global toggle; a disabled recorder turns every call into a no-op
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub detail_level: DetailLevel,
    /// Fields longer than this are truncated (unless verbose)
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,
    /// Spaces per nesting level for multi-line payloads
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,
    #[serde(default = "default_directory")]
    pub directory: String,
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

pub fn default_enabled() -> bool {
    true
}

pub fn default_max_content_length() -> usize {
    1000
}

pub fn default_indent_size() -> usize {
    2
}

pub fn default_directory() -> String {
    "~/.local/share/flowlog".to_string()
}

pub fn default_file_name() -> String {
    "flow.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            detail_level: DetailLevel::default(),
            max_content_length: default_max_content_length(),
            indent_size: default_indent_size(),
            directory: default_directory(),
            file_name: default_file_name(),
        }
    }
}

/// Background writer tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriterConfig {
    /// When false, records are written synchronously on the caller's thread
    #[serde(default = "default_async_enabled")]
    pub async_enabled: bool,
    /// Number of buffered records that triggers a batch write
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Maximum age of a non-empty buffer before it is written
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
    /// 0 keeps the producer queue unbounded. Anything else bounds it and
    /// rejects (and counts) records that arrive while it is full.
    #[serde(default)]
    pub queue_capacity: usize,
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

pub fn default_async_enabled() -> bool {
    true
}

pub fn default_batch_size() -> usize {
    10
}

pub fn default_flush_interval_ms() -> u64 {
    1000
}

pub fn default_shutdown_timeout_ms() -> u64 {
    5000
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            async_enabled: default_async_enabled(),
            batch_size: default_batch_size(),
            flush_interval_ms: default_flush_interval_ms(),
            queue_capacity: 0,
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
        }
    }
}

impl WriterConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// `None` means unbounded.
    pub fn capacity(&self) -> Option<usize> {
        (self.queue_capacity > 0).then_some(self.queue_capacity)
    }
}

/// Which trigger retires the active file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationKind {
    #[default]
    Size,
    Time,
}

impl FromStr for RotationKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "size" => Ok(RotationKind::Size),
            "time" => Ok(RotationKind::Time),
            _ => Err(ConfigError::InvalidRotationKind(s.to_string())),
        }
    }
}

impl fmt::Display for RotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationKind::Size => write!(f, "size"),
            RotationKind::Time => write!(f, "time"),
        }
    }
}

/// Rollover boundary for time-based rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schedule {
    /// Local midnight, corrected for DST shifts
    #[default]
    Midnight,
    Hourly,
    /// Every `interval_secs` seconds
    Interval,
}

impl FromStr for Schedule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "midnight" | "daily" => Ok(Schedule::Midnight),
            "hourly" => Ok(Schedule::Hourly),
            "interval" => Ok(Schedule::Interval),
            _ => Err(ConfigError::InvalidSchedule(s.to_string())),
        }
    }
}

/// Rotation and retention of the log file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub kind: RotationKind,
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Number of retired files kept as `base.1 .. base.N`
    #[serde(default = "default_backup_count")]
    pub backup_count: usize,
    /// Gzip retired files (`base.N.gz`)
    #[serde(default)]
    pub compress: bool,
}

pub fn default_max_bytes() -> u64 {
    10 * 1024 * 1024
}

pub fn default_interval_secs() -> u64 {
    86_400
}

pub fn default_backup_count() -> usize {
    5
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: RotationKind::default(),
            max_bytes: default_max_bytes(),
            schedule: Schedule::default(),
            interval_secs: default_interval_secs(),
            backup_count: default_backup_count(),
            compress: false,
        }
    }
}

/// Redaction of sensitive payloads before formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub redact_prompts: bool,
    #[serde(default = "default_true")]
    pub redact_responses: bool,
    #[serde(default)]
    pub redact_tool_payloads: bool,
    /// Mask key/token/password-looking values in content that is kept
    #[serde(default = "default_true")]
    pub scrub_secrets: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            redact_prompts: true,
            redact_responses: true,
            redact_tool_payloads: false,
            scrub_secrets: true,
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns the first invalid value found. Enum-typed fields are already
    /// checked by deserialization; this covers numeric bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.max_content_length == 0 {
            return Err(ConfigError::Zero {
                field: "logging.max_content_length",
            });
        }
        if self.logging.indent_size == 0 {
            return Err(ConfigError::Zero {
                field: "logging.indent_size",
            });
        }
        if self.writer.batch_size == 0 {
            return Err(ConfigError::Zero {
                field: "writer.batch_size",
            });
        }
        if self.writer.flush_interval_ms == 0 {
            return Err(ConfigError::Zero {
                field: "writer.flush_interval_ms",
            });
        }
        if self.rotation.enabled {
            match self.rotation.kind {
                RotationKind::Size if self.rotation.max_bytes == 0 => {
                    return Err(ConfigError::Zero {
                        field: "rotation.max_bytes",
                    });
                }
                RotationKind::Time
                    if self.rotation.schedule == Schedule::Interval
                        && self.rotation.interval_secs == 0 =>
                {
                    return Err(ConfigError::Zero {
                        field: "rotation.interval_secs",
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }
}
