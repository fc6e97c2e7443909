//! Error types for the flow log pipeline.
//!
//! Producer-side failures never reach business code: recorders count and
//! log them. These types surface only where a caller can act on them
//! (configuration, analysis).

use std::path::PathBuf;
use thiserror::Error;

/// Invalid configuration, rejected eagerly at construction time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid detail level '{0}' (expected minimal, normal or verbose)")]
    InvalidDetailLevel(String),

    #[error("invalid rotation kind '{0}' (expected size or time)")]
    InvalidRotationKind(String),

    #[error("invalid rotation schedule '{0}' (expected midnight, hourly or interval)")]
    InvalidSchedule(String),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to start log writer for {path:?}: {source}")]
    Writer {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reasons a record could not be handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("writer for {0:?} has been shut down")]
    Closed(PathBuf),

    #[error("queue for {path:?} is full ({capacity} records)")]
    QueueFull { path: PathBuf, capacity: usize },

    #[error("background worker for {0:?} is no longer running")]
    Disconnected(PathBuf),
}

/// Failures while loading or exporting a log for analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("failed to read log {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write export {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize export: {0}")]
    Json(#[from] serde_json::Error),
}
