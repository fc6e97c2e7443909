//! Command handlers for the flowlog CLI.
//!
//! Each submodule handles a specific CLI command or command group.
//! The main dispatch logic remains in main.rs.

pub mod completions;
pub mod config;
pub mod errors;
pub mod export;
pub mod sessions;
pub mod show;
pub mod slow;
pub mod stats;

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use flowlog::cli::LogFile;
use flowlog::{Config, LogAnalyzer, LogEntry};

/// Resolve the log file argument, falling back to the configured log path.
pub fn resolve_log_path(log: &LogFile) -> Result<PathBuf> {
    if let Some(path) = &log.file {
        return Ok(path.clone());
    }
    let config = Config::load()?;
    Ok(config.log_path())
}

/// Open and parse the requested log.
pub fn open_log(log: &LogFile) -> Result<LogAnalyzer> {
    let path = resolve_log_path(log)?;
    if !path.exists() {
        bail!("Log file not found: {}", path.display());
    }
    let analyzer = LogAnalyzer::open(&path)
        .with_context(|| format!("Failed to analyze {}", path.display()))?;
    let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    eprintln!(
        "{} ({}, {} records)",
        path.display(),
        humansize::format_size(size, humansize::BINARY),
        analyzer.entries().len()
    );
    Ok(analyzer)
}

/// Truncate a string to a maximum length, adding ellipsis if needed.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    } else {
        s.chars().take(max_len).collect()
    }
}

/// One-line description of an entry for listings.
pub fn describe(entry: &LogEntry) -> String {
    let mut line = format!(
        "[{}] {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
        entry.event_type.label()
    );
    if let Some(operation) = entry.operation() {
        line.push_str(&format!(" {}", operation));
    }
    if let Some(status) = entry.status() {
        line.push_str(&format!(" ({})", status));
    }
    if let Some(details) = entry.details() {
        line.push_str(&format!(" - {}", truncate_string(&details, 80)));
    }
    if let Some(session) = &entry.session_id {
        line.push_str(&format!("  [{}]", session));
    }
    line
}
