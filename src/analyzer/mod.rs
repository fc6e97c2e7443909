//! Offline analysis of flow logs.
//!
//! [`LogAnalyzer`] parses a closed log file (or one of its `.gz` backups)
//! back into [`LogEntry`] values and answers questions over them: timing
//! statistics per operation type, failed operations, operations over a
//! threshold, per-session rollups. Entries can be exported as JSON or CSV.
//!
//! # Module Structure
//!
//! - [`parse`] - record grouping, header grammar, field extraction
//! - [`stats`] - timing statistics, error and slow-operation search
//! - [`export`] - JSON and CSV serialization
//! - [`types`] - entry and statistics types

pub mod export;
pub mod parse;
pub mod stats;
mod types;

pub use types::{
    key, LogEntry, MetaValue, SessionSummary, SlowOperation, SlowThresholds, TimingStats,
};

use flate2::read::GzDecoder;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::AnalyzerError;

/// Parsed view of one log file.
#[derive(Debug, Clone, Default)]
pub struct LogAnalyzer {
    path: Option<PathBuf>,
    entries: Vec<LogEntry>,
}

impl LogAnalyzer {
    /// Read and parse `path`. Files ending in `.gz` are decompressed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AnalyzerError> {
        let path = path.as_ref();
        let bytes = read_log(path).map_err(|source| AnalyzerError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes);
        let mut analyzer = Self::from_text(&text);
        analyzer.path = Some(path.to_path_buf());
        tracing::debug!(
            path = %path.display(),
            entries = analyzer.entries.len(),
            "parsed log"
        );
        Ok(analyzer)
    }

    /// Parse log text that is already in memory.
    pub fn from_text(text: &str) -> Self {
        Self {
            path: None,
            entries: parse::parse(text),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// All entries in file order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn filter_by_session(&self, session_id: &str) -> Vec<&LogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.session_id.as_deref() == Some(session_id))
            .collect()
    }

    /// Count, mean, min, max and nearest-rank p95 per operation type
    /// (`tool_execution`, `llm_call`, `query_total`).
    pub fn timing_stats(&self) -> BTreeMap<&'static str, TimingStats> {
        stats::timing_stats(&self.entries)
    }

    pub fn timing_stats_by_tool(&self) -> BTreeMap<String, TimingStats> {
        stats::timing_stats_by_tool(&self.entries)
    }

    pub fn find_errors(&self) -> Vec<&LogEntry> {
        stats::find_errors(&self.entries)
    }

    pub fn find_slow(&self, thresholds: &SlowThresholds) -> Vec<SlowOperation<'_>> {
        stats::find_slow(&self.entries, thresholds)
    }

    pub fn sessions(&self) -> Vec<SessionSummary> {
        stats::sessions(&self.entries)
    }

    pub fn to_json(&self) -> Result<String, AnalyzerError> {
        Ok(export::to_json(&self.entries)?)
    }

    pub fn to_csv(&self) -> String {
        export::to_csv(&self.entries)
    }

    pub fn export_json(&self, path: impl AsRef<Path>) -> Result<(), AnalyzerError> {
        let json = self.to_json()?;
        write_export(path.as_ref(), json.as_bytes())
    }

    pub fn export_csv(&self, path: impl AsRef<Path>) -> Result<(), AnalyzerError> {
        write_export(path.as_ref(), self.to_csv().as_bytes())
    }
}

fn read_log(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    if path.extension().is_some_and(|ext| ext == "gz") {
        GzDecoder::new(File::open(path)?).read_to_end(&mut bytes)?;
    } else {
        bytes = fs::read(path)?;
    }
    Ok(bytes)
}

fn write_export(path: &Path, contents: &[u8]) -> Result<(), AnalyzerError> {
    fs::write(path, contents).map_err(|source| AnalyzerError::Write {
        path: path.to_path_buf(),
        source,
    })
}
