//! Session identity and elapsed-time anchoring

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::error::ConfigError;

/// Formatting verbosity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// One line per event with previews of long fields
    Minimal,
    /// Multi-line blocks with truncated fields
    #[default]
    Normal,
    /// Multi-line blocks, nothing truncated
    Verbose,
}

impl DetailLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailLevel::Minimal => "minimal",
            DetailLevel::Normal => "normal",
            DetailLevel::Verbose => "verbose",
        }
    }
}

impl FromStr for DetailLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimal" => Ok(DetailLevel::Minimal),
            "normal" => Ok(DetailLevel::Normal),
            "verbose" => Ok(DetailLevel::Verbose),
            _ => Err(ConfigError::InvalidDetailLevel(s.to_string())),
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical unit of work.
///
/// The start instant is monotonic, so elapsed times never go backwards even
/// if the wall clock is adjusted mid-session.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    start: Instant,
    started_at: DateTime<Local>,
}

impl Session {
    /// Start a session with a freshly generated ID.
    pub fn new() -> Self {
        Self::with_id(Self::generate_id())
    }

    /// Start a session with a caller-supplied ID.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start: Instant::now(),
            started_at: Local::now(),
        }
    }

    /// Generate a sortable session ID: `YYYYMMDD-HHMMSS-<8 hex>`.
    pub fn generate_id() -> String {
        let now = Local::now();
        let random = uuid::Uuid::new_v4().simple().to_string();
        format!("{}-{}", now.format("%Y%m%d-%H%M%S"), &random[..8])
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wall-clock time of the last (re)start, for display only.
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Re-anchor elapsed time at "now".
    pub fn restart(&mut self) {
        self.start = Instant::now();
        self.started_at = Local::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
