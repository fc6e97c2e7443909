//! Configuration management for flowlog

mod io;
mod types;

pub use types::*;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::format::FormatOptions;

impl Config {
    /// Get the config file path (~/.config/flowlog/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        io::config_path()
    }

    /// Get the config directory path (~/.config/flowlog)
    pub fn config_dir() -> Result<PathBuf> {
        io::config_dir()
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> Result<Self> {
        io::load()
    }

    /// Load configuration from an explicit file; missing files are an error
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        io::load_from(path)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        io::save(self)
    }

    /// Expand ~ in the log directory path
    pub fn log_directory(&self) -> PathBuf {
        let dir = &self.logging.directory;
        if let Some(stripped) = dir.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        }
        PathBuf::from(dir)
    }

    /// Full path of the active log file
    pub fn log_path(&self) -> PathBuf {
        self.log_directory().join(&self.logging.file_name)
    }

    /// Rendering options derived from the logging section
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            detail_level: self.logging.detail_level,
            max_content_length: self.logging.max_content_length,
            indent_size: self.logging.indent_size,
        }
    }
}
