//! CLI definitions for flowlog
//!
//! This module contains the clap CLI structure definitions, separated from main.rs
//! so the command tree can be reused for completion generation.

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;
use std::path::PathBuf;

/// Build clap styles for consistent CLI appearance.
///
/// - Green: headers, usage, command names
/// - White: descriptions, placeholders (renders as light gray on dark terminals)
pub fn build_cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::White.on_default())
        .valid(AnsiColor::White.on_default())
        .invalid(AnsiColor::Red.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
}

#[derive(Parser)]
#[command(name = "flowlog")]
#[command(about = "[ flowlog ] - analyze query flow logs")]
#[command(
    long_about = "flowlog - Inspect the text logs written by the flow recorder.

Each command reads one log file (plain text or a gzip-compressed backup)
and reports on the records inside it. When no file is given, the active
log from the configuration is used.

QUICK START:
    flowlog stats                      Timing statistics for the active log
    flowlog errors flow.log            Failed operations
    flowlog slow flow.log --tool 2     Tool calls slower than 2 seconds
    flowlog sessions flow.log.1.gz     Sessions in a compressed backup
    flowlog export flow.log --csv out.csv"
)]
#[command(version)]
#[command(styles = build_cli_styles())]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Log file argument shared by the analysis commands.
#[derive(Args, Debug, Clone)]
pub struct LogFile {
    /// Log file to read (defaults to the configured log)
    #[arg(help = "Log file to read (.gz backups are decompressed)")]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Timing statistics per operation type
    #[command(long_about = "Show count, mean, min, max and p95 durations.

Durations are grouped into tool executions, LLM calls and whole queries,
followed by a breakdown per tool name.

EXAMPLES:
    flowlog stats flow.log
    flowlog stats flow.log --json")]
    Stats {
        #[command(flatten)]
        log: LogFile,
        /// Print machine-readable JSON instead of a table
        #[arg(long, help = "Print JSON instead of a table")]
        json: bool,
    },

    /// List failed operations
    #[command(long_about = "List ERROR records and any operation whose status
is error, failed or failure.

EXAMPLE:
    flowlog errors flow.log")]
    Errors {
        #[command(flatten)]
        log: LogFile,
    },

    /// List operations over a duration threshold
    #[command(long_about = "List tool executions, LLM calls and queries whose
duration is strictly above the threshold for their kind.

EXAMPLES:
    flowlog slow flow.log
    flowlog slow flow.log --tool 1.5 --llm 8")]
    Slow {
        #[command(flatten)]
        log: LogFile,
        /// Tool execution threshold in seconds
        #[arg(long, default_value_t = 5.0, help = "Tool execution threshold (seconds)")]
        tool: f64,
        /// LLM call threshold in seconds
        #[arg(long, default_value_t = 10.0, help = "LLM call threshold (seconds)")]
        llm: f64,
        /// Whole-query threshold in seconds
        #[arg(long, default_value_t = 30.0, help = "Query threshold (seconds)")]
        query: f64,
    },

    /// Summarize sessions in first-seen order
    Sessions {
        #[command(flatten)]
        log: LogFile,
    },

    /// Print the raw records of one session
    #[command(long_about = "Print every record that belongs to a session,
exactly as it appears in the log.

EXAMPLE:
    flowlog show flow.log --session 20260119-100000-1a2b3c4d")]
    Show {
        #[command(flatten)]
        log: LogFile,
        /// Session ID to show
        #[arg(long, short, help = "Session ID to show")]
        session: String,
    },

    /// Export parsed records as JSON or CSV
    #[command(long_about = "Export every parsed record.

At least one of --json or --csv is required.

EXAMPLE:
    flowlog export flow.log --json flow.json --csv flow.csv")]
    Export {
        #[command(flatten)]
        log: LogFile,
        /// Write a JSON array to this path
        #[arg(long, value_name = "PATH", help = "Write JSON to PATH")]
        json: Option<PathBuf>,
        /// Write CSV to this path
        #[arg(long, value_name = "PATH", help = "Write CSV to PATH")]
        csv: Option<PathBuf>,
    },

    /// Configuration management
    #[command(
        subcommand,
        long_about = "View the flowlog configuration.

Configuration is stored in ~/.config/flowlog/config.toml and covers the
log location, detail level, writer batching, rotation and redaction.

EXAMPLES:
    flowlog config show      Display the effective configuration
    flowlog config path      Print the config file location"
    )]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
}
