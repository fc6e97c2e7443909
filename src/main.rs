//! flowlog - CLI entry point

mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use flowlog::cli::{Cli, Commands, ConfigCommands};
use flowlog::SlowThresholds;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats { log, json } => commands::stats::handle(&log, json),
        Commands::Errors { log } => commands::errors::handle(&log),
        Commands::Slow {
            log,
            tool,
            llm,
            query,
        } => commands::slow::handle(&log, SlowThresholds { tool, llm, query }),
        Commands::Sessions { log } => commands::sessions::handle(&log),
        Commands::Show { log, session } => commands::show::handle(&log, &session),
        Commands::Export { log, json, csv } => {
            commands::export::handle(&log, json.as_deref(), csv.as_deref())
        }
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::handle_show(),
            ConfigCommands::Path => commands::config::handle_path(),
        },
        Commands::Completions { shell } => commands::completions::handle::<Cli>(shell),
    }
}
