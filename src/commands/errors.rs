//! Errors command handler

use anyhow::Result;

use flowlog::cli::LogFile;

use super::{describe, open_log};

/// List failed operations.
#[cfg(not(tarpaulin_include))]
pub fn handle(log: &LogFile) -> Result<()> {
    let analyzer = open_log(log)?;
    let errors = analyzer.find_errors();

    if errors.is_empty() {
        println!("No errors found.");
        return Ok(());
    }

    println!("{} failed operation(s):", errors.len());
    for entry in errors {
        println!("  {}", describe(entry));
    }
    Ok(())
}
