//! Show command handler

use anyhow::{bail, Result};

use flowlog::cli::LogFile;
use flowlog::format::contract::SEPARATOR;

use super::open_log;

/// Print the raw records of one session.
#[cfg(not(tarpaulin_include))]
pub fn handle(log: &LogFile, session: &str) -> Result<()> {
    let analyzer = open_log(log)?;
    let entries = analyzer.filter_by_session(session);

    if entries.is_empty() {
        bail!("No records found for session '{}'", session);
    }

    for entry in entries {
        println!("{}", entry.raw);
        if entry.raw.contains('\n') {
            println!("{}", SEPARATOR);
        }
    }
    Ok(())
}
