//! Export command handler

use anyhow::{bail, Context, Result};
use std::path::Path;

use flowlog::cli::LogFile;

use super::open_log;

/// Write parsed records to JSON and/or CSV files.
#[cfg(not(tarpaulin_include))]
pub fn handle(log: &LogFile, json: Option<&Path>, csv: Option<&Path>) -> Result<()> {
    if json.is_none() && csv.is_none() {
        bail!("Nothing to export: pass --json PATH and/or --csv PATH");
    }

    let analyzer = open_log(log)?;
    let count = analyzer.entries().len();

    if let Some(path) = json {
        analyzer
            .export_json(path)
            .context("Failed to export JSON")?;
        println!("Exported {} records to {}", count, path.display());
    }
    if let Some(path) = csv {
        analyzer.export_csv(path).context("Failed to export CSV")?;
        println!("Exported {} records to {}", count, path.display());
    }
    Ok(())
}
