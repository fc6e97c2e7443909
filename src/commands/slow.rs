//! Slow command handler

use anyhow::Result;

use flowlog::cli::LogFile;
use flowlog::SlowThresholds;

use super::{describe, open_log};

/// List operations whose duration exceeds the threshold for their kind.
#[cfg(not(tarpaulin_include))]
pub fn handle(log: &LogFile, thresholds: SlowThresholds) -> Result<()> {
    let analyzer = open_log(log)?;
    let mut slow = analyzer.find_slow(&thresholds);

    if slow.is_empty() {
        println!("No slow operations found.");
        return Ok(());
    }

    slow.sort_by(|a, b| b.ratio().total_cmp(&a.ratio()));
    println!("{} slow operation(s):", slow.len());
    for op in slow {
        println!(
            "  {:>8.3}s (limit {:.1}s, {:.1}x)  {}",
            op.duration,
            op.threshold,
            op.ratio(),
            describe(op.entry)
        );
    }
    Ok(())
}
