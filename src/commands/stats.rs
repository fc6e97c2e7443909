//! Stats command handler

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;

use flowlog::cli::LogFile;
use flowlog::TimingStats;

use super::open_log;

#[derive(Serialize)]
struct StatsReport<'a> {
    by_type: &'a BTreeMap<&'static str, TimingStats>,
    by_tool: &'a BTreeMap<String, TimingStats>,
}

/// Print timing statistics per operation type and per tool.
#[cfg(not(tarpaulin_include))]
pub fn handle(log: &LogFile, json: bool) -> Result<()> {
    let analyzer = open_log(log)?;
    let by_type = analyzer.timing_stats();
    let by_tool = analyzer.timing_stats_by_tool();

    if json {
        let report = StatsReport {
            by_type: &by_type,
            by_tool: &by_tool,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if by_type.is_empty() {
        println!("No timed operations found.");
        return Ok(());
    }

    print_table("Operation", by_type.iter().map(|(name, s)| (name.to_string(), s)));
    if !by_tool.is_empty() {
        println!();
        print_table("Tool", by_tool.iter().map(|(name, s)| (name.clone(), s)));
    }
    Ok(())
}

fn print_table<'a>(title: &str, rows: impl Iterator<Item = (String, &'a TimingStats)>) {
    println!(
        "{:<24} {:>6} {:>9} {:>9} {:>9} {:>9}",
        title, "count", "avg", "min", "max", "p95"
    );
    for (name, stats) in rows {
        println!("{}", format_row(&name, stats));
    }
}

fn format_row(name: &str, stats: &TimingStats) -> String {
    format!(
        "{:<24} {:>6} {:>8.3}s {:>8.3}s {:>8.3}s {:>8.3}s",
        super::truncate_string(name, 24),
        stats.count,
        stats.avg,
        stats.min,
        stats.max,
        stats.p95
    )
}
