//! Sessions command handler

use anyhow::Result;

use flowlog::analyzer::SessionSummary;
use flowlog::cli::LogFile;

use super::open_log;

/// Summarize every session in the log.
#[cfg(not(tarpaulin_include))]
pub fn handle(log: &LogFile) -> Result<()> {
    let analyzer = open_log(log)?;
    let sessions = analyzer.sessions();

    if sessions.is_empty() {
        println!("No sessions found.");
        return Ok(());
    }

    println!("Sessions ({}):", sessions.len());
    for summary in &sessions {
        println!("{}", format_summary(summary));
    }
    Ok(())
}

fn format_summary(summary: &SessionSummary) -> String {
    let mut line = format!(
        "  {}  {}  events: {}, queries: {}, tools: {}, llm: {}, errors: {}, total: {:.3}s",
        summary.session_id,
        summary.first_seen.format("%Y-%m-%d %H:%M:%S"),
        summary.events,
        summary.queries,
        summary.tool_calls,
        summary.llm_calls,
        summary.errors,
        summary.total_duration
    );
    if summary.total_tokens > 0 {
        line.push_str(&format!(", tokens: {}", summary.total_tokens));
    }
    line
}
