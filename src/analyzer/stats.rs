//! Timing statistics, error and slow-operation search, session rollups.

use std::collections::{BTreeMap, HashMap};

use super::types::{key, LogEntry, SessionSummary, SlowOperation, SlowThresholds, TimingStats};
use crate::event::EventKind;

/// Operation groups reported by [`timing_stats`].
pub const TOOL_EXECUTION: &str = "tool_execution";
pub const LLM_CALL: &str = "llm_call";
pub const QUERY_TOTAL: &str = "query_total";

fn group(kind: EventKind) -> Option<&'static str> {
    match kind {
        EventKind::ToolExecution => Some(TOOL_EXECUTION),
        EventKind::LlmCall => Some(LLM_CALL),
        EventKind::QueryComplete => Some(QUERY_TOTAL),
        _ => None,
    }
}

/// Durations grouped by operation type. Groups without samples are omitted.
pub fn timing_stats(entries: &[LogEntry]) -> BTreeMap<&'static str, TimingStats> {
    let mut samples: BTreeMap<&'static str, Vec<f64>> = BTreeMap::new();
    for entry in entries {
        if let (Some(group), Some(duration)) = (group(entry.event_type), entry.duration()) {
            samples.entry(group).or_default().push(duration);
        }
    }
    samples
        .into_iter()
        .filter_map(|(group, values)| TimingStats::from_samples(&values).map(|s| (group, s)))
        .collect()
}

/// Tool execution durations grouped by tool name.
pub fn timing_stats_by_tool(entries: &[LogEntry]) -> BTreeMap<String, TimingStats> {
    let mut samples: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for entry in entries {
        if entry.event_type != EventKind::ToolExecution {
            continue;
        }
        if let (Some(tool), Some(duration)) = (entry.text(key::TOOL_NAME), entry.duration()) {
            samples.entry(tool.to_string()).or_default().push(duration);
        }
    }
    samples
        .into_iter()
        .filter_map(|(tool, values)| TimingStats::from_samples(&values).map(|s| (tool, s)))
        .collect()
}

pub fn find_errors(entries: &[LogEntry]) -> Vec<&LogEntry> {
    entries.iter().filter(|entry| entry.is_error()).collect()
}

/// Entries whose duration is strictly above the threshold for their kind.
pub fn find_slow<'a>(entries: &'a [LogEntry], thresholds: &SlowThresholds) -> Vec<SlowOperation<'a>> {
    entries
        .iter()
        .filter_map(|entry| {
            let threshold = thresholds.for_kind(entry.event_type)?;
            let duration = entry.duration()?;
            (duration > threshold).then_some(SlowOperation {
                entry,
                duration,
                threshold,
            })
        })
        .collect()
}

/// One summary per session ID, in order of first appearance.
pub fn sessions(entries: &[LogEntry]) -> Vec<SessionSummary> {
    let mut summaries: Vec<SessionSummary> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for entry in entries {
        let Some(id) = entry.session_id.as_deref() else {
            continue;
        };
        let slot = *index.entry(id).or_insert_with(|| {
            summaries.push(SessionSummary {
                session_id: id.to_string(),
                first_seen: entry.timestamp,
                last_seen: entry.timestamp,
                events: 0,
                queries: 0,
                tool_calls: 0,
                llm_calls: 0,
                errors: 0,
                total_duration: 0.0,
                total_tokens: 0,
            });
            summaries.len() - 1
        });

        let summary = &mut summaries[slot];
        summary.events += 1;
        summary.first_seen = summary.first_seen.min(entry.timestamp);
        summary.last_seen = summary.last_seen.max(entry.timestamp);
        if entry.is_error() {
            summary.errors += 1;
        }
        match entry.event_type {
            EventKind::QueryStart => summary.queries += 1,
            EventKind::ToolExecution => summary.tool_calls += 1,
            EventKind::LlmCall => {
                summary.llm_calls += 1;
                if let Some(tokens) = entry.number(key::TOTAL_TOKENS) {
                    summary.total_tokens += tokens as u64;
                }
            }
            EventKind::QueryComplete => {
                summary.total_duration += entry.duration().unwrap_or(0.0);
            }
            _ => {}
        }
    }
    summaries
}
