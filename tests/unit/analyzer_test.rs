//! Unit tests for the log analyzer over a realistic log

use flowlog::analyzer::{key, stats, SlowThresholds};
use flowlog::{EventKind, LogAnalyzer};

use crate::helpers::{load_fixture, BOOKING_SESSION, WEATHER_SESSION};

fn sample() -> LogAnalyzer {
    LogAnalyzer::from_text(&load_fixture("sample_flow.log"))
}

#[test]
fn parses_every_block() {
    let analyzer = sample();
    let kinds: Vec<EventKind> = analyzer.entries().iter().map(|e| e.event_type).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::QueryStart,
            EventKind::QueryAnalysis,
            EventKind::ToolSelection,
            EventKind::ToolExecution,
            EventKind::LlmCall,
            EventKind::QueryComplete,
            EventKind::QueryStart,
            EventKind::ToolExecution,
            EventKind::Error,
            EventKind::QueryComplete,
        ]
    );
}

#[test]
fn recovers_scalar_metadata() {
    let analyzer = sample();
    let entries = analyzer.entries();

    assert_eq!(entries[0].text(key::QUERY), Some("What is the weather in Vienna?"));
    assert_eq!(entries[1].number(key::CONFIDENCE), Some(0.92));
    assert_eq!(entries[3].text(key::TOOL_NAME), Some("weather_api"));
    assert_eq!(entries[3].duration(), Some(6.5));
    assert_eq!(entries[4].text(key::MODEL), Some("gpt-4o"));
    assert_eq!(entries[4].number(key::TOTAL_TOKENS), Some(150.0));
    assert_eq!(entries[5].duration(), Some(9.0));
    assert_eq!(entries[8].text(key::ERROR_TYPE), Some("ServiceUnavailable"));
    assert_eq!(
        entries[8].text(key::ERROR_MESSAGE),
        Some("booking backend returned 503")
    );
}

#[test]
fn filter_by_session_splits_queries() {
    let analyzer = sample();
    assert_eq!(analyzer.filter_by_session(WEATHER_SESSION).len(), 6);
    assert_eq!(analyzer.filter_by_session(BOOKING_SESSION).len(), 4);
    assert!(analyzer.filter_by_session("unknown").is_empty());
}

#[test]
fn timing_stats_over_fixture() {
    let analyzer = sample();
    let by_type = analyzer.timing_stats();

    let tools = by_type[stats::TOOL_EXECUTION];
    assert_eq!(tools.count, 2);
    assert_eq!(tools.min, 1.0);
    assert_eq!(tools.max, 6.5);
    assert_eq!(tools.avg, 3.75);

    assert_eq!(by_type[stats::LLM_CALL].count, 1);
    assert_eq!(by_type[stats::QUERY_TOTAL].count, 2);

    let by_tool = analyzer.timing_stats_by_tool();
    assert_eq!(by_tool.len(), 2);
    assert_eq!(by_tool["booking_api"].max, 1.0);
}

#[test]
fn errors_cover_error_records_and_failed_statuses() {
    let analyzer = sample();
    let errors = analyzer.find_errors();
    let kinds: Vec<EventKind> = errors.iter().map(|e| e.event_type).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::ToolExecution,
            EventKind::Error,
            EventKind::QueryComplete
        ]
    );
}

#[test]
fn slow_operations_with_default_and_custom_thresholds() {
    let analyzer = sample();

    let slow = analyzer.find_slow(&SlowThresholds::default());
    assert_eq!(slow.len(), 1);
    assert_eq!(slow[0].entry.text(key::TOOL_NAME), Some("weather_api"));

    let strict = SlowThresholds {
        tool: 0.5,
        llm: 2.0,
        query: 1.2,
    };
    // 1.2s query total sits exactly on the threshold and is not slow.
    assert_eq!(analyzer.find_slow(&strict).len(), 4);
}

#[test]
fn session_summaries() {
    let analyzer = sample();
    let sessions = analyzer.sessions();
    assert_eq!(sessions.len(), 2);

    let weather = &sessions[0];
    assert_eq!(weather.session_id, WEATHER_SESSION);
    assert_eq!(weather.events, 6);
    assert_eq!(weather.tool_calls, 1);
    assert_eq!(weather.llm_calls, 1);
    assert_eq!(weather.errors, 0);
    assert_eq!(weather.total_tokens, 150);
    assert_eq!(weather.total_duration, 9.0);

    let booking = &sessions[1];
    assert_eq!(booking.session_id, BOOKING_SESSION);
    assert_eq!(booking.errors, 3);
}

#[test]
fn raw_content_is_kept_without_separator() {
    let analyzer = sample();
    let raw = &analyzer.entries()[8].raw;
    assert!(raw.starts_with("[2026-01-19 10:05:01.100] ERROR"));
    assert!(raw.ends_with("Message: booking backend returned 503"));
    assert!(!raw.contains("===="));
}

#[test]
fn csv_export_has_one_row_per_entry() {
    let csv = sample().to_csv();
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows.len(), 11);
    assert!(rows[4].starts_with("2026-01-19T10:00:06.700,TOOL_EXECUTION,"));
    assert!(rows[4].ends_with(",6.700,6.500,success,weather_api,"));
}
