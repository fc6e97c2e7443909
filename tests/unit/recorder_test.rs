//! Recorder output parsed back by the analyzer

use std::sync::Arc;
use std::time::Duration;

use flowlog::analyzer::key;
use flowlog::config::RedactionConfig;
use flowlog::format::{self, FormatOptions};
use flowlog::{DetailLevel, Event, EventKind, FlowRecorder, LogAnalyzer, Redactor, Session, TokenUsage};

use crate::helpers::{fixed_time, MemorySink};

fn record_query(recorder: &FlowRecorder) {
    recorder.record_query_start("What is 2+2?");
    recorder.record_query_analysis("arithmetic", true, "needs a calculator", 0.9);
    recorder.record_tool_selection("calculator", "exact arithmetic", 0.95);
    recorder.record_tool_execution(
        "calculator",
        "{\"expr\": \"2+2\"}",
        "4",
        Duration::from_millis(1500),
        "success",
    );
    recorder.record_llm_call(
        "gpt-4o",
        "Explain the result\nbriefly",
        "The answer is 4.",
        Duration::from_millis(2250),
        Some(TokenUsage::new(40, 10)),
        "success",
    );
    recorder.record_error("Timeout", "upstream timed out", Some("at step 3\nat step 4"));
    recorder.record_query_complete("4", Duration::from_secs(4), "success");
}

fn recorded(detail: DetailLevel) -> LogAnalyzer {
    let sink = Arc::new(MemorySink::default());
    let recorder = FlowRecorder::new(
        Session::with_id("roundtrip"),
        sink.clone(),
        FormatOptions::default().with_detail_level(detail),
    );
    record_query(&recorder);
    LogAnalyzer::from_text(&sink.text())
}

#[test]
fn normal_blocks_round_trip() {
    let analyzer = recorded(DetailLevel::Normal);
    let entries = analyzer.entries();
    assert_eq!(entries.len(), 7);
    assert!(entries
        .iter()
        .all(|e| e.session_id.as_deref() == Some("roundtrip")));

    let tool = &entries[3];
    assert_eq!(tool.event_type, EventKind::ToolExecution);
    assert_eq!(tool.text(key::TOOL_NAME), Some("calculator"));
    assert_eq!(tool.status(), Some("success"));
    assert_eq!(tool.duration(), Some(1.5));

    let llm = &entries[4];
    assert_eq!(llm.text(key::MODEL), Some("gpt-4o"));
    assert_eq!(llm.duration(), Some(2.25));
    assert_eq!(llm.number(key::PROMPT_TOKENS), Some(40.0));
    assert_eq!(llm.number(key::TOTAL_TOKENS), Some(50.0));

    let error = &entries[5];
    assert_eq!(error.text(key::ERROR_TYPE), Some("Timeout"));
    assert_eq!(error.text(key::ERROR_MESSAGE), Some("upstream timed out"));

    let complete = &entries[6];
    assert_eq!(complete.duration(), Some(4.0));
}

#[test]
fn minimal_lines_round_trip_with_session_carry_forward() {
    let analyzer = recorded(DetailLevel::Minimal);
    let entries = analyzer.entries();
    assert_eq!(entries.len(), 7);
    // Only QUERY_START and QUERY_COMPLETE carry the ID on minimal lines.
    assert_eq!(analyzer.filter_by_session("roundtrip").len(), 7);
    assert_eq!(entries[3].duration(), Some(1.5));
    assert_eq!(entries[4].text(key::MODEL), Some("gpt-4o"));
    assert_eq!(entries[5].text(key::ERROR_TYPE), Some("Timeout"));
}

#[test]
fn verbose_keeps_long_payloads() {
    let sink = Arc::new(MemorySink::default());
    let options = FormatOptions {
        detail_level: DetailLevel::Verbose,
        max_content_length: 10,
        indent_size: 2,
    };
    let recorder = FlowRecorder::new(Session::with_id("v"), sink.clone(), options);
    let long = "x".repeat(50);
    recorder.record_tool_execution("t", &long, "ok", Duration::from_secs(1), "success");

    let text = sink.text();
    assert!(text.contains(&long));
    assert!(!text.contains("truncated"));
}

#[test]
fn normal_truncation_reports_original_length() {
    let sink = Arc::new(MemorySink::default());
    let options = FormatOptions {
        detail_level: DetailLevel::Normal,
        max_content_length: 10,
        indent_size: 2,
    };
    let recorder = FlowRecorder::new(Session::with_id("t"), sink.clone(), options);
    recorder.record_tool_execution("t", &"x".repeat(50), "ok", Duration::from_secs(1), "success");

    let analyzer = LogAnalyzer::from_text(&sink.text());
    let entry = &analyzer.entries()[0];
    assert_eq!(entry.number("input_original_length"), Some(50.0));
    assert!(entry.number("output_original_length").is_none());
}

#[test]
fn redacted_prompts_never_reach_the_log() {
    let sink = Arc::new(MemorySink::default());
    let recorder = FlowRecorder::new(Session::with_id("r"), sink.clone(), FormatOptions::default())
        .with_redactor(Redactor::from_config(&RedactionConfig {
            enabled: true,
            ..RedactionConfig::default()
        }));
    recorder.record_llm_call(
        "gpt-4o",
        "my secret prompt",
        "secret answer",
        Duration::from_secs(1),
        None,
        "success",
    );

    let text = sink.text();
    assert!(!text.contains("my secret prompt"));
    assert!(!text.contains("secret answer"));
    assert!(text.contains("Model: gpt-4o"));
}

#[test]
fn fixed_timestamps_render_deterministically() {
    let event = Event::QueryStart {
        query: "hello".to_string(),
    };
    let line = format::render_at(
        &event,
        "s1",
        Duration::ZERO,
        fixed_time(10, 0, 0),
        &FormatOptions::default().with_detail_level(DetailLevel::Minimal),
    );
    assert_eq!(
        line,
        "[2026-01-19 10:00:00.000] QUERY_START Session: s1 [+0.000s] | Query: hello"
    );
}

#[test]
fn session_ids_with_spaces_round_trip() {
    for detail in [DetailLevel::Normal, DetailLevel::Minimal] {
        let sink = Arc::new(MemorySink::default());
        let recorder = FlowRecorder::new(
            Session::with_id("user 42"),
            sink.clone(),
            FormatOptions::default().with_detail_level(detail),
        );
        record_query(&recorder);

        let analyzer = LogAnalyzer::from_text(&sink.text());
        assert_eq!(analyzer.entries().len(), 7);
        assert_eq!(analyzer.filter_by_session("user 42").len(), 7);
        assert!(analyzer.entries().iter().all(|e| e.elapsed.is_some()));
        assert_eq!(analyzer.sessions().len(), 1);
    }
}

#[test]
fn payload_text_cannot_overwrite_minimal_fields() {
    let sink = Arc::new(MemorySink::default());
    let recorder = FlowRecorder::new(
        Session::with_id("s"),
        sink.clone(),
        FormatOptions::default().with_detail_level(DetailLevel::Minimal),
    );
    recorder.record_tool_execution(
        "grep",
        "x",
        "a | Status: failed | Duration: 42s",
        Duration::from_millis(100),
        "success",
    );

    let analyzer = LogAnalyzer::from_text(&sink.text());
    let entry = &analyzer.entries()[0];
    assert_eq!(entry.status(), Some("success"));
    assert_eq!(entry.duration(), Some(0.1));
    assert!(analyzer.find_errors().is_empty());
}

#[test]
fn zero_indent_payloads_do_not_leak_fields() {
    let sink = Arc::new(MemorySink::default());
    let options = FormatOptions {
        indent_size: 0,
        ..FormatOptions::default()
    };
    let recorder = FlowRecorder::new(Session::with_id("s"), sink.clone(), options);
    recorder.record_tool_execution(
        "grep",
        "x",
        "line\nStatus: failed\nDuration: 99.000s",
        Duration::from_millis(100),
        "success",
    );

    let analyzer = LogAnalyzer::from_text(&sink.text());
    let entry = &analyzer.entries()[0];
    assert_eq!(entry.status(), Some("success"));
    assert_eq!(entry.duration(), Some(0.1));
}

#[test]
fn empty_redacted_prompt_is_still_marked() {
    let sink = Arc::new(MemorySink::default());
    let recorder = FlowRecorder::new(Session::with_id("r"), sink.clone(), FormatOptions::default())
        .with_redactor(Redactor::from_config(&RedactionConfig {
            enabled: true,
            ..RedactionConfig::default()
        }));
    recorder.record_llm_call("gpt-4o", "", "ok", Duration::from_secs(1), None, "success");

    assert!(sink.text().contains("[REDACTED prompt: 0 chars]"));
}
