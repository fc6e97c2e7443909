//! Recorder to disk to analyzer, through the real writers

use std::fs;
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

use flowlog::config::{RotationConfig, WriterConfig};
use flowlog::writer::shared_sink;
use flowlog::{AsyncWriter, Config, FlowRecorder, LogAnalyzer, RecordSink, Session, SinkError};

use crate::helpers::wait_until;

fn config_for(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.logging.directory = dir.path().to_string_lossy().into_owned();
    config.logging.file_name = "flow.log".to_string();
    config
}

fn run_query(recorder: &FlowRecorder, tag: &str) {
    recorder.record_query_start(&format!("query {}", tag));
    recorder.record_tool_execution("search", tag, "done", Duration::from_millis(20), "success");
    recorder.record_query_complete(tag, Duration::from_millis(40), "success");
}

#[test]
fn async_recorder_output_is_parseable() {
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir);
    let recorder = FlowRecorder::from_config(&config, Session::with_id("async-1")).unwrap();

    run_query(&recorder, "a");
    recorder.flush();
    recorder.shutdown(Duration::from_secs(5));

    let analyzer = LogAnalyzer::open(config.log_path()).unwrap();
    assert_eq!(analyzer.entries().len(), 3);
    assert_eq!(analyzer.filter_by_session("async-1").len(), 3);
    assert_eq!(recorder.failure_count(), 0);

    let stats = recorder.stats().unwrap();
    assert_eq!(stats.enqueued, 3);
    assert_eq!(stats.written, 3);
}

#[test]
fn sync_mode_writes_immediately() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for(&dir);
    config.writer.async_enabled = false;
    let recorder = FlowRecorder::from_config(&config, Session::with_id("sync-1")).unwrap();

    recorder.record_query_start("hello");
    let text = fs::read_to_string(config.log_path()).unwrap();
    assert!(text.contains("QUERY_START Session: sync-1"));
    recorder.shutdown(Duration::from_secs(1));
}

#[test]
fn sessions_sharing_a_file_keep_their_own_records() {
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let config = config.clone();
            thread::spawn(move || {
                let recorder =
                    FlowRecorder::from_config(&config, Session::with_id(format!("s{}", i)))
                        .unwrap();
                for q in 0..5 {
                    run_query(&recorder, &format!("{}-{}", i, q));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let sink = shared_sink(&config.log_path(), &config).unwrap();
    sink.shutdown(Duration::from_secs(5));

    let analyzer = LogAnalyzer::open(config.log_path()).unwrap();
    assert_eq!(analyzer.entries().len(), 4 * 5 * 3);
    for i in 0..4 {
        assert_eq!(analyzer.filter_by_session(&format!("s{}", i)).len(), 15);
    }
}

#[test]
fn partial_batch_reaches_disk_without_flush() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flow.log");
    let writer_config = WriterConfig {
        batch_size: 100,
        flush_interval_ms: 50,
        ..WriterConfig::default()
    };
    let writer = AsyncWriter::new(&path, &writer_config, &RotationConfig::default()).unwrap();

    writer.write("only record".to_string()).unwrap();
    let landed = wait_until(Duration::from_secs(5), || {
        fs::read_to_string(&path).is_ok_and(|text| text == "only record\n")
    });
    assert!(landed);
    writer.close();
}

#[test]
fn writes_after_shutdown_are_rejected_and_counted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flow.log");
    let writer =
        AsyncWriter::new(&path, &WriterConfig::default(), &RotationConfig::default()).unwrap();

    writer.write("before".to_string()).unwrap();
    writer.close();
    let err = writer.write("after".to_string()).unwrap_err();
    assert_eq!(err, SinkError::Closed(path.clone()));

    let stats = writer.stats();
    assert_eq!(stats.written, 1);
    assert_eq!(stats.dropped, 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), "before\n");
}

#[test]
fn disabled_logging_creates_no_file() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for(&dir);
    config.logging.enabled = false;
    let recorder = FlowRecorder::from_config(&config, Session::with_id("off")).unwrap();

    run_query(&recorder, "x");
    recorder.flush();
    assert!(!recorder.is_enabled());
    assert!(!config.log_path().exists());
}
