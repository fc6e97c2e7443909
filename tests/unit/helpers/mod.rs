//! Test helper utilities

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{Local, TimeZone};
use tempfile::TempDir;

use flowlog::writer::WriterStats;
use flowlog::{RecordSink, SinkError};

/// Session ID used by the fixture's first query
pub const WEATHER_SESSION: &str = "20260119-100000-1a2b3c4d";

/// Session ID used by the fixture's second query
pub const BOOKING_SESSION: &str = "20260119-100500-5e6f7a8b";

/// Get the path to the fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Load a fixture file's contents
pub fn load_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to load fixture: {}", name))
}

/// Create a temporary directory with a copy of a fixture
pub fn temp_fixture(name: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let fixture_content = load_fixture(name);
    let temp_path = temp_dir.path().join(name);
    fs::write(&temp_path, fixture_content).expect("Failed to write temp fixture");
    (temp_dir, temp_path)
}

/// A fixed local timestamp for deterministic rendering
pub fn fixed_time(h: u32, m: u32, s: u32) -> chrono::DateTime<Local> {
    Local
        .with_ymd_and_hms(2026, 1, 19, h, m, s)
        .single()
        .expect("unambiguous local time")
}

/// Poll `check` until it returns true or `timeout` passes
pub fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    check()
}

/// Sink that keeps records in memory
#[derive(Default)]
pub struct MemorySink {
    pub records: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn text(&self) -> String {
        let records = self.records.lock().unwrap();
        let mut out = String::new();
        for record in records.iter() {
            out.push_str(record);
            out.push('\n');
        }
        out
    }
}

impl RecordSink for MemorySink {
    fn write(&self, record: String) -> Result<(), SinkError> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }

    fn flush(&self) {}

    fn shutdown(&self, _timeout: Duration) {}

    fn is_closed(&self) -> bool {
        false
    }

    fn stats(&self) -> WriterStats {
        WriterStats::default()
    }

    fn path(&self) -> &std::path::Path {
        std::path::Path::new("memory")
    }
}
