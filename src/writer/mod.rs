//! Record sinks
//!
//! A [`RecordSink`] accepts rendered records and gets them onto disk. Two
//! implementations share the same batch emitter:
//!
//! - [`AsyncWriter`]: one background worker per instance, producers only
//!   push onto a queue
//! - [`SyncWriter`]: writes each record on the calling thread behind a mutex
//!
//! Neither ever returns an I/O error to a producer. Failures are counted in
//! [`WriterStats`] and reported through `tracing`.

mod async_writer;
mod emitter;
pub mod registry;

pub use async_writer::AsyncWriter;
pub use registry::{shared_sink, shutdown_all};

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::config::RotationConfig;
use crate::error::SinkError;
use emitter::Emitter;

/// Destination for rendered records.
pub trait RecordSink: Send + Sync {
    /// Hand over one record. Must not block on I/O in async sinks.
    fn write(&self, record: String) -> Result<(), SinkError>;

    /// Push buffered records to disk, waiting only briefly.
    fn flush(&self);

    /// Stop accepting records and drain what is pending. Idempotent.
    fn shutdown(&self, timeout: Duration);

    fn is_closed(&self) -> bool;

    fn stats(&self) -> WriterStats;

    fn path(&self) -> &Path;
}

/// Point-in-time counters of a sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriterStats {
    /// Records accepted by `write`
    pub enqueued: u64,
    /// Records that reached the file
    pub written: u64,
    /// Records lost: rejected, written after shutdown, or in a failed batch
    pub dropped: u64,
    /// Failed batch writes
    pub write_errors: u64,
    /// Batches written
    pub batches: u64,
    pub rotations: u64,
    pub rotation_failures: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    enqueued: AtomicU64,
    written: AtomicU64,
    dropped: AtomicU64,
    write_errors: AtomicU64,
    batches: AtomicU64,
    rotations: AtomicU64,
    rotation_failures: AtomicU64,
}

impl Counters {
    pub(crate) fn enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn dropped(&self, count: u64) {
        self.dropped.fetch_add(count, Ordering::Relaxed);
    }

    /// Write `batch` through `emitter` and account for the outcome.
    pub(crate) fn write_batch(&self, emitter: &mut Emitter, batch: &[String], path: &Path) {
        if batch.is_empty() {
            return;
        }
        let count = batch.len() as u64;
        match emitter.write_batch(batch) {
            Ok(()) => {
                self.written.fetch_add(count, Ordering::Relaxed);
                self.batches.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.write_errors.fetch_add(1, Ordering::Relaxed);
                self.dropped.fetch_add(count, Ordering::Relaxed);
                tracing::warn!(
                    path = %path.display(),
                    records = count,
                    error = %e,
                    "failed to write log batch"
                );
            }
        }
        let (rotations, failures) = emitter.rotations();
        self.rotations.store(rotations, Ordering::Relaxed);
        self.rotation_failures.store(failures, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> WriterStats {
        WriterStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
            rotation_failures: self.rotation_failures.load(Ordering::Relaxed),
        }
    }
}

/// Log once per sink that records are arriving after shutdown.
pub(crate) fn reject_closed(path: &Path, warned: &AtomicBool, counters: &Counters) -> SinkError {
    counters.dropped(1);
    if !warned.swap(true, Ordering::Relaxed) {
        tracing::warn!(
            path = %path.display(),
            "record written after shutdown, dropping it (further drops are not logged)"
        );
    }
    SinkError::Closed(path.to_path_buf())
}

/// Writes every record immediately on the caller's thread.
#[derive(Debug)]
pub struct SyncWriter {
    path: PathBuf,
    emitter: Mutex<Emitter>,
    counters: Counters,
    closed: AtomicBool,
    warned_closed: AtomicBool,
}

impl SyncWriter {
    pub fn new(path: impl Into<PathBuf>, rotation: &RotationConfig) -> Self {
        let path = path.into();
        let emitter = Emitter::new(&path, rotation);
        Self {
            path,
            emitter: Mutex::new(emitter),
            counters: Counters::default(),
            closed: AtomicBool::new(false),
            warned_closed: AtomicBool::new(false),
        }
    }
}

impl RecordSink for SyncWriter {
    fn write(&self, record: String) -> Result<(), SinkError> {
        if self.is_closed() {
            return Err(reject_closed(&self.path, &self.warned_closed, &self.counters));
        }
        self.counters.enqueued();
        let mut emitter = self.emitter.lock().unwrap_or_else(|e| e.into_inner());
        self.counters
            .write_batch(&mut emitter, std::slice::from_ref(&record), &self.path);
        Ok(())
    }

    fn flush(&self) {}

    fn shutdown(&self, _timeout: Duration) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn stats(&self) -> WriterStats {
        self.counters.snapshot()
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
