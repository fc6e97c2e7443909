//! Background batching writer
//!
//! Producers push records onto an mpsc queue; a single worker thread owns
//! the buffer, the file handle and any rotation state. The worker writes a
//! batch when it reaches `batch_size`, when `flush_interval` has passed
//! with records pending, or when a flush is requested.
//!
//! Shutdown drops the queue's sender. The worker then receives everything
//! still queued, writes it, and exits, so nothing accepted before shutdown
//! is lost.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::emitter::Emitter;
use super::{registry, reject_closed, Counters, RecordSink, WriterStats};
use crate::config::{RotationConfig, WriterConfig};
use crate::error::SinkError;

/// How long the worker blocks on the queue before re-checking its timers.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Upper bound on how long `flush` waits for the worker.
const FLUSH_WAIT: Duration = Duration::from_millis(250);

/// Producer end of the queue.
#[derive(Debug)]
enum Queue {
    Unbounded(Sender<String>),
    Bounded(SyncSender<String>, usize),
}

/// State shared between producers and the worker.
#[derive(Debug, Default)]
struct Shared {
    counters: Counters,
    flush_requested: AtomicBool,
}

#[derive(Debug)]
struct Worker {
    handle: JoinHandle<()>,
    done: Receiver<()>,
}

#[derive(Debug)]
pub(crate) struct WriterCore {
    path: PathBuf,
    queue: Mutex<Option<Queue>>,
    shared: Arc<Shared>,
    worker: Mutex<Option<Worker>>,
    shutdown_timeout: Duration,
    warned_closed: AtomicBool,
    warned_full: AtomicBool,
}

/// Non-blocking writer with one background worker per instance.
///
/// Cloning is cheap and yields a handle to the same worker. The worker is
/// shut down when the last handle is dropped, when [`RecordSink::shutdown`]
/// is called, or at process exit through the [`registry`].
#[derive(Debug, Clone)]
pub struct AsyncWriter {
    core: Arc<WriterCore>,
}

struct Settings {
    batch_size: usize,
    flush_interval: Duration,
}

impl AsyncWriter {
    /// Spawn the worker for `path`. Rotation applies when `rotation.enabled`.
    pub fn new(
        path: impl Into<PathBuf>,
        config: &WriterConfig,
        rotation: &RotationConfig,
    ) -> std::io::Result<Self> {
        let path = path.into();
        let emitter = Emitter::new(&path, rotation);

        let (queue, rx) = match config.capacity() {
            Some(capacity) => {
                let (tx, rx) = mpsc::sync_channel(capacity);
                (Queue::Bounded(tx, capacity), rx)
            }
            None => {
                let (tx, rx) = mpsc::channel();
                (Queue::Unbounded(tx), rx)
            }
        };

        let shared = Arc::new(Shared::default());
        let (done_tx, done_rx) = mpsc::channel();
        let settings = Settings {
            batch_size: config.batch_size.max(1),
            flush_interval: config.flush_interval(),
        };

        let worker_shared = Arc::clone(&shared);
        let worker_path = path.clone();
        let handle = thread::Builder::new()
            .name("flowlog-writer".to_string())
            .spawn(move || {
                run(rx, emitter, &worker_shared, &settings, &worker_path);
                let _ = done_tx.send(());
            })?;

        let core = Arc::new(WriterCore {
            path,
            queue: Mutex::new(Some(queue)),
            shared,
            worker: Mutex::new(Some(Worker {
                handle,
                done: done_rx,
            })),
            shutdown_timeout: config.shutdown_timeout(),
            warned_closed: AtomicBool::new(false),
            warned_full: AtomicBool::new(false),
        });
        registry::register(&core);
        Ok(Self { core })
    }

    /// Shut down using the configured timeout.
    pub fn close(&self) {
        self.core.shutdown(self.core.shutdown_timeout);
    }
}

impl RecordSink for AsyncWriter {
    fn write(&self, record: String) -> Result<(), SinkError> {
        self.core.write(record)
    }

    fn flush(&self) {
        self.core.flush();
    }

    fn shutdown(&self, timeout: Duration) {
        self.core.shutdown(timeout);
    }

    fn is_closed(&self) -> bool {
        self.core.is_closed()
    }

    fn stats(&self) -> WriterStats {
        self.core.shared.counters.snapshot()
    }

    fn path(&self) -> &Path {
        &self.core.path
    }
}

impl WriterCore {
    fn write(&self, record: String) -> Result<(), SinkError> {
        let counters = &self.shared.counters;
        let queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        let result = match queue.as_ref() {
            None => Err(reject_closed(&self.path, &self.warned_closed, counters)),
            Some(Queue::Unbounded(tx)) => tx
                .send(record)
                .map_err(|_| SinkError::Disconnected(self.path.clone())),
            Some(Queue::Bounded(tx, capacity)) => match tx.try_send(record) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(_)) => {
                    if !self.warned_full.swap(true, Ordering::Relaxed) {
                        tracing::warn!(
                            path = %self.path.display(),
                            capacity = *capacity,
                            "log queue full, rejecting records"
                        );
                    }
                    Err(SinkError::QueueFull {
                        path: self.path.clone(),
                        capacity: *capacity,
                    })
                }
                Err(TrySendError::Disconnected(_)) => {
                    Err(SinkError::Disconnected(self.path.clone()))
                }
            },
        };
        drop(queue);

        match &result {
            Ok(()) => counters.enqueued(),
            Err(SinkError::Closed(_)) => {}
            Err(_) => counters.dropped(1),
        }
        result
    }

    fn flush(&self) {
        if self.is_closed() {
            return;
        }
        let flag = &self.shared.flush_requested;
        flag.store(true, Ordering::SeqCst);
        let deadline = Instant::now() + FLUSH_WAIT;
        while flag.load(Ordering::SeqCst) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
    }

    fn is_closed(&self) -> bool {
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }

    pub(crate) fn shutdown(&self, timeout: Duration) {
        // Dropping the sender lets the worker drain and exit.
        let queue = self
            .queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        drop(queue);

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let Some(worker) = worker else {
            return;
        };

        match worker.done.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if worker.handle.join().is_err() {
                    tracing::error!(path = %self.path.display(), "log writer thread panicked");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    path = %self.path.display(),
                    timeout_ms = timeout.as_millis() as u64,
                    "log writer did not finish within the shutdown timeout"
                );
            }
        }
    }

    pub(crate) fn default_timeout(&self) -> Duration {
        self.shutdown_timeout
    }
}

impl Drop for WriterCore {
    fn drop(&mut self) {
        self.shutdown(self.shutdown_timeout);
    }
}

fn run(
    rx: Receiver<String>,
    mut emitter: Emitter,
    shared: &Shared,
    settings: &Settings,
    path: &Path,
) {
    let counters = &shared.counters;
    let mut buffer: Vec<String> = Vec::with_capacity(settings.batch_size);
    let mut last_flush = Instant::now();

    loop {
        if shared.flush_requested.load(Ordering::SeqCst) {
            buffer.extend(rx.try_iter());
            counters.write_batch(&mut emitter, &buffer, path);
            buffer.clear();
            last_flush = Instant::now();
            shared.flush_requested.store(false, Ordering::SeqCst);
            continue;
        }

        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(record) => buffer.push(record),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let full = buffer.len() >= settings.batch_size;
        let stale = !buffer.is_empty() && last_flush.elapsed() >= settings.flush_interval;
        if full || stale {
            counters.write_batch(&mut emitter, &buffer, path);
            buffer.clear();
            last_flush = Instant::now();
        }
    }

    // Every sender is gone, so the queue is fully received.
    counters.write_batch(&mut emitter, &buffer, path);
    shared.flush_requested.store(false, Ordering::SeqCst);
    tracing::debug!(path = %path.display(), "log writer stopped");
}
