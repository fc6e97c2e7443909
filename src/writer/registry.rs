//! Process-wide writer registry
//!
//! Every [`AsyncWriter`] registers itself on construction. The first
//! registration installs an exit hook (`atexit`) and, when called from the
//! main thread, a termination signal listener. Both shut down every live
//! writer so records still queued at exit reach the file.
//!
//! The registry also hands out one shared sink per log path, so recorders
//! for many sessions can append to the same file through a single worker.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Once, OnceLock, Weak};

use super::async_writer::WriterCore;
use super::{AsyncWriter, RecordSink, SyncWriter};
use crate::config::Config;

fn writers() -> &'static Mutex<Vec<Weak<WriterCore>>> {
    static WRITERS: OnceLock<Mutex<Vec<Weak<WriterCore>>>> = OnceLock::new();
    WRITERS.get_or_init(|| Mutex::new(Vec::new()))
}

fn shared_sinks() -> &'static Mutex<HashMap<PathBuf, Arc<dyn RecordSink>>> {
    static SINKS: OnceLock<Mutex<HashMap<PathBuf, Arc<dyn RecordSink>>>> = OnceLock::new();
    SINKS.get_or_init(|| Mutex::new(HashMap::new()))
}

pub(crate) fn register(core: &Arc<WriterCore>) {
    install_exit_hook();
    let mut writers = writers().lock().unwrap_or_else(|e| e.into_inner());
    writers.retain(|weak| weak.strong_count() > 0);
    writers.push(Arc::downgrade(core));
}

/// Number of writers still alive.
pub fn live_writers() -> usize {
    writers()
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .iter()
        .filter(|weak| weak.strong_count() > 0)
        .count()
}

/// Shut down every live writer, each bounded by its own configured timeout.
pub fn shutdown_all() {
    let live: Vec<Arc<WriterCore>> = writers()
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .iter()
        .filter_map(Weak::upgrade)
        .collect();
    for core in live {
        core.shutdown(core.default_timeout());
    }
}

/// The sink for `path`, created from `config` on first use.
///
/// Later calls for the same path return the same sink as long as it has not
/// been shut down; settings passed on later calls are ignored.
pub fn shared_sink(path: &Path, config: &Config) -> io::Result<Arc<dyn RecordSink>> {
    let key = canonical(path);
    let mut sinks = shared_sinks().lock().unwrap_or_else(|e| e.into_inner());
    if let Some(sink) = sinks.get(&key) {
        if !sink.is_closed() {
            return Ok(Arc::clone(sink));
        }
    }

    let sink: Arc<dyn RecordSink> = if config.writer.async_enabled {
        Arc::new(AsyncWriter::new(path, &config.writer, &config.rotation)?)
    } else {
        Arc::new(SyncWriter::new(path, &config.rotation))
    };
    sinks.insert(key, Arc::clone(&sink));
    Ok(sink)
}

/// Same file, same key: resolve the parent directory when it exists.
fn canonical(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|dir| dir.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}

fn install_exit_hook() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        #[cfg(unix)]
        {
            // SAFETY: `on_exit` is a plain function with C ABI that never unwinds.
            if unsafe { libc::atexit(on_exit) } != 0 {
                tracing::warn!("failed to register log writer exit hook");
            }
            install_signal_listener();
        }
    });
}

#[cfg(unix)]
extern "C" fn on_exit() {
    let _ = std::panic::catch_unwind(shutdown_all);
}

/// Flush writers on SIGTERM/SIGINT/SIGHUP, then let the default action run.
///
/// Only installed from the main thread; handlers registered from worker
/// threads are not portable.
#[cfg(unix)]
fn install_signal_listener() {
    use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    if std::thread::current().name() != Some("main") {
        tracing::debug!("not on the main thread, skipping log writer signal handlers");
        return;
    }

    let mut signals = match Signals::new([SIGTERM, SIGINT, SIGHUP]) {
        Ok(signals) => signals,
        Err(e) => {
            tracing::warn!(error = %e, "failed to install log writer signal handlers");
            return;
        }
    };
    let spawned = std::thread::Builder::new()
        .name("flowlog-signals".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                shutdown_all();
                let _ = signal_hook::low_level::emulate_default_handler(signal);
            }
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "failed to spawn log writer signal thread");
    }
}
