//! Log file rotation
//!
//! A [`RotationPolicy`] decides when the active file is retired; a
//! [`RotatingFile`] owns the handle and performs the rotation. The file is
//! only ever touched by the thread that owns the `RotatingFile`, so rotation
//! and appends are serialized without extra locking.
//!
//! Rotation failures are logged and counted, never returned: the file keeps
//! growing past its limit until a later attempt succeeds.

pub mod backups;
pub mod size;
pub mod time;

use chrono::{DateTime, Local};
use std::fmt::Debug;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::{RotationConfig, RotationKind};
pub use size::SizePolicy;
pub use time::TimePolicy;

/// How long to wait before retrying after a failed rotation.
const RETRY_BACKOFF: Duration = Duration::from_secs(30);

/// What a policy sees of the active file.
#[derive(Debug, Clone, Copy)]
pub struct RotationState {
    /// Bytes currently in the active file
    pub size: u64,
    /// When the active file was started
    pub opened_at: DateTime<Local>,
}

/// Decides when the active file must be retired.
pub trait RotationPolicy: Send + Debug {
    /// Whether the file should rotate before `incoming` more bytes are appended.
    fn should_rotate(&self, state: &RotationState, incoming: usize, now: DateTime<Local>) -> bool;

    /// Called after a successful rotation.
    fn rotated(&mut self, _now: DateTime<Local>) {}
}

/// Build the policy described by `config` for the file at `path`.
///
/// Time policies are anchored at the file's modification time when it
/// already exists, so a restart does not push the next rollover out.
pub fn policy_from_config(config: &RotationConfig, path: &Path) -> Box<dyn RotationPolicy> {
    match config.kind {
        RotationKind::Size => Box::new(SizePolicy::new(config.max_bytes)),
        RotationKind::Time => {
            let anchor = modified_at(path).unwrap_or_else(Local::now);
            Box::new(TimePolicy::new(config.schedule, config.interval_secs, anchor))
        }
    }
}

fn modified_at(path: &Path) -> Option<DateTime<Local>> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Local>::from(modified))
}

/// Append-only file that retires itself into numbered backups.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    file: Option<File>,
    state: RotationState,
    policy: Box<dyn RotationPolicy>,
    backup_count: usize,
    compress: bool,
    rotations: u64,
    rotation_failures: u64,
    retry_after: Option<Instant>,
}

impl RotatingFile {
    pub fn new(
        path: impl Into<PathBuf>,
        policy: Box<dyn RotationPolicy>,
        backup_count: usize,
        compress: bool,
    ) -> Self {
        let path = path.into();
        let state = RotationState {
            size: fs::metadata(&path).map(|m| m.len()).unwrap_or(0),
            opened_at: modified_at(&path).unwrap_or_else(Local::now),
        };
        Self {
            path,
            file: None,
            state,
            policy,
            backup_count,
            compress,
            rotations: 0,
            rotation_failures: 0,
            retry_after: None,
        }
    }

    pub fn from_config(path: impl Into<PathBuf>, config: &RotationConfig) -> Self {
        let path = path.into();
        let policy = policy_from_config(config, &path);
        Self::new(path, policy, config.backup_count, config.compress)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    pub fn rotation_failures(&self) -> u64 {
        self.rotation_failures
    }

    /// Append one record (a trailing newline is added), rotating first if
    /// the policy asks for it.
    pub fn emit(&mut self, record: &str) -> io::Result<()> {
        let incoming = record.len() + 1;
        let now = Local::now();
        if self.rotation_due(incoming, now) {
            self.try_rotate(now);
        }

        let file = self.handle()?;
        file.write_all(record.as_bytes())?;
        file.write_all(b"\n")?;
        self.state.size += incoming as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }

    fn rotation_due(&self, incoming: usize, now: DateTime<Local>) -> bool {
        if let Some(retry_after) = self.retry_after {
            if Instant::now() < retry_after {
                return false;
            }
        }
        self.policy.should_rotate(&self.state, incoming, now)
    }

    fn try_rotate(&mut self, now: DateTime<Local>) {
        match self.rotate() {
            Ok(()) => {
                self.rotations += 1;
                self.retry_after = None;
                self.policy.rotated(now);
            }
            Err(e) => {
                self.rotation_failures += 1;
                self.retry_after = Some(Instant::now() + RETRY_BACKOFF);
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "log rotation failed, continuing to append"
                );
            }
        }
    }

    /// Retire the active file into slot 1 and start a fresh one.
    pub fn rotate(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }

        if self.backup_count == 0 {
            // Nothing to keep; start over in place.
            File::create(&self.path)?;
        } else {
            backups::shift(&self.path, self.backup_count)?;
            let retired = backups::backup_path(&self.path, 1);
            if self.path.exists() {
                fs::rename(&self.path, &retired)?;
            }
            if self.compress && retired.exists() {
                if let Err(e) = backups::compress(&retired) {
                    tracing::warn!(
                        path = %retired.display(),
                        error = %e,
                        "failed to compress retired log, keeping it uncompressed"
                    );
                }
            }
        }

        self.state = RotationState {
            size: 0,
            opened_at: Local::now(),
        };
        Ok(())
    }

    fn handle(&mut self) -> io::Result<&mut File> {
        let file = match self.file.take() {
            Some(file) => file,
            None => self.open()?,
        };
        Ok(self.file.insert(file))
    }

    fn open(&mut self) -> io::Result<File> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.state.size = file.metadata()?.len();
        Ok(file)
    }
}

impl Drop for RotatingFile {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
