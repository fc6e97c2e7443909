//! Batch output to disk, with or without rotation.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::RotationConfig;
use crate::rotation::RotatingFile;

/// Where a batch of records ends up.
#[derive(Debug)]
pub(crate) enum Emitter {
    /// Open, append and close per batch.
    Direct(PathBuf),
    /// Through a rotating handle that stays open between batches.
    Rotating(RotatingFile),
}

impl Emitter {
    pub(crate) fn new(path: &Path, rotation: &RotationConfig) -> Self {
        if rotation.enabled {
            Emitter::Rotating(RotatingFile::from_config(path, rotation))
        } else {
            Emitter::Direct(path.to_path_buf())
        }
    }

    /// Write `batch` in order, one record per line.
    pub(crate) fn write_batch(&mut self, batch: &[String]) -> io::Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        match self {
            Emitter::Direct(path) => {
                let mut text = batch.join("\n");
                text.push('\n');
                let mut file = open_append(path)?;
                file.write_all(text.as_bytes())?;
                file.flush()
            }
            Emitter::Rotating(file) => {
                for record in batch {
                    file.emit(record)?;
                }
                file.flush()
            }
        }
    }

    pub(crate) fn rotations(&self) -> (u64, u64) {
        match self {
            Emitter::Direct(_) => (0, 0),
            Emitter::Rotating(file) => (file.rotations(), file.rotation_failures()),
        }
    }
}

fn open_append(path: &Path) -> io::Result<fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}
