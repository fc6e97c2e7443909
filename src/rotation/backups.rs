//! Backup slot naming, shifting and compression.
//!
//! Retired files live next to the active file as `base.1 .. base.N`, with a
//! `.gz` suffix when compressed. Slot 1 is always the most recently retired.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

/// Path of backup slot `index` (uncompressed form).
pub fn backup_path(base: &Path, index: usize) -> PathBuf {
    let mut backup = base.as_os_str().to_owned();
    backup.push(format!(".{}", index));
    PathBuf::from(backup)
}

/// Compressed form of any path.
pub fn gz_path(path: &Path) -> PathBuf {
    let mut gz = path.as_os_str().to_owned();
    gz.push(".gz");
    PathBuf::from(gz)
}

fn slot(base: &Path, index: usize, compressed: bool) -> PathBuf {
    let path = backup_path(base, index);
    if compressed {
        gz_path(&path)
    } else {
        path
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Move every backup up one slot, discarding whatever sits in slot `count`.
///
/// Each slot may exist compressed, uncompressed, or both; both forms are
/// shifted so a policy change between runs does not leave gaps.
pub fn shift(base: &Path, count: usize) -> io::Result<()> {
    if count == 0 {
        return Ok(());
    }
    remove_if_exists(&slot(base, count, false))?;
    remove_if_exists(&slot(base, count, true))?;

    for index in (1..count).rev() {
        for compressed in [false, true] {
            let src = slot(base, index, compressed);
            if src.exists() {
                let dst = slot(base, index + 1, compressed);
                remove_if_exists(&dst)?;
                fs::rename(&src, &dst)?;
            }
        }
    }
    Ok(())
}

/// Gzip `path` into `path.gz` and remove the original.
///
/// On failure the partial archive is removed and the original is kept.
pub fn compress(path: &Path) -> io::Result<PathBuf> {
    let target = gz_path(path);

    let result: io::Result<()> = (|| {
        let mut input = BufReader::new(File::open(path)?);
        let output = BufWriter::new(File::create(&target)?);
        let mut encoder = GzEncoder::new(output, Compression::default());
        io::copy(&mut input, &mut encoder)?;
        let mut output = encoder.finish()?;
        io::Write::flush(&mut output)?;
        Ok(())
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&target);
        return Err(e);
    }

    fs::remove_file(path)?;
    Ok(target)
}

/// Existing backups for `base`, in slot order.
pub fn list(base: &Path, count: usize) -> Vec<PathBuf> {
    (1..=count)
        .flat_map(|index| [slot(base, index, false), slot(base, index, true)])
        .filter(|path| path.exists())
        .collect()
}
