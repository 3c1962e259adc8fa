//! Disk I/O helpers: snapshot loading and the durable temp-file-then-move write.
//!
//! Neither helper returns an error. Loading degrades to an empty snapshot and
//! writing reports a plain `bool`; both log what went wrong.
//!
//! The write stages a temp file beside the destination so a rename stays on
//! one filesystem. If the move strategy can't (or won't) rename, we retry once
//! with a non-atomic copy-over. That leaves a short window where a crash can
//! tear the backing file; we log it rather than hide it.

use crate::error::{Error, Result};
use crate::mover::MoveStrategy;
use crate::serializer::Serializer;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::TempPath;
use tracing::{debug, error, info, warn};

/// What [`load`] found on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    /// Records read from the backing file (empty on any failure).
    pub records: Vec<T>,
    /// `false` when the file on disk doesn't match `records`: it was
    /// unreadable, corrupted, or could not be created.
    pub in_sync: bool,
}

impl<T> Loaded<T> {
    fn empty(in_sync: bool) -> Self {
        Self {
            records: Vec::new(),
            in_sync,
        }
    }
}

/// Reads the snapshot at `path`.
///
/// A missing file is created (with its parent directories) holding an empty
/// array. An empty file counts as an empty array. Anything unreadable or
/// malformed yields an empty snapshot and an error event.
pub fn load<T, S>(path: &Path, serializer: &S) -> Loaded<T>
where
    T: Serialize + DeserializeOwned,
    S: Serializer,
{
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound || !path.exists() => {
            return init::<T, S>(path, serializer)
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to read backing file; starting empty");
            return Loaded::empty(false);
        }
    };
    if bytes.is_empty() {
        info!(path = %path.display(), "backing file is empty");
        return Loaded::empty(true);
    }
    match serializer.deserialize(&bytes) {
        Ok(records) => {
            info!(path = %path.display(), count = records.len(), "loaded snapshot");
            Loaded {
                records,
                in_sync: true,
            }
        }
        Err(err) => {
            error!(path = %path.display(), error = %err, "backing file is corrupted; starting empty");
            Loaded::empty(false)
        }
    }
}

fn init<T, S>(path: &Path, serializer: &S) -> Loaded<T>
where
    T: Serialize,
    S: Serializer,
{
    match create_empty::<T, S>(path, serializer) {
        Ok(()) => {
            info!(path = %path.display(), "created empty backing file");
            Loaded::empty(true)
        }
        Err(err) => {
            error!(path = %path.display(), error = %err, "could not create backing file; running in memory only");
            Loaded::empty(false)
        }
    }
}

fn create_empty<T: Serialize, S: Serializer>(path: &Path, serializer: &S) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = serializer.serialize::<T>(&[])?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Writes `records` to `path` without ever exposing a half-written file.
///
/// Serializes into a temp file in the same directory, then asks `mover` to
/// move it into place atomically, falling back to a non-atomic move once.
/// The temp file is removed afterwards whatever happened. Returns whether
/// `path` now holds `records`; on `false` the old contents are untouched.
pub fn write_durable<T, S>(path: &Path, records: &[T], serializer: &S, mover: &dyn MoveStrategy) -> bool
where
    T: Serialize,
    S: Serializer,
{
    let staged = match stage(path, records, serializer) {
        Ok(tmp) => tmp,
        Err(err) => {
            error!(path = %path.display(), error = %err, "could not stage snapshot; backing file unchanged");
            return false;
        }
    };

    let outcome = match mover.move_file(&staged, path, true) {
        Ok(()) => Ok(()),
        Err(Error::AtomicMoveUnsupported) => {
            warn!(path = %path.display(), "atomic move not supported; falling back to non-atomic move");
            mover.move_file(&staged, path, false)
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "atomic move failed; retrying non-atomically");
            mover.move_file(&staged, path, false)
        }
    };

    discard(staged);

    match outcome {
        Ok(()) => {
            debug!(path = %path.display(), count = records.len(), "snapshot written");
            true
        }
        Err(err) => {
            error!(path = %path.display(), error = %err, "failed to persist snapshot; backing file unchanged");
            false
        }
    }
}

fn stage<T: Serialize, S: Serializer>(path: &Path, records: &[T], serializer: &S) -> Result<TempPath> {
    let bytes = serializer.serialize(records)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::Config(format!("{} has no file name", path.display())))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    Ok(tmp.into_temp_path())
}

// A successful rename already consumed the temp file; NotFound is expected.
fn discard(staged: TempPath) {
    let leftover = staged.to_path_buf();
    match staged.close() {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %leftover.display(), error = %e, "could not remove temp file"),
    }
}
