//! Whole-document JSON persistence with atomic replacement.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use notesai_core::Result;

/// Read and decode a JSON document.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "file_storage: read failed");
            return Err(e.into());
        }
    };
    let value = serde_json::from_slice(&bytes)?;
    Ok(Some(value))
}

/// Write a JSON document with two-space indentation, replacing `path`
/// atomically.
///
/// The document is written to a temp file in the same directory, synced,
/// then renamed over the target.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| {
        warn!(dir = %dir.display(), error = %e, "file_storage: create_dir_all failed");
        e
    })?;

    let mut temp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut temp, value)?;
    temp.write_all(b"\n")?;
    temp.as_file().sync_all()?;

    temp.persist(path).map_err(|e| {
        warn!(path = %path.display(), error = %e.error, "file_storage: rename failed");
        e.error
    })?;

    debug!(path = %path.display(), "file_storage: document written");
    Ok(())
}
