//! Atomic file output.
//!
//! Content is written to a [`tempfile::NamedTempFile`] created in the
//! destination directory and then renamed into place. The rename stays on one
//! filesystem, so readers see either the old file or the complete new one.

use crate::error::ExportError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `contents` to `path` via temp file + rename.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), ExportError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| ExportError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ExportError::io(dir, e))?;
    if let Err(e) = tmp.write_all(contents.as_bytes()) {
        return Err(ExportError::io(tmp.path(), e));
    }
    if let Err(e) = tmp.flush() {
        return Err(ExportError::io(tmp.path(), e));
    }
    tmp.persist(path)
        .map_err(|e| ExportError::io(path, e.error))?;
    Ok(())
}
