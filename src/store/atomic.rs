//! Crash-atomic file replacement.
//!
//! Bytes go to a temporary file in the target's directory, are synced to disk,
//! and the temporary file is renamed over the target. Readers see either the
//! old contents or the new ones, never a partial write.

use std::io::Write;
use std::path::Path;

use crate::error::StoreError;
use crate::store::StoreResult;

/// Replace `path` with `bytes` atomically.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(io_err)?;

    let prefix = format!(
        ".{}.",
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    );
    let mut temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(io_err)?;
    temp.write_all(bytes).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;

    // On failure the temp file is dropped and removed; the target is untouched.
    temp.persist(path).map_err(|e| io_err(e.error))?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "replaced file atomically");
    Ok(())
}
