//! File-backed persistence for ledger documents.
//!
//! The store is the only part of the crate that touches the filesystem:
//!
//! - [`lock`]: shared/exclusive advisory locks on a sidecar `<path>.lock`
//! - [`atomic`]: temp-file-plus-rename replacement
//!
//! [`load`] and [`save`] compose the two around JSON (de)serialization of any
//! [`Document`]. Locks are non-blocking and released on every exit path.

pub mod atomic;
pub mod lock;

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::StoreError;

pub use lock::{FileLock, LockMode, lock_path};

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A typed document persisted as one JSON file.
///
/// `Default` is the empty document returned when the file does not exist yet.
pub trait Document: Serialize + DeserializeOwned + Default {
    /// Short name used in logs ("todo list", "reward system").
    const NAME: &'static str;
}

/// Load a document from `path`.
///
/// A missing or zero-byte file yields `D::default()`. Content that fails to
/// parse is [`StoreError::CorruptData`] and is never replaced silently.
pub fn load<D: Document>(path: &Path) -> StoreResult<D> {
    let _guard = FileLock::try_acquire(path, LockMode::Shared)?;

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(document = D::NAME, path = %path.display(), "no file yet, starting empty");
            return Ok(D::default());
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if bytes.is_empty() {
        tracing::debug!(document = D::NAME, path = %path.display(), "empty file, starting empty");
        return Ok(D::default());
    }

    let doc = serde_json::from_slice(&bytes).map_err(|e| StoreError::CorruptData {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    tracing::debug!(document = D::NAME, path = %path.display(), bytes = bytes.len(), "loaded");
    Ok(doc)
}

/// Persist `doc` to `path` under an exclusive lock.
///
/// Output is pretty-printed with two-space indentation and fields in
/// declaration order, so successive saves diff cleanly.
pub fn save<D: Document>(path: &Path, doc: &D) -> StoreResult<()> {
    let _guard = FileLock::try_acquire(path, LockMode::Exclusive)?;

    let mut bytes = serde_json::to_vec_pretty(doc).map_err(|e| StoreError::Serialization {
        message: format!("failed to serialize {}: {e}", D::NAME),
    })?;
    bytes.push(b'\n');

    atomic::write_atomic(path, &bytes)?;
    tracing::debug!(document = D::NAME, path = %path.display(), "saved");
    Ok(())
}

/// Deserialize a JSON `null` list as empty.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
