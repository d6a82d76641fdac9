//! Advisory locks on sidecar `<path>.lock` files.
//!
//! Readers take a shared lock, writers an exclusive one. Acquisition never
//! blocks: if another process holds a conflicting lock the caller gets
//! [`StoreError::LockContention`] immediately. The lock is released when the
//! [`FileLock`] guard is dropped.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::StoreError;
use crate::store::StoreResult;

/// Kind of advisory lock to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Many readers may hold it at once; excludes writers.
    Shared,
    /// A single writer; excludes readers and other writers.
    Exclusive,
}

/// Held advisory lock. Unlocks on drop.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
    mode: LockMode,
}

impl FileLock {
    /// Try to lock the sidecar file that guards `target`.
    pub fn try_acquire(target: &Path, mode: LockMode) -> StoreResult<Self> {
        let path = lock_path(target);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;

        // Fully qualified: std's inherent `File` lock methods would shadow
        // the trait methods with a different error type.
        let attempt = match mode {
            LockMode::Shared => FileExt::try_lock_shared(&file),
            LockMode::Exclusive => FileExt::try_lock_exclusive(&file),
        };
        match attempt {
            Ok(()) => {
                tracing::debug!(path = %path.display(), ?mode, "lock acquired");
                Ok(Self { file, path, mode })
            }
            Err(err) if is_contended(&err) => Err(StoreError::LockContention {
                path: target.to_path_buf(),
            }),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Path of the sidecar lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release lock");
        } else {
            tracing::debug!(path = %self.path.display(), mode = ?self.mode, "lock released");
        }
    }
}

/// Sidecar lock path for `target`: the same path with `.lock` appended.
pub fn lock_path(target: &Path) -> PathBuf {
    let mut raw = target.as_os_str().to_owned();
    raw.push(".lock");
    PathBuf::from(raw)
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
