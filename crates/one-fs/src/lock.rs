//! Advisory cross-process locks for cache entries.
//!
//! The package cache is shared by every `one` process on the machine. A
//! [`CacheLock`] is an exclusive `fs2` lock on a sibling `.lock` file, held
//! while an entry is being written. The lock file itself is never deleted:
//! removing it while another process waits on it would let two holders
//! exist at once.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::{Error, Result};

/// An exclusive advisory lock, released on drop.
#[derive(Debug)]
pub struct CacheLock {
    file: File,
    path: PathBuf,
}

impl CacheLock {
    /// Block until the lock at `path` is held by this process.
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = open_lock_file(path)?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(e) if is_contended(&e) => {
                tracing::info!(lock = %path.display(), "waiting for another install to finish");
                file.lock_exclusive().map_err(|source| Error::LockFailed {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
            Err(source) => {
                return Err(Error::LockFailed {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }

        tracing::debug!(lock = %path.display(), "acquired cache lock");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(lock = %self.path.display(), error = %e, "failed to release cache lock");
        }
    }
}

fn open_lock_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| Error::io(path, e))
}

fn is_contended(error: &std::io::Error) -> bool {
    error.kind() == fs2::lock_contended_error().kind()
        || error.kind() == std::io::ErrorKind::WouldBlock
}
