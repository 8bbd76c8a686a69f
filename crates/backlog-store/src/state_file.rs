//! Shared plumbing for JSON state files that several processes update.
//!
//! Writers take an exclusive advisory lock on a `<file>.lock` sidecar for the
//! whole read-modify-write cycle and replace the file through a uniquely
//! named temp file in the same directory, so readers see either the old or
//! the new document and concurrent writers never clobber each other.

use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use fd_lock::RwLock;
use tempfile::NamedTempFile;

/// Directory holding `path`, `.` for bare file names.
fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
}

/// `<path>.lock`
pub(crate) fn lock_path(path: &Path) -> PathBuf {
    let mut lock = path.as_os_str().to_owned();
    lock.push(".lock");
    PathBuf::from(lock)
}

/// Open (creating if needed) the lock sidecar for `path`.
///
/// Callers hold `lock.write()?` for as long as they read and rewrite `path`.
pub(crate) fn open_lock(path: &Path) -> io::Result<RwLock<File>> {
    std::fs::create_dir_all(parent_dir(path))?;
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(lock_path(path))?;
    Ok(RwLock::new(file))
}

/// The file's contents, or `None` if it does not exist yet.
pub(crate) fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Atomically replace `path` with `contents`.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut tmp = NamedTempFile::new_in(parent_dir(path))?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
