// One-time `.bak` copies taken before a file is first modified

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    Created(PathBuf),
    AlreadyExists(PathBuf),
}

impl BackupOutcome {
    pub fn path(&self) -> &Path {
        match self {
            BackupOutcome::Created(p) | BackupOutcome::AlreadyExists(p) => p,
        }
    }
}

/// `<path>.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Copy `path` to `<path>.bak` unless that backup already exists.
///
/// An existing backup is never overwritten, so it always holds the file as
/// it was before the first run touched it.
pub fn ensure_backup(path: &Path) -> io::Result<BackupOutcome> {
    let backup = backup_path(path);
    if backup.exists() {
        return Ok(BackupOutcome::AlreadyExists(backup));
    }

    fs::copy(path, &backup)?;
    tracing::info!(original = %path.display(), backup = %backup.display(), "Created backup");
    Ok(BackupOutcome::Created(backup))
}
