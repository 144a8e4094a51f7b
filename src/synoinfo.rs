/// Flat `key="value"` system configuration file editor
///
/// Used for two settings:
/// - `support_disk_compatibility`: `"no"` switches the OS's drive
///   compatibility check off entirely
/// - `drive_db_test_url`: pointing it at the loopback address stops the OS
///   from downloading a fresh database over the patched one
///
/// Edits are line-based so comments, ordering and unrelated keys survive.
use crate::database::backup::ensure_backup;
use crate::{PatchError, PatchResult};
use std::fs;
use std::path::{Path, PathBuf};

pub const SUPPORT_DISK_COMPATIBILITY: &str = "support_disk_compatibility";
pub const DRIVE_DB_TEST_URL: &str = "drive_db_test_url";
pub const BLACKHOLE_URL: &str = "127.0.0.1";

#[derive(Debug, Clone)]
pub struct SynoInfo {
    path: PathBuf,
    lines: Vec<String>,
    trailing_newline: bool,
    backed_up: bool,
}

impl SynoInfo {
    /// Load the file. It ships with the OS, so a missing file is fatal.
    pub fn load(path: &Path) -> PatchResult<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PatchError::ConfigMissing(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self::parse(path, &text))
    }

    pub fn parse(path: &Path, text: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            lines: text.lines().map(str::to_string).collect(),
            trailing_newline: text.is_empty() || text.ends_with('\n'),
            backed_up: false,
        }
    }

    /// Current value of `key`, without surrounding quotes
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| {
            let (k, v) = split_entry(line)?;
            (k == key).then(|| unquote(v))
        })
    }

    /// Set `key` in memory. Returns true if anything changed.
    ///
    /// The first existing line for the key keeps its quoting style. A new key
    /// is appended bare, as `key=value`.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        if self.get(key) == Some(value) {
            return false;
        }

        let position = self
            .lines
            .iter()
            .position(|line| split_entry(line).is_some_and(|(k, _)| k == key));

        match position {
            Some(index) => {
                let quoted = split_entry(&self.lines[index]).is_some_and(|(_, v)| is_quoted(v));
                self.lines[index] = format_entry(key, value, quoted);
            }
            None => self.lines.push(format_entry(key, value, false)),
        }
        true
    }

    /// Set `key` and persist, taking the one-time `.bak` first.
    pub fn update(&mut self, key: &str, value: &str) -> PatchResult<bool> {
        if !self.set(key, value) {
            tracing::debug!(key, value, "Setting already in place");
            return Ok(false);
        }

        self.backup()?;
        self.save()?;
        tracing::info!(key, value, file = %self.path.display(), "Updated setting");
        Ok(true)
    }

    pub fn render(&self) -> String {
        let mut text = self.lines.join("\n");
        if self.trailing_newline && !self.lines.is_empty() {
            text.push('\n');
        }
        text
    }

    fn save(&self) -> PatchResult<()> {
        fs::write(&self.path, self.render()).map_err(|source| PatchError::ConfigWriteFailed {
            path: self.path.clone(),
            source,
        })
    }

    fn backup(&mut self) -> PatchResult<()> {
        if self.backed_up || !self.path.exists() {
            return Ok(());
        }
        ensure_backup(&self.path).map_err(|source| PatchError::ConfigBackupFailed {
            path: self.path.clone(),
            source,
        })?;
        self.backed_up = true;
        Ok(())
    }
}

/// `support_disk_compatibility` off with force, back on otherwise.
///
/// Returns the new enabled state when the file changed.
pub fn toggle_disk_compatibility(info: &mut SynoInfo, force: bool) -> PatchResult<Option<bool>> {
    let value = if force { "no" } else { "yes" };
    let changed = info.update(SUPPORT_DISK_COMPATIBILITY, value)?;
    Ok(changed.then_some(!force))
}

/// Point the database update URL at loopback. Returns true when changed.
pub fn block_db_updates(info: &mut SynoInfo) -> PatchResult<bool> {
    info.update(DRIVE_DB_TEST_URL, BLACKHOLE_URL)
}

fn split_entry(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return None;
    }
    let (key, value) = trimmed.split_once('=')?;
    Some((key.trim(), value.trim()))
}

fn is_quoted(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('"') && value.ends_with('"')
}

fn unquote(value: &str) -> &str {
    if is_quoted(value) {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn format_entry(key: &str, value: &str, quoted: bool) -> String {
    if quoted {
        format!("{}=\"{}\"", key, value)
    } else {
        format!("{}={}", key, value)
    }
}
