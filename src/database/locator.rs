// Locates the active and pending compatibility databases for this platform

use crate::{PatchError, PatchResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Hardware model and OS major version of the running NAS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformInfo {
    /// Lower-cased model with any `-j` suffix removed, e.g. "ds1821+"
    pub model: String,
    pub major_version: u32,
}

impl PlatformInfo {
    pub fn new(model: &str, major_version: u32) -> Self {
        Self {
            model: normalize_model(model),
            major_version,
        }
    }

    /// Read model and version from the platform's descriptor files
    pub fn detect(hw_model_path: &Path, version_path: &Path) -> PatchResult<Self> {
        let model = fs::read_to_string(hw_model_path).map_err(|e| {
            PatchError::PlatformUnknown(format!("{}: {}", hw_model_path.display(), e))
        })?;
        if model.trim().is_empty() {
            return Err(PatchError::PlatformUnknown(format!(
                "{} is empty",
                hw_model_path.display()
            )));
        }

        let version = fs::read_to_string(version_path).map_err(|e| {
            PatchError::PlatformUnknown(format!("{}: {}", version_path.display(), e))
        })?;
        let major_version = parse_major_version(&version).ok_or_else(|| {
            PatchError::PlatformUnknown(format!(
                "no majorversion in {}",
                version_path.display()
            ))
        })?;

        Ok(Self::new(&model, major_version))
    }
}

impl fmt::Display for PlatformInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (OS {})", self.model, self.major_version)
    }
}

/// Which of the two databases a document is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentRole {
    Active,
    Pending,
}

/// Resolved database paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbPaths {
    pub active: PathBuf,
    pub pending: PathBuf,
}

impl DbPaths {
    /// `<db_dir>/<model>_host[_v<major>].db` and the same with `.new`.
    ///
    /// Releases up to 6 carry no version suffix.
    pub fn resolve(db_dir: &Path, platform: &PlatformInfo) -> Self {
        let suffix = if platform.major_version > 6 {
            format!("_v{}", platform.major_version)
        } else {
            String::new()
        };
        let name = format!("{}_host{}.db", platform.model, suffix);

        Self {
            active: db_dir.join(&name),
            pending: db_dir.join(format!("{}.new", name)),
        }
    }

    pub fn get(&self, role: DocumentRole) -> &Path {
        match role {
            DocumentRole::Active => &self.active,
            DocumentRole::Pending => &self.pending,
        }
    }

    /// Both files must exist, otherwise the platform is not supported.
    pub fn verify(&self) -> PatchResult<()> {
        if !self.active.is_file() {
            return Err(PatchError::ActiveDbMissing(self.active.clone()));
        }
        if !self.pending.is_file() {
            return Err(PatchError::PendingDbMissing(self.pending.clone()));
        }
        Ok(())
    }
}

pub(crate) fn normalize_model(model: &str) -> String {
    let model = model.trim().to_lowercase();
    match model.strip_suffix("-j") {
        Some(stripped) => stripped.to_string(),
        None => model,
    }
}

/// Find `majorversion="7"` (quotes optional) in a version descriptor
pub(crate) fn parse_major_version(contents: &str) -> Option<u32> {
    contents.lines().find_map(|line| {
        let (key, value) = line.split_once('=')?;
        if key.trim() != "majorversion" {
            return None;
        }
        value.trim().trim_matches('"').parse().ok()
    })
}
