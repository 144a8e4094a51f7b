// Allow uppercase acronyms for industry-standard terms like ATA, NVMe
#![allow(clippy::upper_case_acronyms)]

pub mod config;
pub mod database;
pub mod drives;
pub mod patch_orchestrator;
pub mod report;
pub mod synoinfo;

// Re-export main patch orchestrator for convenience
pub use config::Settings;
pub use patch_orchestrator::{PatchOptions, PatchOrchestrator, PatchSummary};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Every way a patch run can stop early.
///
/// Each variant maps to its own process exit status through
/// [`PatchError::exit_code`], so scripts driving the tool can tell an
/// unsupported platform from a read-only filesystem.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid settings: {0}")]
    Settings(#[from] ::config::ConfigError),

    #[error("No drives found")]
    NoDrivesFound,

    #[error("Drive database not found: {}", .0.display())]
    ActiveDbMissing(PathBuf),

    #[error("Pending drive database not found: {}", .0.display())]
    PendingDbMissing(PathBuf),

    #[error("Failed to back up {}: {source}", path.display())]
    DbBackupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    DbWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to back up {}: {source}", path.display())]
    ConfigBackupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    ConfigWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    DbReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed drive database {}: {reason}", path.display())]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("Unable to determine platform: {0}")]
    PlatformUnknown(String),

    #[error("System configuration not found: {}", .0.display())]
    ConfigMissing(PathBuf),
}

impl PatchError {
    /// Process exit status for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            PatchError::IoError(_) | PatchError::Settings(_) => 1,
            PatchError::NoDrivesFound => 2,
            PatchError::ActiveDbMissing(_) => 3,
            PatchError::PendingDbMissing(_) => 4,
            PatchError::DbBackupFailed { .. } => 5,
            PatchError::DbWriteFailed { .. } => 6,
            PatchError::ConfigBackupFailed { .. } => 7,
            PatchError::ConfigWriteFailed { .. } => 8,
            PatchError::DbReadFailed { .. } => 9,
            PatchError::MalformedDocument { .. } => 10,
            PatchError::PlatformUnknown(_) => 11,
            PatchError::ConfigMissing(_) => 12,
        }
    }
}

pub type PatchResult<T> = Result<T, PatchError>;

/// Model and firmware revision as reported by a drive.
///
/// Ordering is lexicographic on `(model, firmware)`; it only exists so an
/// inventory can be deduplicated deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DriveRecord {
    pub model: String,
    pub firmware: String,
}

impl DriveRecord {
    pub fn new(model: impl Into<String>, firmware: impl Into<String>) -> Self {
        Self {
            model: model.into().trim().to_string(),
            firmware: firmware.into().trim().to_string(),
        }
    }
}

impl fmt::Display for DriveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.model, self.firmware)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriveClass {
    Ata,  // SATA and SAS, both HDD and SSD
    Nvme,
}

impl DriveClass {
    pub fn label(&self) -> &'static str {
        match self {
            DriveClass::Ata => "HDD/SSD",
            DriveClass::Nvme => "NVMe",
        }
    }
}
