/// Runtime settings: where the NAS keeps its files and which programs to run.
///
/// Defaults match a stock NAS install. Any field can be overridden from a
/// TOML file or from `DRIVEDB_*` environment variables, e.g.
/// `DRIVEDB_DB_DIR=/tmp/db drivedb-patch`.
use crate::PatchResult;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read when `--config` is not given. Absence is not an error.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/drivedb-patch.toml";

/// Environment prefix for overrides
const ENV_PREFIX: &str = "DRIVEDB";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the compatibility databases
    pub db_dir: PathBuf,

    /// Flat key="value" system configuration file
    pub synoinfo_path: PathBuf,

    /// Hardware model identifier (e.g. "DS1821+")
    pub hw_model_path: PathBuf,

    /// OS version descriptor containing `majorversion="N"`
    pub version_path: PathBuf,

    /// Where sataN / sdX device nodes live
    pub dev_dir: PathBuf,

    /// sysfs class directory of NVMe controllers
    pub nvme_class_dir: PathBuf,

    /// Program run as `<program> -i <device>` to identify ATA drives
    pub identify_program: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_dir: PathBuf::from("/var/lib/disk-compatibility"),
            synoinfo_path: PathBuf::from("/etc.defaults/synoinfo.conf"),
            hw_model_path: PathBuf::from("/proc/sys/kernel/syno_hw_version"),
            version_path: PathBuf::from("/etc.defaults/VERSION"),
            dev_dir: PathBuf::from("/dev"),
            nvme_class_dir: PathBuf::from("/sys/class/nvme"),
            identify_program: "hdparm".to_string(),
        }
    }
}

impl Settings {
    /// Load settings, layering file then environment over the defaults.
    ///
    /// An explicitly given file must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> PatchResult<Self> {
        let (file, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        let settings = Config::builder()
            .add_source(File::from(file).required(required))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize::<Settings>()?;

        tracing::debug!(?settings, "Loaded settings");
        Ok(settings)
    }
}
