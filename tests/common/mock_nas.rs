/// Mock NAS filesystem layout
///
/// Builds the descriptor files, compatibility databases, device nodes,
/// NVMe sysfs tree and synoinfo.conf that a patch run reads, all rooted in
/// a TempDir, and hands back matching `Settings`.

use drivedb_patch::Settings;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const DEFAULT_SYNOINFO: &str =
    "unique=\"synology_geminilake_920+\"\nsupport_disk_compatibility=\"yes\"\nsupportraid=\"yes\"\n";

/// Builder for a mock NAS
pub struct MockNasBuilder {
    hw_model: String,
    version: String,
    active_db: Option<String>,
    pending_db: Option<String>,
    devices: Vec<String>,
    nvme: Vec<(String, String, String)>,
    synoinfo: Option<String>,
}

impl MockNasBuilder {
    pub fn new() -> Self {
        Self {
            hw_model: "DS920+".to_string(),
            version: "majorversion=\"7\"\nminorversion=\"1\"\nbuildnumber=\"42962\"\n".to_string(),
            active_db: Some("{}".to_string()),
            pending_db: Some("{}".to_string()),
            devices: Vec::new(),
            nvme: Vec::new(),
            synoinfo: Some(DEFAULT_SYNOINFO.to_string()),
        }
    }

    pub fn hw_model(mut self, model: &str) -> Self {
        self.hw_model = model.to_string();
        self
    }

    pub fn major_version(mut self, major: u32) -> Self {
        self.version = format!("majorversion=\"{}\"\nminorversion=\"2\"\n", major);
        self
    }

    /// Both databases start with the same content
    pub fn databases(mut self, content: &str) -> Self {
        self.active_db = Some(content.to_string());
        self.pending_db = Some(content.to_string());
        self
    }

    pub fn without_active_db(mut self) -> Self {
        self.active_db = None;
        self
    }

    pub fn without_pending_db(mut self) -> Self {
        self.pending_db = None;
        self
    }

    /// Device node under dev/, e.g. "sata1" or "sda"
    pub fn device(mut self, name: &str) -> Self {
        self.devices.push(name.to_string());
        self
    }

    pub fn nvme(mut self, controller: &str, model: &str, firmware: &str) -> Self {
        self.nvme
            .push((controller.to_string(), model.to_string(), firmware.to_string()));
        self
    }

    pub fn synoinfo(mut self, content: &str) -> Self {
        self.synoinfo = Some(content.to_string());
        self
    }

    pub fn without_synoinfo(mut self) -> Self {
        self.synoinfo = None;
        self
    }

    pub fn build(self) -> io::Result<MockNas> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        let settings = Settings {
            db_dir: root.join("var/lib/disk-compatibility"),
            synoinfo_path: root.join("etc.defaults/synoinfo.conf"),
            hw_model_path: root.join("proc/syno_hw_version"),
            version_path: root.join("etc.defaults/VERSION"),
            dev_dir: root.join("dev"),
            nvme_class_dir: root.join("sys/class/nvme"),
            identify_program: "hdparm".to_string(),
        };

        for dir in [
            &settings.db_dir,
            &settings.dev_dir,
            &root.join("etc.defaults"),
            &root.join("proc"),
        ] {
            fs::create_dir_all(dir)?;
        }

        fs::write(&settings.hw_model_path, format!("{}\n", self.hw_model))?;
        fs::write(&settings.version_path, &self.version)?;

        for device in &self.devices {
            fs::write(settings.dev_dir.join(device), b"")?;
        }

        for (controller, model, firmware) in &self.nvme {
            let dir = settings.nvme_class_dir.join(controller);
            fs::create_dir_all(&dir)?;
            // sysfs pads attributes with spaces
            fs::write(dir.join("model"), format!("{:<40}\n", model))?;
            fs::write(dir.join("firmware_rev"), format!("{:<8}\n", firmware))?;
        }

        if let Some(content) = &self.synoinfo {
            fs::write(&settings.synoinfo_path, content)?;
        }

        let nas = MockNas {
            temp_dir,
            settings,
            db_name: db_file_name(&self.hw_model, &self.version),
        };

        if let Some(content) = &self.active_db {
            fs::write(nas.active_db(), content)?;
        }
        if let Some(content) = &self.pending_db {
            fs::write(nas.pending_db(), content)?;
        }

        Ok(nas)
    }
}

impl Default for MockNasBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A built mock NAS; files live until this is dropped
pub struct MockNas {
    #[allow(dead_code)]
    temp_dir: TempDir,
    pub settings: Settings,
    db_name: String,
}

impl MockNas {
    pub fn active_db(&self) -> PathBuf {
        self.settings.db_dir.join(&self.db_name)
    }

    pub fn pending_db(&self) -> PathBuf {
        self.settings.db_dir.join(format!("{}.new", self.db_name))
    }

    pub fn synoinfo(&self) -> &Path {
        &self.settings.synoinfo_path
    }

    pub fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

fn db_file_name(hw_model: &str, version: &str) -> String {
    let lower = hw_model.trim().to_lowercase();
    let model = lower.strip_suffix("-j").unwrap_or(&lower);
    let major: u32 = version
        .lines()
        .find_map(|line| line.strip_prefix("majorversion="))
        .and_then(|v| v.trim_matches('"').parse().ok())
        .unwrap_or(0);

    if major > 6 {
        format!("{}_host_v{}.db", model, major)
    } else {
        format!("{}_host.db", model)
    }
}
