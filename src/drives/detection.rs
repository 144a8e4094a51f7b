use super::identify::{parse_identify_output, DeviceIdentifier};
use super::inventory::DriveInventory;
use crate::{DriveClass, DriveRecord, PatchError, PatchResult};
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

lazy_static! {
    // Whole-disk names only; partitions (sata1p1, sda1) are skipped
    static ref SATA_DISK: Regex = Regex::new(r"^sata\d+$").unwrap();
    static ref SCSI_DISK: Regex = Regex::new(r"^sd[a-z]+$").unwrap();
    static ref NVME_CTRL: Regex = Regex::new(r"^nvme\d+$").unwrap();
}

/// Collects drive inventories from device nodes and NVMe sysfs attributes.
pub struct DriveDetector<'a> {
    dev_dir: PathBuf,
    nvme_class_dir: PathBuf,
    identifier: &'a dyn DeviceIdentifier,
}

impl<'a> DriveDetector<'a> {
    pub fn new(
        dev_dir: impl Into<PathBuf>,
        nvme_class_dir: impl Into<PathBuf>,
        identifier: &'a dyn DeviceIdentifier,
    ) -> Self {
        Self {
            dev_dir: dev_dir.into(),
            nvme_class_dir: nvme_class_dir.into(),
            identifier,
        }
    }

    /// Scan SATA-named then SCSI-named disks.
    ///
    /// Fails with [`PatchError::NoDrivesFound`] when nothing identifies,
    /// which means the environment was not detected correctly.
    pub fn detect_ata(&self) -> PatchResult<DriveInventory> {
        let mut records = Vec::new();

        for device in self.ata_devices()? {
            match self.identify_device(&device) {
                Some(record) => {
                    tracing::debug!(device = %device.display(), %record, "Identified drive");
                    records.push(record);
                }
                None => continue,
            }
        }

        let inventory = DriveInventory::from_records(DriveClass::Ata, records);
        if inventory.is_empty() {
            return Err(PatchError::NoDrivesFound);
        }
        Ok(inventory)
    }

    /// Scan NVMe controllers. An empty result is normal.
    pub fn detect_nvme(&self) -> PatchResult<DriveInventory> {
        if !self.nvme_class_dir.is_dir() {
            tracing::debug!(dir = %self.nvme_class_dir.display(), "No NVMe class directory");
            return Ok(DriveInventory::empty(DriveClass::Nvme));
        }

        let mut records = Vec::new();
        for controller in self.nvme_controllers()? {
            if let Some(record) = Self::read_nvme_record(&controller) {
                tracing::debug!(controller = %controller.display(), %record, "Identified NVMe drive");
                records.push(record);
            }
        }

        Ok(DriveInventory::from_records(DriveClass::Nvme, records))
    }

    /// Check if a device name is a whole SATA or SCSI disk
    pub(crate) fn is_ata_disk(device_name: &str) -> bool {
        SATA_DISK.is_match(device_name) || SCSI_DISK.is_match(device_name)
    }

    pub(crate) fn is_nvme_controller(name: &str) -> bool {
        NVME_CTRL.is_match(name)
    }

    fn ata_devices(&self) -> PatchResult<Vec<PathBuf>> {
        let mut sata = Self::glob_names(&self.dev_dir, "sata*", |name| SATA_DISK.is_match(name))?;
        let scsi = Self::glob_names(&self.dev_dir, "sd*", |name| SCSI_DISK.is_match(name))?;
        sata.extend(scsi);
        Ok(sata)
    }

    fn nvme_controllers(&self) -> PatchResult<Vec<PathBuf>> {
        Self::glob_names(&self.nvme_class_dir, "nvme*", Self::is_nvme_controller)
    }

    fn glob_names(dir: &Path, pattern: &str, keep: impl Fn(&str) -> bool) -> PatchResult<Vec<PathBuf>> {
        let pattern = dir.join(pattern);
        let paths = glob::glob(&pattern.to_string_lossy())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        // glob yields paths in alphabetical order
        Ok(paths
            .filter_map(|entry| entry.ok())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(&keep)
                    .unwrap_or(false)
            })
            .collect())
    }

    fn identify_device(&self, device: &Path) -> Option<DriveRecord> {
        let output = match self.identifier.identify(device) {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(device = %device.display(), error = %e, "Identify failed, skipping");
                return None;
            }
        };

        match parse_identify_output(&output) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(device = %device.display(), error = %e, "Incomplete identity, skipping");
                None
            }
        }
    }

    fn read_nvme_record(controller: &Path) -> Option<DriveRecord> {
        let model = read_attribute(&controller.join("model")).ok()?;
        let firmware = read_attribute(&controller.join("firmware_rev")).ok()?;

        if model.is_empty() || firmware.is_empty() {
            tracing::debug!(controller = %controller.display(), "Empty NVMe model or firmware, skipping");
            return None;
        }
        Some(DriveRecord::new(model, firmware))
    }
}

/// Read a sysfs attribute, trimmed
fn read_attribute(path: &Path) -> Result<String> {
    let value = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(value.trim().to_string())
}
