/// Tests for drive detection
/// Tests cover whole-disk name filtering, identify skipping, NVMe sysfs reads, dedup

#[cfg(test)]
mod drive_detection_tests {
    use super::super::detection::DriveDetector;
    use super::super::identify::DeviceIdentifier;
    use crate::{DriveClass, DriveRecord, PatchError};
    use anyhow::{anyhow, Result};
    use std::collections::HashMap;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Identifier returning canned reports keyed by device file name
    struct CannedIdentifier {
        reports: HashMap<String, String>,
    }

    impl CannedIdentifier {
        fn new(reports: Vec<(&str, String)>) -> Self {
            Self {
                reports: reports
                    .into_iter()
                    .map(|(dev, out)| (dev.to_string(), out))
                    .collect(),
            }
        }
    }

    impl DeviceIdentifier for CannedIdentifier {
        fn identify(&self, device: &Path) -> Result<String> {
            let name = device.file_name().unwrap().to_string_lossy().to_string();
            self.reports
                .get(&name)
                .cloned()
                .ok_or_else(|| anyhow!("HDIO_GET_IDENTITY failed: Inappropriate ioctl for device"))
        }
    }

    fn hdparm_line(model: &str, fw: &str) -> String {
        format!("\n/dev/x:\n\n Model={}, FwRev={}, SerialNo=SN123\n", model, fw)
    }

    fn mock_dev(root: &Path, names: &[&str]) -> PathBuf {
        let dev = root.join("dev");
        fs::create_dir_all(&dev).unwrap();
        for name in names {
            fs::write(dev.join(name), b"").unwrap();
        }
        dev
    }

    fn mock_nvme(root: &Path, controllers: &[(&str, &str, &str)]) -> PathBuf {
        let class = root.join("sys/class/nvme");
        fs::create_dir_all(&class).unwrap();
        for (name, model, fw) in controllers {
            let dir = class.join(name);
            fs::create_dir_all(&dir).unwrap();
            // sysfs pads these attributes with spaces and a newline
            fs::write(dir.join("model"), format!("{}    \n", model)).unwrap();
            fs::write(dir.join("firmware_rev"), format!("{}  \n", fw)).unwrap();
        }
        class
    }

    #[test]
    fn test_is_ata_disk_whole_disks() {
        for name in ["sata1", "sata12", "sda", "sdb", "sdaa"] {
            assert!(DriveDetector::is_ata_disk(name), "Failed for: {}", name);
        }
    }

    #[test]
    fn test_is_ata_disk_rejects_partitions_and_others() {
        for name in ["sata1p1", "sata", "sda1", "sdb5", "nvme0n1", "md0", "synoboot", "sd"] {
            assert!(!DriveDetector::is_ata_disk(name), "Failed for: {}", name);
        }
    }

    #[test]
    fn test_is_nvme_controller() {
        assert!(DriveDetector::is_nvme_controller("nvme0"));
        assert!(DriveDetector::is_nvme_controller("nvme10"));
        assert!(!DriveDetector::is_nvme_controller("nvme0n1"));
        assert!(!DriveDetector::is_nvme_controller("nvme-subsys0"));
    }

    #[test]
    fn test_detect_ata_collects_sata_and_scsi() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let dev = mock_dev(temp_dir.path(), &["sata1", "sata1p1", "sata2", "sda", "sda1"]);
        let identifier = CannedIdentifier::new(vec![
            ("sata1", hdparm_line("WD40EFRX-68N32N0", "82.00A82")),
            ("sata2", hdparm_line("ST4000VN008-2DR166", "SC60")),
            ("sda", hdparm_line("HAT5300-4T", "1.0")),
        ]);

        let detector = DriveDetector::new(&dev, temp_dir.path().join("none"), &identifier);
        let inventory = detector.detect_ata()?;

        assert_eq!(inventory.class(), DriveClass::Ata);
        assert_eq!(
            inventory.records(),
            &[
                DriveRecord::new("HAT5300-4T", "1.0"),
                DriveRecord::new("ST4000VN008-2DR166", "SC60"),
                DriveRecord::new("WD40EFRX-68N32N0", "82.00A82"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_detect_ata_dedups_identical_drives() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let dev = mock_dev(temp_dir.path(), &["sata1", "sata2"]);
        let line = hdparm_line("WD40EFRX", "83.00A83");
        let identifier = CannedIdentifier::new(vec![("sata1", line.clone()), ("sata2", line)]);

        let detector = DriveDetector::new(&dev, temp_dir.path().join("none"), &identifier);
        let inventory = detector.detect_ata()?;

        assert_eq!(inventory.len(), 1);
        Ok(())
    }

    #[test]
    fn test_detect_ata_skips_incomplete_identity() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let dev = mock_dev(temp_dir.path(), &["sata1", "sata2", "sata3"]);
        let identifier = CannedIdentifier::new(vec![
            ("sata1", " Model=WD40EFRX, FwRev=, SerialNo=X\n".to_string()),
            ("sata2", hdparm_line("ST8000VN004", "SC60")),
        ]);

        let detector = DriveDetector::new(&dev, temp_dir.path().join("none"), &identifier);
        let inventory = detector.detect_ata()?;

        assert_eq!(inventory.records(), &[DriveRecord::new("ST8000VN004", "SC60")]);
        Ok(())
    }

    #[test]
    fn test_detect_ata_nothing_found_is_fatal() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let dev = mock_dev(temp_dir.path(), &["sata1"]);
        let identifier = CannedIdentifier::new(Vec::new());

        let detector = DriveDetector::new(&dev, temp_dir.path().join("none"), &identifier);
        assert!(matches!(detector.detect_ata(), Err(PatchError::NoDrivesFound)));
        Ok(())
    }

    #[test]
    fn test_detect_nvme_reads_sysfs() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let class = mock_nvme(
            temp_dir.path(),
            &[
                ("nvme0", "Samsung SSD 970 EVO Plus 1TB", "2B2QEXM7"),
                ("nvme1", "Samsung SSD 970 EVO Plus 1TB", "2B2QEXM7"),
            ],
        );
        let identifier = CannedIdentifier::new(Vec::new());

        let detector = DriveDetector::new(temp_dir.path().join("dev"), &class, &identifier);
        let inventory = detector.detect_nvme()?;

        assert_eq!(inventory.class(), DriveClass::Nvme);
        assert_eq!(
            inventory.records(),
            &[DriveRecord::new("Samsung SSD 970 EVO Plus 1TB", "2B2QEXM7")]
        );
        Ok(())
    }

    #[test]
    fn test_detect_nvme_skips_empty_attributes() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let class = mock_nvme(temp_dir.path(), &[("nvme0", "   ", "1.0")]);
        let identifier = CannedIdentifier::new(Vec::new());

        let detector = DriveDetector::new(temp_dir.path().join("dev"), &class, &identifier);
        assert!(detector.detect_nvme()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_detect_nvme_absent_is_not_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let identifier = CannedIdentifier::new(Vec::new());

        let detector = DriveDetector::new(temp_dir.path(), temp_dir.path().join("missing"), &identifier);
        let inventory = detector.detect_nvme()?;

        assert!(inventory.is_empty());
        Ok(())
    }
}
