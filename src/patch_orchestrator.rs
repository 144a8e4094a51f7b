// Patch Orchestrator - runs one patch pass end to end
//
// Order is fixed: backups, drive inventory (HDD/SSD then NVMe), database
// and system configuration existence checks, reconciliation (HDD/SSD then
// NVMe, active then pending), settings toggles, and finally the optional
// edit report. The first fatal error ends the run.

use crate::database::{
    ensure_backup, reconcile, CompatDocument, DbPaths, DocumentRole, EditCounter, PlatformInfo,
    ReconcileOutcome,
};
use crate::drives::{DeviceIdentifier, DriveDetector, DriveInventory, HdparmIdentifier};
use crate::synoinfo::{block_db_updates, toggle_disk_compatibility, SynoInfo};
use crate::{report, PatchError, PatchResult, Settings};
use serde::{Deserialize, Serialize};

/// Command-line switches that change what a run does
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchOptions {
    /// Print the tail of each database that was changed
    pub show_edits: bool,
    /// Turn the OS's drive compatibility check off as well
    pub force: bool,
    /// Reserved; database updates are blocked on every run
    pub no_db_update: bool,
}

/// What a successful run found and changed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchSummary {
    pub platform: PlatformInfo,
    pub ata: DriveInventory,
    pub nvme: DriveInventory,
    pub edits: EditCounter,
    /// New compatibility-check state, if this run changed it
    pub compatibility_toggled: Option<bool>,
    /// True if this run pointed the update URL at loopback
    pub db_update_blocked: bool,
}

/// Main patch orchestrator
pub struct PatchOrchestrator {
    settings: Settings,
    options: PatchOptions,
    identifier: Box<dyn DeviceIdentifier>,
}

impl PatchOrchestrator {
    /// Orchestrator that identifies drives with the configured program
    pub fn new(settings: Settings, options: PatchOptions) -> Self {
        let identifier = Box::new(HdparmIdentifier::new(settings.identify_program.clone()));
        Self::with_identifier(settings, options, identifier)
    }

    pub fn with_identifier(
        settings: Settings,
        options: PatchOptions,
        identifier: Box<dyn DeviceIdentifier>,
    ) -> Self {
        Self {
            settings,
            options,
            identifier,
        }
    }

    /// Execute the patch pass
    pub fn execute(&self) -> PatchResult<PatchSummary> {
        let platform = PlatformInfo::detect(&self.settings.hw_model_path, &self.settings.version_path)?;
        let paths = DbPaths::resolve(&self.settings.db_dir, &platform);

        println!("\n=== Drive Database Patch ===");
        println!("Platform: {}", platform);
        println!("Database: {}", paths.active.display());
        println!();

        self.backup_documents(&paths)?;

        let detector = DriveDetector::new(
            &self.settings.dev_dir,
            &self.settings.nvme_class_dir,
            &*self.identifier,
        );
        let ata = detector.detect_ata()?;
        print_inventory(&ata);
        let nvme = detector.detect_nvme()?;
        print_inventory(&nvme);

        paths.verify()?;
        let mut synoinfo = SynoInfo::load(&self.settings.synoinfo_path)?;

        let mut documents = [
            CompatDocument::load(&paths.active, DocumentRole::Active)?,
            CompatDocument::load(&paths.pending, DocumentRole::Pending)?,
        ];
        let mut edits = EditCounter::new();

        println!();
        for inventory in [&ata, &nvme] {
            Self::reconcile_inventory(inventory, &mut documents, &mut edits)?;
        }

        let (compatibility_toggled, db_update_blocked) = self.apply_settings(&mut synoinfo)?;

        if self.options.show_edits {
            Self::show_edits(&documents, &edits);
        }

        Ok(PatchSummary {
            platform,
            ata,
            nvme,
            edits,
            compatibility_toggled,
            db_update_blocked,
        })
    }

    /// Back up each existing database once. Missing ones are left for verify().
    fn backup_documents(&self, paths: &DbPaths) -> PatchResult<()> {
        for path in [&paths.active, &paths.pending] {
            if !path.is_file() {
                continue;
            }
            ensure_backup(path).map_err(|source| PatchError::DbBackupFailed {
                path: path.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn reconcile_inventory(
        inventory: &DriveInventory,
        documents: &mut [CompatDocument],
        edits: &mut EditCounter,
    ) -> PatchResult<()> {
        for record in inventory {
            for document in documents.iter_mut() {
                let outcome = reconcile(record, document)?;
                edits.record(document.role(), outcome);

                match outcome {
                    ReconcileOutcome::Inserted => {
                        println!("Added {} to {}", record.model, document.file_name());
                    }
                    ReconcileOutcome::AlreadyPresent => {
                        println!("{} already exists in {}", record.model, document.file_name());
                    }
                }
            }
        }
        Ok(())
    }

    fn apply_settings(&self, synoinfo: &mut SynoInfo) -> PatchResult<(Option<bool>, bool)> {
        let compatibility = toggle_disk_compatibility(synoinfo, self.options.force)?;
        match compatibility {
            Some(false) => println!("\nDisabled support disk compatibility."),
            Some(true) => println!("\nRe-enabled support disk compatibility."),
            None => {}
        }

        if self.options.no_db_update {
            tracing::debug!("no-db-update given; updates are blocked on every run");
        }
        let blocked = block_db_updates(synoinfo)?;
        if blocked {
            println!("\nDisabled drive db auto updates.");
        }

        Ok((compatibility, blocked))
    }

    /// Print the tail of each changed database. Failures are warnings only.
    fn show_edits(documents: &[CompatDocument], edits: &EditCounter) {
        for document in documents {
            let count = edits.get(document.role());
            if count == 0 {
                continue;
            }

            println!("\n{}:", document.file_name());
            match report::render_tail(document.path(), count) {
                Ok(tail) => println!("{}", tail),
                Err(e) => {
                    tracing::warn!(db = %document.path().display(), error = %e, "Could not show edits");
                    eprintln!("Warning: could not show edits for {}: {}", document.file_name(), e);
                }
            }
        }
    }
}

fn print_inventory(inventory: &DriveInventory) {
    println!(
        "{} drive models found: {}",
        inventory.class().label(),
        inventory.len()
    );
    for record in inventory {
        println!("  {}", record);
    }
}
