// Compatibility database module
//
// - locator.rs: platform detection and database path resolution
// - backup.rs: one-time .bak copies
// - document.rs: structural JSON document edits
// - reconcile.rs: insert-if-absent per drive, edit counting

pub mod backup;
pub mod document;
pub mod locator;
pub mod reconcile;


pub use backup::{backup_path, ensure_backup, BackupOutcome};
pub use document::{default_compatibility, CompatDocument, MODEL_MAP_KEY};
pub use locator::{DbPaths, DocumentRole, PlatformInfo};
pub use reconcile::{reconcile, EditCounter, ReconcileOutcome};
