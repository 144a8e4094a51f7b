// Reconciliation - insert-if-absent of drive models into compatibility documents

use super::document::CompatDocument;
use super::locator::DocumentRole;
use crate::{DriveRecord, PatchResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileOutcome {
    /// A new entry was written to the document
    Inserted,
    /// The model already had an entry; nothing was written
    AlreadyPresent,
}

/// Number of models inserted per document during one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditCounter {
    active: usize,
    pending: usize,
}

impl EditCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an outcome against a document
    pub fn record(&mut self, role: DocumentRole, outcome: ReconcileOutcome) {
        if outcome != ReconcileOutcome::Inserted {
            return;
        }
        match role {
            DocumentRole::Active => self.active += 1,
            DocumentRole::Pending => self.pending += 1,
        }
    }

    pub fn get(&self, role: DocumentRole) -> usize {
        match role {
            DocumentRole::Active => self.active,
            DocumentRole::Pending => self.pending,
        }
    }

    pub fn total(&self) -> usize {
        self.active + self.pending
    }
}

/// Make sure `record`'s model has an entry in `document`.
///
/// Only the model is used as the lookup key; firmware revisions of the same
/// model share the model-wide `"default"` entry. The document is written to
/// disk immediately after an insertion. A write failure leaves whatever the
/// filesystem kept; the `.bak` taken earlier is the only way back.
pub fn reconcile(record: &DriveRecord, document: &mut CompatDocument) -> PatchResult<ReconcileOutcome> {
    if !document.insert_model(&record.model)? {
        tracing::debug!(model = %record.model, db = %document.file_name(), "Model already present");
        return Ok(ReconcileOutcome::AlreadyPresent);
    }

    document.save()?;
    tracing::info!(
        model = %record.model,
        firmware = %record.firmware,
        db = %document.file_name(),
        "Added drive to compatibility database"
    );
    Ok(ReconcileOutcome::Inserted)
}
