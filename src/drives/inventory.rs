// Deduplicated per-class drive inventory

use crate::{DriveClass, DriveRecord};
use serde::{Deserialize, Serialize};

/// Distinct (model, firmware) pairs found for one drive class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveInventory {
    class: DriveClass,
    records: Vec<DriveRecord>,
}

impl DriveInventory {
    /// Build an inventory, dropping exact duplicate pairs.
    pub fn from_records(class: DriveClass, records: impl IntoIterator<Item = DriveRecord>) -> Self {
        let mut records: Vec<DriveRecord> = records.into_iter().collect();
        records.sort();
        records.dedup();
        Self { class, records }
    }

    pub fn empty(class: DriveClass) -> Self {
        Self {
            class,
            records: Vec::new(),
        }
    }

    pub fn class(&self) -> DriveClass {
        self.class
    }

    pub fn records(&self) -> &[DriveRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DriveRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a DriveInventory {
    type Item = &'a DriveRecord;
    type IntoIter = std::slice::Iter<'a, DriveRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
