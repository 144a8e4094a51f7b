// Drive inventory module
//
// Organized structure:
// - identify.rs: identify utility runner and output parser
// - detection.rs: device node / NVMe sysfs scanning
// - inventory.rs: deduplicated per-class inventory

pub mod detection;
pub mod identify;
pub mod inventory;

// Tests
#[cfg(test)]
mod detection_tests;

pub use detection::DriveDetector;
pub use identify::{parse_identify_output, DeviceIdentifier, HdparmIdentifier, IdentifyError};
pub use inventory::DriveInventory;
