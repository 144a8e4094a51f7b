// Drive identification - runs the identify utility and parses its output

use crate::DriveRecord;
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::process::Command;
use thiserror::Error;

/// Why an identify report could not be turned into a [`DriveRecord`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifyError {
    #[error("no Model= line in identify output")]
    NoIdentityLine,

    #[error("identify output has no {0} field")]
    MissingField(&'static str),

    #[error("identify output has an empty {0} field")]
    EmptyField(&'static str),
}

/// Source of raw identify reports for ATA/SCSI devices.
pub trait DeviceIdentifier {
    /// Return the identify report for a device node.
    fn identify(&self, device: &Path) -> Result<String>;
}

/// Runs `hdparm -i <device>`.
pub struct HdparmIdentifier {
    program: String,
}

impl HdparmIdentifier {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for HdparmIdentifier {
    fn default() -> Self {
        Self::new("hdparm")
    }
}

impl DeviceIdentifier for HdparmIdentifier {
    fn identify(&self, device: &Path) -> Result<String> {
        let output = Command::new(&self.program)
            .arg("-i")
            .arg(device)
            .output()
            .with_context(|| format!("Failed to run {}", self.program))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "{} -i {} failed: {}",
                self.program,
                device.display(),
                error.trim()
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Parse the identity line of an `hdparm -i` report.
///
/// The line looks like ` Model=WDC WD40EFRX-68N32N0, FwRev=82.00A82, SerialNo=...`.
pub fn parse_identify_output(output: &str) -> Result<DriveRecord, IdentifyError> {
    let line = output
        .lines()
        .find(|line| line.contains("Model="))
        .ok_or(IdentifyError::NoIdentityLine)?;

    let model = identity_field(line, "Model")?;
    let firmware = identity_field(line, "FwRev")?;

    Ok(DriveRecord::new(model, firmware))
}

fn identity_field<'a>(line: &'a str, name: &'static str) -> Result<&'a str, IdentifyError> {
    let value = line
        .split(',')
        .filter_map(|part| part.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| clean_value(value))
        .ok_or(IdentifyError::MissingField(name))?;

    if value.is_empty() {
        return Err(IdentifyError::EmptyField(name));
    }
    Ok(value)
}

fn clean_value(value: &str) -> &str {
    value.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}
