/// Mock drive identification
///
/// Stands in for `hdparm -i` so integration tests never touch real devices.

use anyhow::{anyhow, Result};
use drivedb_patch::drives::DeviceIdentifier;
use std::collections::HashMap;
use std::path::Path;

/// Mock identify response
#[derive(Clone, Debug)]
pub enum MockIdentifyOutput {
    Report(String),
    Failure(String),
}

impl MockIdentifyOutput {
    /// Report in the shape hdparm prints it
    pub fn drive(model: &str, firmware: &str) -> Self {
        Self::Report(format!(
            "\n/dev/x:\n\n Model={}, FwRev={}, SerialNo=MOCK0001\n Config={{ HardSect NotMFM HdSw>15uSec Fixed DTR>10Mbs }}\n RawCHS=16383/16/63, TrkSize=0, SectSize=0, ECCbytes=0\n",
            model, firmware
        ))
    }

    #[allow(dead_code)]
    pub fn failure(stderr: &str) -> Self {
        Self::Failure(stderr.to_string())
    }
}

/// Identifier answering from a table keyed by device file name
#[derive(Default)]
pub struct MockIdentifier {
    outputs: HashMap<String, MockIdentifyOutput>,
}

impl MockIdentifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, device: &str, output: MockIdentifyOutput) -> Self {
        self.outputs.insert(device.to_string(), output);
        self
    }
}

impl DeviceIdentifier for MockIdentifier {
    fn identify(&self, device: &Path) -> Result<String> {
        let name = device
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        match self.outputs.get(&name) {
            Some(MockIdentifyOutput::Report(report)) => Ok(report.clone()),
            Some(MockIdentifyOutput::Failure(stderr)) => Err(anyhow!("{}", stderr)),
            None => Err(anyhow!(
                "{}: HDIO_GET_IDENTITY failed: Inappropriate ioctl for device",
                device.display()
            )),
        }
    }
}
