use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::report::SimulationReport;

/// Writes a report to `<dir>/<scenario>/tick_NNNNNN.json` every `interval`
/// ticks. An interval of zero disables writing.
pub struct SnapshotWriter {
    dir: PathBuf,
    interval: u64,
}

impl SnapshotWriter {
    pub fn new(dir: impl AsRef<Path>, interval: u64) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            interval,
        }
    }

    pub fn maybe_write(
        &self,
        scenario: &str,
        report: &SimulationReport,
    ) -> Result<Option<PathBuf>> {
        if self.interval == 0 || report.tick == 0 || report.tick % self.interval != 0 {
            return Ok(None);
        }
        self.write(scenario, report).map(Some)
    }

    pub fn write(&self, scenario: &str, report: &SimulationReport) -> Result<PathBuf> {
        let dir = self.dir.join(scenario);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create report directory {}", dir.display()))?;
        let path = dir.join(format!("tick_{:06}.json", report.tick));
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}
