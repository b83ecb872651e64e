//! Report persistence module
//!
//! Writes a sweep report to a text file holding one JSON-serialized
//! benchmark result per line, and reads such files back.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{BenchmarkResult, SweepReport};
use crate::{Result, ThreadBenchError};

/// Writes sweep reports into an output directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    /// Create a report writer targeting `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path the report will be written to
    pub fn report_path(&self, report: &SweepReport) -> PathBuf {
        self.output_dir.join(report.file_name())
    }

    /// Write `report`, replacing any previous file of the same name
    pub fn write(&self, report: &SweepReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            ThreadBenchError::PersistenceError(format!(
                "Failed to create output directory {}: {}",
                self.output_dir.display(),
                e
            ))
        })?;

        let mut content = String::new();
        for result in &report.results {
            content.push_str(&serde_json::to_string(result)?);
            content.push('\n');
        }

        let path = self.report_path(report);
        fs::write(&path, content).map_err(|e| {
            ThreadBenchError::PersistenceError(format!(
                "Failed to write report file {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(path = %path.display(), steps = report.results.len(), "Report written");
        Ok(path)
    }

    /// Load the results stored in a report file
    pub fn load(path: &Path) -> Result<Vec<BenchmarkResult>> {
        let content = fs::read_to_string(path).map_err(|e| {
            ThreadBenchError::PersistenceError(format!(
                "Failed to read report file {}: {}",
                path.display(),
                e
            ))
        })?;

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                serde_json::from_str(line).map_err(|e| {
                    ThreadBenchError::PersistenceError(format!(
                        "Failed to parse line {} of {}: {}",
                        i + 1,
                        path.display(),
                        e
                    ))
                })
            })
            .collect()
    }
}
