//! Configuration management module
//!
//! Holds the benchmark configuration triple, the sweep configuration file
//! and their validation rules.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Result, ThreadBenchError, APP_NAME, CONFIG_FILE};

pub mod persistence;

/// Benchmark configuration: how many workers, how many invocations each,
/// and how many timed samples to collect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Number of concurrent workers per run
    pub worker_count: usize,
    /// Sequential invocations performed by each worker
    pub repetitions_per_worker: usize,
    /// Number of timed runs to collect
    pub sample_count: usize,
}

impl BenchmarkConfig {
    /// Create a new benchmark configuration
    pub fn new(worker_count: usize, repetitions_per_worker: usize, sample_count: usize) -> Self {
        Self {
            worker_count,
            repetitions_per_worker,
            sample_count,
        }
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(ThreadBenchError::InvalidConfiguration(
                "Worker count must be greater than 0".to_string(),
            ));
        }

        if self.repetitions_per_worker == 0 {
            return Err(ThreadBenchError::InvalidConfiguration(
                "Repetitions per worker must be greater than 0".to_string(),
            ));
        }

        // Sample variance divides by sample_count - 1
        if self.sample_count < 2 {
            return Err(ThreadBenchError::InvalidConfiguration(format!(
                "Sample count must be at least 2 for variance, got {}",
                self.sample_count
            )));
        }

        Ok(())
    }

    /// Workload invocations performed by a single run
    pub fn invocations_per_run(&self) -> usize {
        self.worker_count * self.repetitions_per_worker
    }

    /// Workload invocations performed across all samples
    pub fn total_invocations(&self) -> usize {
        self.invocations_per_run() * self.sample_count
    }
}

/// Sweep configuration stored in the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Worker count of each sweep step
    pub worker_counts: Vec<usize>,
    /// Repetitions per worker of each sweep step
    pub repetitions: Vec<usize>,
    /// Samples collected per step
    pub sample_count: usize,
    /// Sleep length of one unit for the sleep workload, in microseconds
    pub sleep_unit_us: u64,
    /// Directory receiving report files
    pub output_dir: PathBuf,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            worker_counts: vec![1, 2, 4, 8],
            repetitions: vec![16, 8, 4, 2],
            sample_count: 5,
            sleep_unit_us: 100_000,
            output_dir: PathBuf::from("."),
        }
    }
}

impl SweepConfig {
    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.worker_counts.is_empty() {
            return Err(ThreadBenchError::InvalidConfiguration(
                "At least one worker count is required".to_string(),
            ));
        }

        if self.worker_counts.len() != self.repetitions.len() {
            return Err(ThreadBenchError::InvalidConfiguration(format!(
                "Got {} worker counts but {} repetition counts",
                self.worker_counts.len(),
                self.repetitions.len()
            )));
        }

        for (&workers, &reps) in self.worker_counts.iter().zip(&self.repetitions) {
            BenchmarkConfig::new(workers, reps, self.sample_count).validate()?;
        }

        if self.sleep_unit_us == 0 {
            return Err(ThreadBenchError::InvalidConfiguration(
                "Sleep unit must be at least 1µs".to_string(),
            ));
        }

        Ok(())
    }

    /// Set the worker counts of the sweep steps
    pub fn with_worker_counts(mut self, worker_counts: Vec<usize>) -> Self {
        self.worker_counts = worker_counts;
        self
    }

    /// Set the repetitions per worker of the sweep steps
    pub fn with_repetitions(mut self, repetitions: Vec<usize>) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Set the number of samples per step
    pub fn with_sample_count(mut self, sample_count: usize) -> Self {
        self.sample_count = sample_count;
        self
    }

    /// Set the sleep workload unit
    pub fn with_sleep_unit(mut self, unit: Duration) -> Self {
        self.sleep_unit_us = u64::try_from(unit.as_micros()).unwrap_or(u64::MAX);
        self
    }

    /// Set the report output directory
    pub fn with_output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn sleep_unit(&self) -> Duration {
        Duration::from_micros(self.sleep_unit_us)
    }

    /// Load configuration from the standard config file location
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load configuration from `path`, or defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ThreadBenchError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            ThreadBenchError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ThreadBenchError::ConfigError(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(path, content).map_err(|e| {
            ThreadBenchError::ConfigError(format!(
                "Failed to write config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// `explicit` when given, the standard location otherwise
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::config_file_path(),
        }
    }

    /// Get the standard configuration file path
    /// Uses $CONFIG_HOME/threadbench/threadbench.toml
    pub fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ThreadBenchError::ConfigError("Unable to determine config directory".to_string())
        })?;

        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}
