//! threadbench - Thread scaling micro-benchmark harness
//!
//! Measures how the wall-clock time of a workload changes when a fixed
//! amount of repeated work is spread across a varying number of
//! concurrent workers.

use thiserror::Error;

// Public re-exports
pub mod bench;
pub mod config;
pub mod models;
pub mod runner;
pub mod util;

pub use bench::orchestrator::{measure, BenchmarkOrchestrator};
pub use bench::workload::{ArgValue, Arguments, Workload, WorkloadError, WorkloadResult};
pub use config::BenchmarkConfig;
pub use models::BenchmarkResult;

// Common error types
#[derive(Debug, Error)]
pub enum ThreadBenchError {
    /// A worker count, repetition count or sample count is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The workload failed inside one of the workers
    #[error("Workload '{workload}' failed in worker {worker}: {message}")]
    WorkloadFailure {
        workload: String,
        worker: usize,
        message: String,
    },
    /// A run was stopped through its cancel handle
    #[error("Benchmark cancelled: {0}")]
    Cancelled(String),
    /// Benchmark execution error outside the workload itself
    #[error("Benchmark error: {0}")]
    BenchmarkError(String),
    /// Configuration file loading or parsing error
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Report file serialization error
    #[error("Report persistence error: {0}")]
    PersistenceError(String),
    /// I/O operation failed
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for ThreadBenchError {
    fn from(err: serde_json::Error) -> Self {
        ThreadBenchError::PersistenceError(format!("JSON serialization error: {}", err))
    }
}

impl From<toml::de::Error> for ThreadBenchError {
    fn from(err: toml::de::Error) -> Self {
        ThreadBenchError::ConfigError(format!("TOML parsing error: {}", err))
    }
}

impl From<toml::ser::Error> for ThreadBenchError {
    fn from(err: toml::ser::Error) -> Self {
        ThreadBenchError::ConfigError(format!("TOML serialization error: {}", err))
    }
}

/// Result type alias for threadbench operations
pub type Result<T> = std::result::Result<T, ThreadBenchError>;

/// Error handling utilities
pub mod error {
    use super::ThreadBenchError;

    /// Convert error to user-friendly message with suggestions
    pub fn user_friendly_message(error: &ThreadBenchError) -> String {
        match error {
            ThreadBenchError::InvalidConfiguration(msg) => {
                format!(
                    "Invalid benchmark configuration: {}. Worker, repetition and sample counts must be positive, with at least 2 samples.",
                    msg
                )
            }
            ThreadBenchError::WorkloadFailure {
                workload, message, ..
            } => {
                format!(
                    "The '{}' workload failed: {}. No result was recorded for this step.",
                    workload, message
                )
            }
            ThreadBenchError::ConfigError(msg) => {
                format!("Configuration error: {}. Check your settings.", msg)
            }
            ThreadBenchError::PersistenceError(_) => {
                "Failed to write the report. Check disk space and permissions.".to_string()
            }
            ThreadBenchError::Cancelled(_) => "Benchmark was cancelled by user.".to_string(),
            _ => error.to_string(),
        }
    }

    /// Whether the error was raised before any worker was spawned
    pub fn is_configuration_error(error: &ThreadBenchError) -> bool {
        matches!(
            error,
            ThreadBenchError::InvalidConfiguration(_) | ThreadBenchError::ConfigError(_)
        )
    }
}

// Common types and constants
pub const APP_NAME: &str = "threadbench";
pub const CONFIG_FILE: &str = "threadbench.toml";
pub const REPORT_EXTENSION: &str = "txt";
