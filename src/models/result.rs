//! Benchmark result data models
//!
//! Contains the result record returned by the orchestrator and the
//! summary statistics computed over run samples.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::bench::workload::{format_arguments, ArgValue};
use crate::config::BenchmarkConfig;
use crate::util::units::{calculate_rate, format_seconds};
use crate::{Result, ThreadBenchError};

/// Result of one benchmark: workload identity, configuration and statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Name of the measured workload
    pub workload_name: String,
    /// Arguments every invocation received
    pub arguments: Vec<ArgValue>,
    pub worker_count: usize,
    pub repetitions_per_worker: usize,
    pub sample_count: usize,
    /// Mean elapsed time per run, in seconds
    pub mean: f64,
    /// Sample variance of the elapsed times, in seconds squared
    pub variance: f64,
}

/// Summary statistics over a set of run samples, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    pub mean: f64,
    /// Sample variance (Bessel's correction)
    pub variance: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl BenchmarkResult {
    /// Create a new benchmark result
    pub fn new(
        workload_name: impl Into<String>,
        arguments: Vec<ArgValue>,
        config: &BenchmarkConfig,
        stats: &SampleStats,
    ) -> Self {
        Self {
            workload_name: workload_name.into(),
            arguments,
            worker_count: config.worker_count,
            repetitions_per_worker: config.repetitions_per_worker,
            sample_count: config.sample_count,
            mean: stats.mean,
            variance: stats.variance,
        }
    }

    /// Configuration this result was measured with
    pub fn config(&self) -> BenchmarkConfig {
        BenchmarkConfig::new(
            self.worker_count,
            self.repetitions_per_worker,
            self.sample_count,
        )
    }

    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    /// Mean elapsed time as a [`Duration`]
    pub fn mean_duration(&self) -> Duration {
        Duration::from_secs_f64(self.mean.max(0.0))
    }

    /// Workload invocations per second of wall-clock time
    pub fn throughput(&self) -> f64 {
        calculate_rate(self.config().invocations_per_run(), self.mean)
    }

    /// Get a human-readable summary of the benchmark result
    pub fn summary(&self) -> String {
        format!(
            "{}{} - {} workers x {} reps - mean {} - stddev {} - {} samples",
            self.workload_name,
            format_arguments(&self.arguments),
            self.worker_count,
            self.repetitions_per_worker,
            format_seconds(self.mean),
            format_seconds(self.std_dev()),
            self.sample_count
        )
    }
}

impl SampleStats {
    /// Compute statistics over elapsed-time samples.
    ///
    /// At least two samples are required for the sample variance to be
    /// defined.
    pub fn from_samples(samples: &[Duration]) -> Result<Self> {
        let secs: Vec<f64> = samples.iter().map(Duration::as_secs_f64).collect();
        Self::from_secs(&secs)
    }

    /// Same as [`from_samples`](Self::from_samples) over raw seconds
    pub fn from_secs(samples: &[f64]) -> Result<Self> {
        if samples.len() < 2 {
            return Err(ThreadBenchError::InvalidConfiguration(format!(
                "Variance needs at least 2 samples, got {}",
                samples.len()
            )));
        }

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(Self {
            mean,
            variance,
            std_dev: variance.sqrt(),
            min,
            max,
        })
    }

    /// Spread between the slowest and fastest sample
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Standard deviation relative to the mean
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean > 0.0 {
            self.std_dev / self.mean
        } else {
            0.0
        }
    }
}
