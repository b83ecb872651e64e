//! Sweep report data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bench::workload::{format_arguments, ArgValue};
use crate::models::result::BenchmarkResult;
use crate::REPORT_EXTENSION;

/// Results of one sweep: the same workload measured under a series of
/// worker/repetition splits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub workload_name: String,
    pub arguments: Vec<ArgValue>,
    /// Worker count of each step, in measurement order
    pub worker_counts: Vec<usize>,
    /// Repetitions per worker of each step, in measurement order
    pub repetitions: Vec<usize>,
    /// Timestamp when the sweep finished
    pub generated_at: DateTime<Utc>,
    pub results: Vec<BenchmarkResult>,
}

impl SweepReport {
    /// Create a report from the results of a finished sweep
    pub fn new(
        workload_name: impl Into<String>,
        arguments: Vec<ArgValue>,
        results: Vec<BenchmarkResult>,
    ) -> Self {
        Self {
            workload_name: workload_name.into(),
            arguments,
            worker_counts: results.iter().map(|r| r.worker_count).collect(),
            repetitions: results.iter().map(|r| r.repetitions_per_worker).collect(),
            generated_at: Utc::now(),
            results,
        }
    }

    /// Mean of the first step divided by the mean of each step
    pub fn speedups(&self) -> Vec<f64> {
        let baseline = match self.results.first() {
            Some(first) => first.mean,
            None => return Vec::new(),
        };

        self.results
            .iter()
            .map(|r| if r.mean > 0.0 { baseline / r.mean } else { 0.0 })
            .collect()
    }

    /// Step with the lowest mean elapsed time
    pub fn fastest(&self) -> Option<&BenchmarkResult> {
        self.results
            .iter()
            .min_by(|a, b| a.mean.total_cmp(&b.mean))
    }

    /// Report file name, e.g. `sleep-(1)-[1,2,4,8]-[16,8,4,2].txt`
    ///
    /// Path separators coming from the workload name or string arguments
    /// are replaced with `_`, so the name is always a single component.
    pub fn file_name(&self) -> String {
        let name = format!(
            "{}-{}-{}-{}.{}",
            self.workload_name,
            format_arguments(&self.arguments),
            format_counts(&self.worker_counts),
            format_counts(&self.repetitions),
            REPORT_EXTENSION
        );
        name.chars()
            .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
            .collect()
    }
}

fn format_counts(counts: &[usize]) -> String {
    let rendered: Vec<String> = counts.iter().map(ToString::to_string).collect();
    format!("[{}]", rendered.join(","))
}
