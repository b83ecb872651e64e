//! Scaling sweeps
//!
//! A sweep measures the same workload under a series of
//! `(worker_count, repetitions_per_worker)` splits, usually keeping the
//! total work constant, to show how elapsed time scales with concurrency.

use crate::bench::orchestrator::BenchmarkOrchestrator;
use crate::bench::workload::{Arguments, Workload};
use crate::config::{BenchmarkConfig, SweepConfig};
use crate::models::SweepReport;
use crate::{Result, ThreadBenchError};

/// Ordered list of benchmark configurations sharing one sample count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepPlan {
    steps: Vec<BenchmarkConfig>,
}

impl SweepPlan {
    /// Pair worker counts with repetition counts position by position
    pub fn new(worker_counts: &[usize], repetitions: &[usize], sample_count: usize) -> Result<Self> {
        if worker_counts.is_empty() {
            return Err(ThreadBenchError::InvalidConfiguration(
                "A sweep needs at least one step".to_string(),
            ));
        }
        if worker_counts.len() != repetitions.len() {
            return Err(ThreadBenchError::InvalidConfiguration(format!(
                "Got {} worker counts but {} repetition counts",
                worker_counts.len(),
                repetitions.len()
            )));
        }

        let steps = worker_counts
            .iter()
            .zip(repetitions)
            .map(|(&workers, &reps)| {
                let config = BenchmarkConfig::new(workers, reps, sample_count);
                config.validate().map(|_| config)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { steps })
    }

    /// Split `total_invocations` evenly across each worker count
    pub fn constant_work(
        total_invocations: usize,
        worker_counts: &[usize],
        sample_count: usize,
    ) -> Result<Self> {
        let mut repetitions = Vec::with_capacity(worker_counts.len());
        for &workers in worker_counts {
            if workers == 0 || total_invocations % workers != 0 {
                return Err(ThreadBenchError::InvalidConfiguration(format!(
                    "{} invocations cannot be split evenly across {} workers",
                    total_invocations, workers
                )));
            }
            repetitions.push(total_invocations / workers);
        }

        Self::new(worker_counts, &repetitions, sample_count)
    }

    /// Build the plan described by a sweep configuration
    pub fn from_config(config: &SweepConfig) -> Result<Self> {
        Self::new(&config.worker_counts, &config.repetitions, config.sample_count)
    }

    pub fn steps(&self) -> &[BenchmarkConfig] {
        &self.steps
    }

    /// Number of samples collected across every step
    pub fn total_samples(&self) -> usize {
        self.steps.iter().map(|s| s.sample_count).sum()
    }

    /// Number of workload invocations across every step
    pub fn total_invocations(&self) -> usize {
        self.steps.iter().map(BenchmarkConfig::total_invocations).sum()
    }
}

/// Measure every step of `plan` in order.
///
/// The first failing step aborts the sweep and its error is returned.
pub fn run_sweep<W, A>(
    orchestrator: &BenchmarkOrchestrator,
    plan: &SweepPlan,
    workload: &W,
    args: &A,
) -> Result<SweepReport>
where
    W: Workload<A> + ?Sized,
    A: Arguments,
{
    tracing::info!(
        workload = workload.name(),
        steps = plan.steps().len(),
        total_samples = plan.total_samples(),
        "Starting sweep"
    );

    let mut results = Vec::with_capacity(plan.steps().len());
    for step in plan.steps() {
        results.push(orchestrator.measure(step, workload, args)?);
    }

    Ok(SweepReport::new(workload.name(), args.values(), results))
}
