//! Benchmark orchestrator
//!
//! Repeats the concurrent run executor for the configured number of
//! samples, reduces the samples to summary statistics and packages them
//! into a [`BenchmarkResult`].

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::bench::executor::{CancelHandle, ConcurrentRunExecutor};
use crate::bench::workload::{Arguments, Workload};
use crate::config::BenchmarkConfig;
use crate::models::{BenchmarkResult, SampleStats};
use crate::{Result, ThreadBenchError};

/// Progress event sent after every collected sample
#[derive(Debug, Clone)]
pub struct SampleProgress {
    /// Zero-based index of the sample that just finished
    pub sample_index: usize,
    /// Total samples for this benchmark
    pub sample_count: usize,
    pub worker_count: usize,
    pub repetitions_per_worker: usize,
    /// Elapsed time of the sample that just finished
    pub elapsed: Duration,
}

impl SampleProgress {
    /// Fraction of samples collected so far (0.0 to 1.0)
    pub fn completion_percentage(&self) -> f64 {
        if self.sample_count == 0 {
            0.0
        } else {
            (self.sample_index + 1) as f64 / self.sample_count as f64
        }
    }
}

/// Drives repeated concurrent runs and computes their statistics
#[derive(Debug, Clone, Default)]
pub struct BenchmarkOrchestrator {
    executor: ConcurrentRunExecutor,
    progress_tx: Option<mpsc::UnboundedSender<SampleProgress>>,
}

impl BenchmarkOrchestrator {
    /// Create a new orchestrator
    pub fn new() -> Self {
        Self::default()
    }

    /// Send a [`SampleProgress`] event after every sample
    pub fn with_progress(mut self, progress_tx: mpsc::UnboundedSender<SampleProgress>) -> Self {
        self.progress_tx = Some(progress_tx);
        self
    }

    /// Observe an existing cancel handle
    pub fn with_cancel_handle(mut self, cancel: CancelHandle) -> Self {
        self.executor = ConcurrentRunExecutor::with_cancel_handle(cancel);
        self
    }

    /// Handle that cancels the run currently in progress
    pub fn cancel_handle(&self) -> CancelHandle {
        self.executor.cancel_handle()
    }

    /// Measure `workload(args)` under `config`.
    ///
    /// Fails fast with [`ThreadBenchError::InvalidConfiguration`] before any
    /// worker is spawned. The first failing sample aborts the benchmark and
    /// its error is returned; samples collected so far are discarded.
    pub fn measure<W, A>(
        &self,
        config: &BenchmarkConfig,
        workload: &W,
        args: &A,
    ) -> Result<BenchmarkResult>
    where
        W: Workload<A> + ?Sized,
        A: Arguments,
    {
        config.validate()?;

        tracing::debug!(
            workload = workload.name(),
            worker_count = config.worker_count,
            repetitions_per_worker = config.repetitions_per_worker,
            sample_count = config.sample_count,
            "Starting benchmark"
        );

        let mut samples = Vec::with_capacity(config.sample_count);
        for sample_index in 0..config.sample_count {
            let elapsed = self.executor.run(
                config.worker_count,
                config.repetitions_per_worker,
                workload,
                args,
            )?;
            samples.push(elapsed);

            tracing::trace!(
                sample = sample_index,
                elapsed_secs = elapsed.as_secs_f64(),
                "Sample collected"
            );

            if let Some(tx) = &self.progress_tx {
                // Receiver may have gone away; the benchmark does not depend on it.
                let _ = tx.send(SampleProgress {
                    sample_index,
                    sample_count: config.sample_count,
                    worker_count: config.worker_count,
                    repetitions_per_worker: config.repetitions_per_worker,
                    elapsed,
                });
            }
        }

        let stats = SampleStats::from_samples(&samples)?;
        let result = BenchmarkResult::new(workload.name(), args.values(), config, &stats);

        tracing::info!(
            workload = workload.name(),
            worker_count = config.worker_count,
            repetitions_per_worker = config.repetitions_per_worker,
            mean_secs = result.mean,
            variance = result.variance,
            "Benchmark completed"
        );

        Ok(result)
    }

    /// Run [`measure`](Self::measure) on the blocking thread pool so async
    /// callers are not stalled by the benchmark threads.
    pub async fn measure_blocking_task<W, A>(
        self,
        config: BenchmarkConfig,
        workload: Arc<W>,
        args: A,
    ) -> Result<BenchmarkResult>
    where
        W: Workload<A> + Send + 'static,
        A: Arguments + Send + 'static,
    {
        tokio::task::spawn_blocking(move || self.measure(&config, workload.as_ref(), &args))
            .await
            .map_err(|e| ThreadBenchError::BenchmarkError(format!("Benchmark task failed: {}", e)))?
    }
}

/// Measure `workload(args)` with `worker_count` workers each performing
/// `repetitions_per_worker` invocations, over `sample_count` samples.
pub fn measure<W, A>(
    worker_count: usize,
    repetitions_per_worker: usize,
    sample_count: usize,
    workload: &W,
    args: &A,
) -> Result<BenchmarkResult>
where
    W: Workload<A> + ?Sized,
    A: Arguments,
{
    let config = BenchmarkConfig::new(worker_count, repetitions_per_worker, sample_count);
    BenchmarkOrchestrator::new().measure(&config, workload, args)
}
