//! Sweep runner used by the command line tool
//!
//! Runs a sweep on the blocking thread pool while a progress bar follows
//! the per-sample progress events.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::bench::orchestrator::{BenchmarkOrchestrator, SampleProgress};
use crate::bench::sweep::{run_sweep, SweepPlan};
use crate::bench::workload::{Arguments, Workload};
use crate::bench::workloads::{BuiltinWorkload, SleepWorkload, SpinWorkload};
use crate::config::SweepConfig;
use crate::models::SweepReport;
use crate::util::units::format_seconds;
use crate::{Result, ThreadBenchError};

/// Run a sweep with a live progress bar.
pub async fn run_sweep_with_progress<W, A>(
    plan: SweepPlan,
    workload: Arc<W>,
    args: A,
) -> Result<SweepReport>
where
    W: Workload<A> + Send + 'static,
    A: Arguments + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<SampleProgress>();
    let orchestrator = BenchmarkOrchestrator::new().with_progress(tx);

    let pb = indicatif::ProgressBar::new(plan.total_samples() as u64);
    pb.set_style(
        indicatif::ProgressStyle::with_template(
            "{spinner} [{bar:30}] {pos}/{len} samples ({elapsed}) {msg}",
        )
        .map_err(|e| ThreadBenchError::BenchmarkError(format!("Invalid progress template: {}", e)))?
        .progress_chars("=> "),
    );

    let handle = tokio::spawn(async move {
        while let Some(SampleProgress {
            worker_count,
            repetitions_per_worker,
            elapsed,
            ..
        }) = rx.recv().await
        {
            pb.inc(1);
            pb.set_message(format!(
                "{} workers x {} reps: {}",
                worker_count,
                repetitions_per_worker,
                format_seconds(elapsed.as_secs_f64())
            ));
        }
        pb.finish_and_clear();
    });

    let result = tokio::task::spawn_blocking(move || {
        run_sweep(&orchestrator, &plan, workload.as_ref(), &args)
    })
    .await
    .map_err(|e| ThreadBenchError::BenchmarkError(format!("Sweep task failed: {}", e)))?;

    // The orchestrator (and its sender) is dropped with the blocking task,
    // which ends the progress loop.
    handle.await.ok();
    result
}

/// Run a sweep of one of the built-in workloads
pub async fn run_builtin_sweep(
    workload: BuiltinWorkload,
    argument: u32,
    config: &SweepConfig,
) -> Result<SweepReport> {
    config.validate()?;
    let plan = SweepPlan::from_config(config)?;

    match workload {
        BuiltinWorkload::Sleep => {
            let sleep = Arc::new(SleepWorkload::with_unit(config.sleep_unit()));
            run_sweep_with_progress(plan, sleep, (argument,)).await
        }
        BuiltinWorkload::Spin => {
            run_sweep_with_progress(plan, Arc::new(SpinWorkload::new()), (argument,)).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::workload::from_fn;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_sweep_with_progress() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let workload = Arc::new(from_fn("count", move |_: &()| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        let plan = SweepPlan::constant_work(4, &[1, 2], 2).unwrap();

        let report = run_sweep_with_progress(plan, workload, ()).await.unwrap();
        assert_eq!(report.results.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 16);
    }

    #[tokio::test]
    async fn test_run_builtin_sleep_sweep() {
        let config = SweepConfig::default()
            .with_worker_counts(vec![1, 2])
            .with_repetitions(vec![2, 1])
            .with_sample_count(2)
            .with_sleep_unit(Duration::from_millis(5));

        let report = run_builtin_sweep(BuiltinWorkload::Sleep, 1, &config)
            .await
            .unwrap();
        assert_eq!(report.workload_name, "sleep");
        assert_eq!(report.file_name(), "sleep-(1)-[1,2]-[2,1].txt");
    }

    #[tokio::test]
    async fn test_run_builtin_rejects_invalid_config() {
        let config = SweepConfig::default().with_sample_count(1);
        let err = run_builtin_sweep(BuiltinWorkload::Spin, 4, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, ThreadBenchError::InvalidConfiguration(_)));
    }
}
