//! Concurrent run executor
//!
//! Spawns a fixed number of worker threads, has each one invoke the
//! workload a fixed number of times in sequence, and times the whole run
//! from just before the first spawn until the last worker has been joined.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

use crate::bench::workload::{Arguments, Workload};
use crate::{Result, ThreadBenchError};

/// Final state of a single worker within one run
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerStatus {
    /// Worker performed all of its invocations
    Completed,
    /// Worker stopped because its own invocation failed
    Failed(String),
    /// Worker stopped early because another worker failed
    Aborted,
    /// Worker stopped early because the run was cancelled
    Cancelled,
}

/// Per-worker bookkeeping collected when the worker is joined
#[derive(Debug, Clone)]
pub struct WorkerReport {
    /// Worker index within the run
    pub id: usize,
    /// Number of workload invocations that completed successfully
    pub invocations: usize,
    /// How the worker finished
    pub status: WorkerStatus,
}

impl WorkerReport {
    pub fn is_completed(&self) -> bool {
        matches!(self.status, WorkerStatus::Completed)
    }
}

/// Cloneable handle used to request that in-flight and future runs stop
/// before their next invocation.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clear a previous cancel request so the handle can be reused
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// First failure observed during a run
#[derive(Debug)]
struct WorkerFailure {
    worker: usize,
    message: String,
}

/// Executes one timed concurrent run
#[derive(Debug, Clone, Default)]
pub struct ConcurrentRunExecutor {
    cancel: CancelHandle,
}

impl ConcurrentRunExecutor {
    /// Create a new executor with its own cancel handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an executor observing an existing cancel handle
    pub fn with_cancel_handle(cancel: CancelHandle) -> Self {
        Self { cancel }
    }

    /// Handle that can cancel runs of this executor
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run `workload(args)` `repetitions_per_worker` times on each of
    /// `worker_count` threads and return the elapsed wall-clock time.
    pub fn run<W, A>(
        &self,
        worker_count: usize,
        repetitions_per_worker: usize,
        workload: &W,
        args: &A,
    ) -> Result<Duration>
    where
        W: Workload<A> + ?Sized,
        A: Arguments,
    {
        self.run_with_reports(worker_count, repetitions_per_worker, workload, args)
            .map(|(elapsed, _)| elapsed)
    }

    /// Same as [`run`](Self::run), also returning the per-worker reports
    pub fn run_with_reports<W, A>(
        &self,
        worker_count: usize,
        repetitions_per_worker: usize,
        workload: &W,
        args: &A,
    ) -> Result<(Duration, Vec<WorkerReport>)>
    where
        W: Workload<A> + ?Sized,
        A: Arguments,
    {
        if worker_count == 0 {
            return Err(ThreadBenchError::InvalidConfiguration(
                "Worker count must be greater than 0".to_string(),
            ));
        }
        if repetitions_per_worker == 0 {
            return Err(ThreadBenchError::InvalidConfiguration(
                "Repetitions per worker must be greater than 0".to_string(),
            ));
        }

        let failure: OnceLock<WorkerFailure> = OnceLock::new();
        let stop = AtomicBool::new(false);

        let start = Instant::now();
        let reports = thread::scope(|scope| -> Result<Vec<WorkerReport>> {
            let mut handles = Vec::with_capacity(worker_count);

            for id in 0..worker_count {
                let failure = &failure;
                let stop = &stop;
                let cancel = &self.cancel;

                let spawned = thread::Builder::new()
                    .name(format!("bench-worker-{}", id))
                    .spawn_scoped(scope, move || {
                        worker_loop(id, repetitions_per_worker, workload, args, failure, stop, cancel)
                    });

                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(err) => {
                        // Already-spawned workers are joined when the scope ends.
                        stop.store(true, Ordering::SeqCst);
                        return Err(ThreadBenchError::BenchmarkError(format!(
                            "Failed to spawn worker {}: {}",
                            id, err
                        )));
                    }
                }
            }

            let mut reports = Vec::with_capacity(handles.len());
            for (id, handle) in handles.into_iter().enumerate() {
                match handle.join() {
                    Ok(report) => reports.push(report),
                    Err(payload) => {
                        // Only reachable if the loop itself panics outside the
                        // guarded invocation.
                        let message = panic_message(payload.as_ref());
                        let _ = failure.set(WorkerFailure {
                            worker: id,
                            message: message.clone(),
                        });
                        reports.push(WorkerReport {
                            id,
                            invocations: 0,
                            status: WorkerStatus::Failed(message),
                        });
                    }
                }
            }
            Ok(reports)
        })?;
        let elapsed = start.elapsed();

        if let Some(failure) = failure.into_inner() {
            tracing::warn!(
                workload = workload.name(),
                worker = failure.worker,
                error = %failure.message,
                "Workload failed, run aborted"
            );
            return Err(ThreadBenchError::WorkloadFailure {
                workload: workload.name().to_string(),
                worker: failure.worker,
                message: failure.message,
            });
        }

        if reports
            .iter()
            .any(|r| matches!(r.status, WorkerStatus::Cancelled))
        {
            return Err(ThreadBenchError::Cancelled(format!(
                "Run of '{}' cancelled after {:.3}s",
                workload.name(),
                elapsed.as_secs_f64()
            )));
        }

        tracing::debug!(
            workload = workload.name(),
            worker_count,
            repetitions_per_worker,
            elapsed_secs = elapsed.as_secs_f64(),
            "Run completed"
        );

        Ok((elapsed, reports))
    }
}

fn worker_loop<W, A>(
    id: usize,
    repetitions: usize,
    workload: &W,
    args: &A,
    failure: &OnceLock<WorkerFailure>,
    stop: &AtomicBool,
    cancel: &CancelHandle,
) -> WorkerReport
where
    W: Workload<A> + ?Sized,
    A: Arguments,
{
    let mut invocations = 0;

    for _ in 0..repetitions {
        if cancel.is_cancelled() {
            return WorkerReport {
                id,
                invocations,
                status: WorkerStatus::Cancelled,
            };
        }
        if stop.load(Ordering::SeqCst) {
            return WorkerReport {
                id,
                invocations,
                status: WorkerStatus::Aborted,
            };
        }

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            workload.invoke(args)
        }));

        let message = match outcome {
            Ok(Ok(())) => {
                invocations += 1;
                continue;
            }
            Ok(Err(err)) => err.to_string(),
            Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
        };

        let _ = failure.set(WorkerFailure {
            worker: id,
            message: message.clone(),
        });
        stop.store(true, Ordering::SeqCst);
        return WorkerReport {
            id,
            invocations,
            status: WorkerStatus::Failed(message),
        };
    }

    WorkerReport {
        id,
        invocations,
        status: WorkerStatus::Completed,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::workload::{from_fn, WorkloadError};
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_run_invokes_every_repetition() {
        let calls = AtomicUsize::new(0);
        let workload = from_fn("count", |_: &()| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let executor = ConcurrentRunExecutor::new();
        let (_, reports) = executor.run_with_reports(3, 5, &workload, &()).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 15);
        assert_eq!(reports.len(), 3);
        for (i, report) in reports.iter().enumerate() {
            assert_eq!(report.id, i);
            assert_eq!(report.invocations, 5);
            assert!(report.is_completed());
        }
    }

    #[test]
    fn test_workers_run_on_distinct_named_threads() {
        let names = std::sync::Mutex::new(Vec::new());
        let workload = from_fn("names", |_: &()| {
            let name = thread::current().name().map(str::to_string);
            names.lock().unwrap().push(name);
            Ok(())
        });

        ConcurrentRunExecutor::new().run(4, 1, &workload, &()).unwrap();

        let mut names: Vec<String> = names.lock().unwrap().iter().flatten().cloned().collect();
        names.sort();
        assert_eq!(
            names,
            vec!["bench-worker-0", "bench-worker-1", "bench-worker-2", "bench-worker-3"]
        );
    }

    #[test]
    fn test_zero_counts_rejected_before_spawning() {
        let calls = AtomicUsize::new(0);
        let workload = from_fn("count", |_: &()| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let executor = ConcurrentRunExecutor::new();

        assert!(matches!(
            executor.run(0, 1, &workload, &()),
            Err(ThreadBenchError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            executor.run(1, 0, &workload, &()),
            Err(ThreadBenchError::InvalidConfiguration(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failure_is_propagated() {
        let workload = from_fn("fail", |_: &()| Err(WorkloadError::new("always fails")));

        let err = ConcurrentRunExecutor::new()
            .run(3, 2, &workload, &())
            .unwrap_err();
        match err {
            ThreadBenchError::WorkloadFailure {
                workload, message, worker,
            } => {
                assert_eq!(workload, "fail");
                assert_eq!(message, "always fails");
                assert!(worker < 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_panic_is_reported_as_failure() {
        let workload = from_fn("panics", |_: &()| -> crate::WorkloadResult {
            panic!("kaboom");
        });

        let err = ConcurrentRunExecutor::new()
            .run(2, 1, &workload, &())
            .unwrap_err();
        match err {
            ThreadBenchError::WorkloadFailure { message, .. } => {
                assert!(message.contains("kaboom"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_failure_stops_remaining_repetitions() {
        let calls = AtomicUsize::new(0);
        let workload = from_fn("fail-once", |_: &()| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Err(WorkloadError::new("first call fails"))
            } else {
                Ok(())
            }
        });

        let result = ConcurrentRunExecutor::new().run(1, 10, &workload, &());
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancelled_executor_runs_nothing() {
        let calls = AtomicUsize::new(0);
        let workload = from_fn("count", |_: &()| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let executor = ConcurrentRunExecutor::new();
        let cancel = executor.cancel_handle();
        cancel.cancel();

        assert!(matches!(
            executor.run(2, 3, &workload, &()),
            Err(ThreadBenchError::Cancelled(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        cancel.reset();
        executor.run(2, 3, &workload, &()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_elapsed_covers_slowest_worker() {
        let workload = from_fn("sleep", |&(ms,): &(u64,)| {
            thread::sleep(Duration::from_millis(ms));
            Ok(())
        });

        let elapsed = ConcurrentRunExecutor::new()
            .run(2, 3, &workload, &(20u64,))
            .unwrap();
        assert!(elapsed >= Duration::from_millis(60));
    }
}
