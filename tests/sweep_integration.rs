//! Integration tests for sweeps and report files

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tempfile::tempdir;
use threadbench::bench::{from_fn, run_sweep, BenchmarkOrchestrator, SleepWorkload, SweepPlan};
use threadbench::config::persistence::ReportWriter;

#[test]
fn test_constant_work_sweep_counts_invocations() {
    let calls = AtomicUsize::new(0);
    let workload = from_fn("count", |_: &()| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    let plan = SweepPlan::constant_work(4, &[1, 2, 4], 3).unwrap();

    let report = run_sweep(&BenchmarkOrchestrator::new(), &plan, &workload, &()).unwrap();

    assert_eq!(report.results.len(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3 * 4 * 3);
    for result in &report.results {
        assert_eq!(result.worker_count * result.repetitions_per_worker, 4);
    }
}

#[test]
fn test_sleep_sweep_speeds_up_with_workers() {
    let workload = SleepWorkload::with_unit(Duration::from_millis(25));
    let plan = SweepPlan::constant_work(4, &[1, 4], 2).unwrap();

    let report = run_sweep(&BenchmarkOrchestrator::new(), &plan, &workload, &(1u32,)).unwrap();
    let speedups = report.speedups();

    // 4 x 25ms sequentially versus 25ms in parallel
    assert!((speedups[0] - 1.0).abs() < 1e-9);
    assert!(speedups[1] > 2.0, "speedup was {}", speedups[1]);
    assert_eq!(report.fastest().map(|r| r.worker_count), Some(4));
}

#[test]
fn test_sweep_report_round_trip() {
    let dir = tempdir().unwrap();
    let workload = from_fn("noop", |_: &(u32,)| Ok(()));
    let plan = SweepPlan::new(&[1, 2], &[2, 1], 2).unwrap();

    let report = run_sweep(&BenchmarkOrchestrator::new(), &plan, &workload, &(12u32,)).unwrap();
    let path = ReportWriter::new(dir.path()).write(&report).unwrap();

    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("noop-(12)-[1,2]-[2,1].txt")
    );
    assert_eq!(ReportWriter::load(&path).unwrap(), report.results);
}
