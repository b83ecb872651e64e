use std::sync::atomic::{AtomicUsize, Ordering};

use threadbench::bench::{from_fn, BenchmarkOrchestrator, WorkloadError};
use threadbench::{error, measure, BenchmarkConfig, ThreadBenchError};

#[test]
fn test_failing_workload_reports_failure() {
    let calls = AtomicUsize::new(0);
    let workload = from_fn("broken", |_: &()| {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(WorkloadError::new("broken on purpose"))
    });

    let result = measure(3, 1, 2, &workload, &());

    match result {
        Err(ThreadBenchError::WorkloadFailure {
            workload, message, ..
        }) => {
            assert_eq!(workload, "broken");
            assert_eq!(message, "broken on purpose");
        }
        other => panic!("expected WorkloadFailure, got {:?}", other),
    }
    // The first sample fails, so the second one never starts
    assert!(calls.load(Ordering::SeqCst) <= 3);
}

#[test]
fn test_cancel_handle_stops_benchmark() {
    let orchestrator = BenchmarkOrchestrator::new();
    let cancel = orchestrator.cancel_handle();
    let workload = from_fn("cancels", |_: &()| {
        cancel.cancel();
        Ok(())
    });

    let err = orchestrator
        .measure(&BenchmarkConfig::new(1, 5, 3), &workload, &())
        .unwrap_err();
    assert!(matches!(err, ThreadBenchError::Cancelled(_)));
}

#[test]
fn test_user_friendly_message() {
    let msg = error::user_friendly_message(&ThreadBenchError::InvalidConfiguration(
        "Sample count must be at least 2".into(),
    ));
    assert!(msg.contains("at least 2 samples"));

    let msg = error::user_friendly_message(&ThreadBenchError::WorkloadFailure {
        workload: "spin".into(),
        worker: 1,
        message: "exponent too large".into(),
    });
    assert!(msg.contains("spin"));
    assert!(msg.contains("exponent too large"));
}

#[test]
fn test_configuration_errors_are_classified() {
    assert!(error::is_configuration_error(
        &ThreadBenchError::InvalidConfiguration("x".into())
    ));
    assert!(!error::is_configuration_error(&ThreadBenchError::Cancelled(
        "x".into()
    )));
}
