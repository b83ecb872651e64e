//! Benchmark engine module
//!
//! Contains the workload abstraction, the concurrent run executor, the
//! orchestrator that repeats runs and the sweep driver.

pub mod executor;
pub mod orchestrator;
pub mod sweep;
pub mod workload;
pub mod workloads;

// Re-export commonly used types
pub use executor::{CancelHandle, ConcurrentRunExecutor, WorkerReport, WorkerStatus};
pub use orchestrator::{BenchmarkOrchestrator, SampleProgress};
pub use sweep::{run_sweep, SweepPlan};
pub use workload::{from_fn, ArgValue, Arguments, FnWorkload, Workload, WorkloadError};
pub use workloads::{BuiltinWorkload, SleepWorkload, SpinWorkload};
