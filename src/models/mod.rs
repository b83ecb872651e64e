//! Data models module
//!
//! Contains the benchmark result record, sample statistics and the
//! sweep report.

pub mod report;
pub mod result;

// Re-export commonly used types
pub use report::SweepReport;
pub use result::{BenchmarkResult, SampleStats};
