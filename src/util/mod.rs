//! Utility functions module
//!
//! Contains helper functions for formatting times, rates and speedups,
//! plus the log filter used by the binary.

pub mod logging;
pub mod units;

// Re-export commonly used functions
pub use units::{calculate_rate, format_elapsed, format_rate, format_seconds, format_speedup};
