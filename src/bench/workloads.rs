//! Sample workloads
//!
//! Two stateless payloads contrasting blocking and CPU-bound work: a sleep
//! that leaves the core idle and a busy counter that keeps it saturated.

use std::hint::black_box;
use std::thread;
use std::time::Duration;

use crate::bench::workload::{Workload, WorkloadError, WorkloadResult};

/// Default length of one sleep unit
pub const DEFAULT_SLEEP_UNIT: Duration = Duration::from_millis(100);

/// Largest exponent accepted by [`SpinWorkload`]
pub const MAX_SPIN_EXPONENT: u32 = 63;

/// Sleeps `n` units per invocation
#[derive(Debug, Clone, Copy)]
pub struct SleepWorkload {
    unit: Duration,
}

impl Default for SleepWorkload {
    fn default() -> Self {
        Self {
            unit: DEFAULT_SLEEP_UNIT,
        }
    }
}

impl SleepWorkload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the length of one sleep unit
    pub fn with_unit(unit: Duration) -> Self {
        Self { unit }
    }

    pub fn unit(&self) -> Duration {
        self.unit
    }
}

impl Workload<(u32,)> for SleepWorkload {
    fn name(&self) -> &str {
        "sleep"
    }

    fn invoke(&self, &(units,): &(u32,)) -> WorkloadResult {
        thread::sleep(self.unit * units);
        Ok(())
    }
}

/// Counts through `2^n` iterations per invocation
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinWorkload;

impl SpinWorkload {
    pub fn new() -> Self {
        Self
    }
}

impl Workload<(u32,)> for SpinWorkload {
    fn name(&self) -> &str {
        "spin"
    }

    fn invoke(&self, &(exponent,): &(u32,)) -> WorkloadResult {
        if exponent > MAX_SPIN_EXPONENT {
            return Err(WorkloadError::new(format!(
                "Spin exponent {} exceeds maximum {}",
                exponent, MAX_SPIN_EXPONENT
            )));
        }

        let iterations = 1u64 << exponent;
        let mut counter = 0u64;
        for i in 0..iterations {
            counter = black_box(counter.wrapping_add(black_box(i)));
        }
        black_box(counter);
        Ok(())
    }
}

/// Built-in workload selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinWorkload {
    Sleep,
    Spin,
}

impl BuiltinWorkload {
    /// Look up a workload by its recorded name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sleep" => Some(Self::Sleep),
            "spin" => Some(Self::Spin),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Spin => "spin",
        }
    }

    /// Get a human-readable description of the workload
    pub fn description(&self) -> &'static str {
        match self {
            Self::Sleep => "Blocking sleep of n units, CPU stays idle",
            Self::Spin => "Busy loop of 2^n iterations, CPU bound",
        }
    }
}
