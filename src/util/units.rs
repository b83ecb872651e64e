//! Units formatting utilities
//!
//! Provides functions for human-readable formatting of elapsed times,
//! invocation rates and speedup ratios.

use std::time::Duration;

/// Format a time in seconds with a unit suited to its magnitude
///
/// # Examples
/// ```
/// use threadbench::util::units::format_seconds;
///
/// assert_eq!(format_seconds(1.5), "1.500s");
/// assert_eq!(format_seconds(0.0123), "12.30ms");
/// assert_eq!(format_seconds(0.0000042), "4.2µs");
/// ```
pub fn format_seconds(secs: f64) -> String {
    if secs >= 1.0 {
        format!("{:.3}s", secs)
    } else if secs >= 0.001 {
        format!("{:.2}ms", secs * 1_000.0)
    } else {
        format!("{:.1}µs", secs * 1_000_000.0)
    }
}

/// Format a wall-clock duration rounded to milliseconds
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use threadbench::util::units::format_elapsed;
///
/// assert_eq!(format_elapsed(Duration::from_millis(90_250)), "1m 30s 250ms");
/// ```
pub fn format_elapsed(duration: Duration) -> String {
    let rounded = Duration::from_millis(duration.as_millis() as u64);
    humantime::format_duration(rounded).to_string()
}

/// Calculate workload invocations per second
///
/// # Examples
/// ```
/// use threadbench::util::units::calculate_rate;
///
/// assert!((calculate_rate(16, 0.4) - 40.0).abs() < 1e-9);
/// assert_eq!(calculate_rate(16, 0.0), 0.0);
/// ```
pub fn calculate_rate(invocations: usize, secs: f64) -> f64 {
    if secs <= 0.0 {
        return 0.0;
    }
    invocations as f64 / secs
}

/// Format an invocation rate with appropriate units
///
/// # Examples
/// ```
/// use threadbench::util::units::format_rate;
///
/// assert_eq!(format_rate(40.0), "40.0 ops/s");
/// assert_eq!(format_rate(2500.0), "2.5K ops/s");
/// assert_eq!(format_rate(3_100_000.0), "3.1M ops/s");
/// ```
pub fn format_rate(ops_per_sec: f64) -> String {
    if ops_per_sec >= 1_000_000.0 {
        format!("{:.1}M ops/s", ops_per_sec / 1_000_000.0)
    } else if ops_per_sec >= 1_000.0 {
        format!("{:.1}K ops/s", ops_per_sec / 1_000.0)
    } else {
        format!("{:.1} ops/s", ops_per_sec)
    }
}

/// Format a speedup ratio, e.g. `3.92x`
pub fn format_speedup(ratio: f64) -> String {
    format!("{:.2}x", ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(2.0), "2.000s");
        assert_eq!(format_seconds(0.1), "100.00ms");
        assert_eq!(format_seconds(0.001), "1.00ms");
        assert_eq!(format_seconds(0.0), "0.0µs");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs(5)), "5s");
        assert_eq!(format_elapsed(Duration::from_micros(1_500_700)), "1s 500ms");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0.5), "0.5 ops/s");
        assert_eq!(format_rate(1_000.0), "1.0K ops/s");
    }

    #[test]
    fn test_format_speedup() {
        assert_eq!(format_speedup(1.0), "1.00x");
        assert_eq!(format_speedup(3.917), "3.92x");
    }
}
