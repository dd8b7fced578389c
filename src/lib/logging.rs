//! Logging helpers for formatted output.
//!
//! Consistent formatting of counts, durations and rates, plus a timer used to
//! report how long a sort took.

use std::time::{Duration, Instant};

use crate::sort::SortStats;

/// Formats an integer with thousands separators.
///
/// # Examples
///
/// ```
/// use ivsort_lib::logging::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1234567), "1,234,567");
/// ```
#[must_use]
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Formats a duration in human-readable form.
///
/// Durations under a second are shown in milliseconds.
///
/// # Examples
///
/// ```
/// use ivsort_lib::logging::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
/// assert_eq!(format_duration(Duration::from_secs(45)), "45s");
/// assert_eq!(format_duration(Duration::from_secs(135)), "2m 15s");
/// assert_eq!(format_duration(Duration::from_secs(5400)), "1h 30m");
/// ```
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        format!("{}ms", duration.as_millis())
    } else if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        if remaining_secs == 0 { format!("{mins}m") } else { format!("{mins}m {remaining_secs}s") }
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins == 0 { format!("{hours}h") } else { format!("{hours}h {mins}m") }
    }
}

/// Formats a record rate with appropriate units.
///
/// # Examples
///
/// ```
/// use ivsort_lib::logging::format_rate;
/// use std::time::Duration;
///
/// assert_eq!(format_rate(1000, Duration::from_secs(1)), "1,000 records/s");
/// assert_eq!(format_rate(30, Duration::from_secs(60)), "30.0 records/min");
/// ```
#[must_use]
pub fn format_rate(count: u64, duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 0.001 {
        return format!("{} records/s", format_count(count));
    }

    let rate = count as f64 / secs;
    if rate >= 1.0 {
        format!("{} records/s", format_count(rate as u64))
    } else {
        let per_min = count as f64 / (secs / 60.0);
        format!("{per_min:.1} records/min")
    }
}

/// Logs a summary of a finished sort.
pub fn log_sort_summary(stats: &SortStats) {
    log::info!("=== Summary ===");
    log::info!("Header lines: {}", format_count(stats.header_lines as u64));
    log::info!("Records read: {}", format_count(stats.total_records));
    log::info!("Records written: {}", format_count(stats.output_records));
    if stats.trailer_lines > 0 {
        log::info!("Trailer lines: {}", format_count(stats.trailer_lines));
    }
    if stats.runs_written > 0 {
        log::info!("Spilled runs: {}", stats.runs_written);
    }
    log::info!("Output: {}", stats.output.display());
}

/// Operation timing helper.
///
/// # Examples
///
/// ```no_run
/// use ivsort_lib::logging::OperationTimer;
///
/// let timer = OperationTimer::new("Sorting intervals.bed");
/// // ... do work ...
/// let elapsed = timer.log_completion(10_000);
/// ```
pub struct OperationTimer {
    operation: String,
    start_time: Instant,
}

impl OperationTimer {
    /// Creates a new operation timer and logs the start.
    #[must_use]
    pub fn new(operation: &str) -> Self {
        log::info!("{operation} ...");
        Self { operation: operation.to_string(), start_time: Instant::now() }
    }

    /// Time elapsed since the timer was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Logs the completion with record count and rate, returning the elapsed time.
    pub fn log_completion(&self, count: u64) -> Duration {
        let duration = self.elapsed();
        log::info!(
            "{} completed: {} records in {} ({})",
            self.operation,
            format_count(count),
            format_duration(duration),
            format_rate(count, duration)
        );
        duration
    }
}
