//! Progress tracking for long reads of input files.
//!
//! A [`ProgressTracker`] counts records as they are decoded and logs a line
//! every time the count crosses a multiple of its interval.

use log::info;

/// Default number of records between progress lines.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1_000_000;

/// Counts items and logs at regular intervals.
///
/// # Example
/// ```
/// use ivsort_lib::progress::ProgressTracker;
///
/// let mut tracker = ProgressTracker::new("Read records").with_interval(100);
/// for _ in 0..250 {
///     tracker.record(1); // Logs at 100, 200
/// }
/// tracker.log_final(); // Logs "Read records 250 (complete)"
/// assert_eq!(tracker.count(), 250);
/// ```
#[derive(Debug)]
pub struct ProgressTracker {
    interval: u64,
    message: String,
    count: u64,
}

impl ProgressTracker {
    /// Creates a tracker with the default interval.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { interval: DEFAULT_PROGRESS_INTERVAL, message: message.into(), count: 0 }
    }

    /// Sets the logging interval. An interval of zero is treated as one.
    #[must_use]
    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Adds to the count, logging once per interval boundary crossed.
    ///
    /// Returns `true` if the new count lies exactly on an interval boundary.
    pub fn record(&mut self, additional: u64) -> bool {
        let prev = self.count;
        self.count += additional;

        for milestone in (prev / self.interval + 1)..=(self.count / self.interval) {
            info!("{} {}", self.message, milestone * self.interval);
        }

        self.count > 0 && self.count.is_multiple_of(self.interval)
    }

    /// Logs the final count unless the last boundary already reported it.
    pub fn log_final(&self) {
        if self.count > 0 && !self.count.is_multiple_of(self.interval) {
            info!("{} {} (complete)", self.message, self.count);
        }
    }

    /// The number of items counted so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }
}
