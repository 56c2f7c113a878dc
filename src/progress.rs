// src/progress.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Progress notification after each flush

use std::time::Duration;

/// Snapshot handed to an observer right after a successful flush
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressEvent {
    /// Cumulative records written since the writer was opened
    pub written: u64,
    /// Time since the writer was opened
    pub elapsed: Duration,
}

impl ProgressEvent {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Throughput so far, 0.0 before any time has passed
    pub fn records_per_sec(&self) -> f64 {
        let secs = self.elapsed_secs();
        if secs > 0.0 {
            self.written as f64 / secs
        } else {
            0.0
        }
    }
}

/// Receives a [`ProgressEvent`] synchronously, inside the flushing call
pub trait ProgressObserver {
    fn on_flush(&mut self, event: ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: FnMut(ProgressEvent),
{
    fn on_flush(&mut self, event: ProgressEvent) {
        self(event)
    }
}

/// Observer that reports each flush through `tracing`
#[derive(Debug, Clone, Default)]
pub struct LogProgress {
    expected_total: Option<u64>,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report percent complete against `total` records
    pub fn with_total(total: u64) -> Self {
        Self {
            expected_total: Some(total),
        }
    }

    fn percent(&self, written: u64) -> Option<f64> {
        match self.expected_total {
            Some(0) | None => None,
            Some(total) => Some(written as f64 / total as f64 * 100.0),
        }
    }
}

impl ProgressObserver for LogProgress {
    fn on_flush(&mut self, event: ProgressEvent) {
        match self.percent(event.written) {
            Some(percent) => tracing::info!(
                "Progress: {:.2}% ({}/{}) {:.0} records/s",
                percent,
                event.written,
                self.expected_total.unwrap_or_default(),
                event.records_per_sec()
            ),
            None => tracing::info!(
                "Progress: {} records written, {:.0} records/s",
                event.written,
                event.records_per_sec()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_zero_without_elapsed_time() {
        let event = ProgressEvent {
            written: 500,
            elapsed: Duration::ZERO,
        };
        assert_eq!(event.records_per_sec(), 0.0);
    }

    #[test]
    fn rate_divides_by_elapsed() {
        let event = ProgressEvent {
            written: 20_000,
            elapsed: Duration::from_millis(500),
        };
        assert!((event.records_per_sec() - 40_000.0).abs() < 1e-6);
        assert!((event.elapsed_secs() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn closures_observe() {
        let mut seen = Vec::new();
        {
            let mut observer = |e: ProgressEvent| seen.push(e.written);
            observer.on_flush(ProgressEvent {
                written: 1,
                elapsed: Duration::ZERO,
            });
            observer.on_flush(ProgressEvent {
                written: 2,
                elapsed: Duration::ZERO,
            });
        }
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn log_progress_percent() {
        assert_eq!(LogProgress::new().percent(10), None);
        assert_eq!(LogProgress::with_total(0).percent(10), None);
        assert_eq!(LogProgress::with_total(200).percent(50), Some(25.0));
    }
}
