use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// `part / whole * 100`, or 0 when nothing has been recorded yet.
pub(crate) fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Aggregate counters kept by a [`crate::RetryPolicy`].
#[derive(Debug, Default)]
pub struct RetryMetrics {
    total_operations: AtomicU64,
    total_retries: AtomicU64,
    successful_retries: AtomicU64,
}

impl RetryMetrics {
    pub(crate) fn record_operation(&self) {
        self.total_operations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.total_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_successful_retry(&self) {
        self.successful_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_operations(&self) -> u64 {
        self.total_operations.load(Ordering::Relaxed)
    }

    /// Failed attempts across all operations.
    pub fn total_retries(&self) -> u64 {
        self.total_retries.load(Ordering::Relaxed)
    }

    /// Operations that succeeded on a later attempt than the first.
    pub fn successful_retries(&self) -> u64 {
        self.successful_retries.load(Ordering::Relaxed)
    }

    pub fn retry_success_rate(&self) -> f64 {
        percentage(self.successful_retries(), self.total_retries())
    }

    pub fn snapshot(&self) -> RetryMetricsSnapshot {
        RetryMetricsSnapshot {
            total_operations: self.total_operations(),
            total_retries: self.total_retries(),
            successful_retries: self.successful_retries(),
            retry_success_rate: self.retry_success_rate(),
            captured_at: Utc::now(),
        }
    }

    pub fn reset(&self) {
        self.total_operations.store(0, Ordering::Relaxed);
        self.total_retries.store(0, Ordering::Relaxed);
        self.successful_retries.store(0, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RetryMetricsSnapshot {
    pub total_operations: u64,
    pub total_retries: u64,
    pub successful_retries: u64,
    pub retry_success_rate: f64,
    pub captured_at: DateTime<Utc>,
}

impl fmt::Display for RetryMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Retry Metrics ===")?;
        writeln!(f, "Total operations: {}", self.total_operations)?;
        writeln!(f, "Total retries: {}", self.total_retries)?;
        writeln!(f, "Successful retries: {}", self.successful_retries)?;
        writeln!(f, "Retry success rate: {:.2}%", self.retry_success_rate)?;
        write!(f, "====================")
    }
}
