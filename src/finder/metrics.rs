use crate::retry::metrics::percentage;
use crate::retry::RetryMetricsSnapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters kept by an [`crate::ElementResolver`].
#[derive(Debug, Default)]
pub struct FallbackMetrics {
    total_element_finds: AtomicU64,
    fallback_success_count: AtomicU64,
}

impl FallbackMetrics {
    pub(crate) fn record_find(&self) {
        self.total_element_finds.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fallback_success(&self) {
        self.fallback_success_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_element_finds(&self) -> u64 {
        self.total_element_finds.load(Ordering::Relaxed)
    }

    pub fn fallback_success_count(&self) -> u64 {
        self.fallback_success_count.load(Ordering::Relaxed)
    }

    pub fn fallback_success_rate(&self) -> f64 {
        percentage(self.fallback_success_count(), self.total_element_finds())
    }

    pub fn snapshot(&self) -> FallbackMetricsSnapshot {
        FallbackMetricsSnapshot {
            total_element_finds: self.total_element_finds(),
            fallback_success_count: self.fallback_success_count(),
            fallback_success_rate: self.fallback_success_rate(),
            captured_at: Utc::now(),
        }
    }

    pub fn reset(&self) {
        self.total_element_finds.store(0, Ordering::Relaxed);
        self.fallback_success_count.store(0, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FallbackMetricsSnapshot {
    pub total_element_finds: u64,
    pub fallback_success_count: u64,
    pub fallback_success_rate: f64,
    pub captured_at: DateTime<Utc>,
}

impl fmt::Display for FallbackMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Fallback Strategy Metrics ===")?;
        writeln!(f, "Total element finds: {}", self.total_element_finds)?;
        writeln!(f, "Fallback strategy successes: {}", self.fallback_success_count)?;
        writeln!(f, "Fallback success rate: {:.2}%", self.fallback_success_rate)?;
        write!(f, "==================================")
    }
}

/// Retry and fallback metrics of one resolver, taken together.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub retry: RetryMetricsSnapshot,
    pub fallback: FallbackMetricsSnapshot,
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.retry)?;
        write!(f, "{}", self.fallback)
    }
}
