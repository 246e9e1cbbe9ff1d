//! Locale loading metrics.
//!
//! Counts what happened to every dictionary request: applied, dropped as
//! stale, or failed. One instance is shared between a loader and its session.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct LocaleMetrics {
    /// Number of dictionary requests issued (tickets handed out)
    requests: AtomicUsize,

    /// Number of dictionaries written to the page
    applied: AtomicUsize,

    /// Number of responses discarded because a newer request was issued
    stale_dropped: AtomicUsize,

    /// Number of requests that ended in `Unavailable` or `Malformed`
    failures: AtomicUsize,
}

impl LocaleMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_applied(&self) {
        self.applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale(&self) {
        self.stale_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn applied(&self) -> usize {
        self.applied.load(Ordering::Relaxed)
    }

    pub fn stale_dropped(&self) -> usize {
        self.stale_dropped.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let requests = self.requests();
        let applied = self.applied();
        let apply_rate = if requests > 0 {
            (applied as f64 / requests as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            requests,
            applied,
            stale_dropped: self.stale_dropped(),
            failures: self.failures(),
            apply_rate,
        }
    }
}

/// Point-in-time snapshot of [`LocaleMetrics`].
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub requests: usize,
    pub applied: usize,
    pub stale_dropped: usize,
    pub failures: usize,
    /// Applied / requests, in percent
    pub apply_rate: f64,
}

impl MetricsReport {
    /// Format as a single log line
    pub fn format_log(&self) -> String {
        format!(
            "Locale metrics: {} requests, {} applied ({:.1}%), {} stale, {} failed",
            self.requests, self.applied, self.apply_rate, self.stale_dropped, self.failures
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics_are_zero() {
        let metrics = LocaleMetrics::new();
        let report = metrics.report();

        assert_eq!(report.requests, 0);
        assert_eq!(report.applied, 0);
        assert_eq!(report.apply_rate, 0.0);
    }

    #[test]
    fn test_counters() {
        let metrics = LocaleMetrics::new();
        for _ in 0..4 {
            metrics.record_request();
        }
        metrics.record_applied();
        metrics.record_stale();
        metrics.record_stale();
        metrics.record_failure();

        let report = metrics.report();
        assert_eq!(report.requests, 4);
        assert_eq!(report.applied, 1);
        assert_eq!(report.stale_dropped, 2);
        assert_eq!(report.failures, 1);
        assert!((report.apply_rate - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_format_log() {
        let metrics = LocaleMetrics::new();
        metrics.record_request();
        metrics.record_applied();

        let line = metrics.report().format_log();
        assert!(line.contains("1 requests"));
        assert!(line.contains("100.0%"));
    }

    #[test]
    fn test_report_serializes() {
        let json = serde_json::to_value(LocaleMetrics::new().report()).expect("serialize");
        assert_eq!(json["stale_dropped"], 0);
    }
}
