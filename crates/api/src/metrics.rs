use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use pipeline::ResultEntry;

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    rejected_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    empty_requests: AtomicUsize,
    failed_requests: AtomicUsize,

    // Timing (in microseconds), over pipelines that actually ran
    analyses_run: AtomicUsize,
    total_analysis_time_us: AtomicU64,

    // Counts
    total_entries_verified: AtomicUsize,
    zero_score_entries: AtomicUsize,
}

/// How a single analysis request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Rejected,
    Success,
    Empty,
    Failed,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            rejected_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            empty_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            analyses_run: AtomicUsize::new(0),
            total_analysis_time_us: AtomicU64::new(0),
            total_entries_verified: AtomicUsize::new(0),
            zero_score_entries: AtomicUsize::new(0),
        })
    }

    pub fn record_request(&self, outcome: RequestOutcome) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            RequestOutcome::Rejected => &self.rejected_requests,
            RequestOutcome::Success => &self.successful_requests,
            RequestOutcome::Empty => &self.empty_requests,
            RequestOutcome::Failed => &self.failed_requests,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_analysis(&self, duration: Duration, entries: &[ResultEntry]) {
        self.analyses_run.fetch_add(1, Ordering::Relaxed);
        self.total_analysis_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.total_entries_verified
            .fetch_add(entries.len(), Ordering::Relaxed);
        let zero = entries
            .iter()
            .filter(|e| e.verification.confidence_score == 0)
            .count();
        self.zero_score_entries.fetch_add(zero, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let analyzed = self.analyses_run.load(Ordering::Relaxed);

        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            rejected_requests: self.rejected_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            empty_requests: self.empty_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            avg_analysis_time_ms: avg_time_ms(&self.total_analysis_time_us, analyzed),
            total_entries_verified: self.total_entries_verified.load(Ordering::Relaxed),
            zero_score_entries: self.zero_score_entries.load(Ordering::Relaxed),
        }
    }
}

fn avg_time_ms(total_us: &AtomicU64, count: usize) -> f64 {
    let total = total_us.load(Ordering::Relaxed) as f64;
    if count > 0 {
        total / count as f64 / 1000.0 // Convert to ms
    } else {
        0.0
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub rejected_requests: usize,
    pub successful_requests: usize,
    pub empty_requests: usize,
    pub failed_requests: usize,
    pub avg_analysis_time_ms: f64,
    pub total_entries_verified: usize,
    pub zero_score_entries: usize,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extract::ExtractedItem;
    use verify::VerificationOutcome;

    #[test]
    fn test_counts_by_outcome() {
        let metrics = Metrics::new();
        metrics.record_request(RequestOutcome::Rejected);
        metrics.record_request(RequestOutcome::Success);
        metrics.record_request(RequestOutcome::Failed);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 3);
        assert_eq!(snapshot.rejected_requests, 1);
        assert_eq!(snapshot.successful_requests, 1);
        assert_eq!(snapshot.empty_requests, 0);
    }

    #[test]
    fn test_analysis_timing_and_entries() {
        let metrics = Metrics::new();
        let entries = vec![
            ResultEntry::new(
                ExtractedItem::new("a", 1, "d"),
                VerificationOutcome::claim_unavailable(),
            ),
            ResultEntry::new(
                ExtractedItem::new("b", 2, "d"),
                VerificationOutcome {
                    confidence_score: 60,
                    summary: String::new(),
                    notes: String::new(),
                },
            ),
        ];

        metrics.record_request(RequestOutcome::Success);
        metrics.record_analysis(Duration::from_millis(40), &entries);
        metrics.record_request(RequestOutcome::Empty);
        metrics.record_analysis(Duration::from_millis(20), &[]);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_entries_verified, 2);
        assert_eq!(snapshot.zero_score_entries, 1);
        assert!((snapshot.avg_analysis_time_ms - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_unconfigured_failures_excluded_from_average() {
        let metrics = Metrics::new();
        metrics.record_request(RequestOutcome::Failed);
        metrics.record_request(RequestOutcome::Failed);
        metrics.record_request(RequestOutcome::Success);
        metrics.record_analysis(Duration::from_millis(40), &[]);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.failed_requests, 2);
        assert!((snapshot.avg_analysis_time_ms - 40.0).abs() < 1e-9);
    }
}
