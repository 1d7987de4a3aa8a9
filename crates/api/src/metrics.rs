use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Process-wide request counters and per-stage timing totals. Observability
/// only; nothing here feeds back into pipeline behavior.
pub struct Metrics {
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,
    rejected_non_food: AtomicUsize,
    fallback_searches: AtomicUsize,
    empty_results: AtomicUsize,

    total_refine_time_us: AtomicU64,
    total_search_time_us: AtomicU64,
    total_enrich_time_us: AtomicU64,
    total_analyze_time_us: AtomicU64,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            rejected_non_food: AtomicUsize::new(0),
            fallback_searches: AtomicUsize::new(0),
            empty_results: AtomicUsize::new(0),
            total_refine_time_us: AtomicU64::new(0),
            total_search_time_us: AtomicU64::new(0),
            total_enrich_time_us: AtomicU64::new(0),
            total_analyze_time_us: AtomicU64::new(0),
        })
    }

    pub fn record_request(&self, success: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_rejection(&self) {
        self.rejected_non_food.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback_search(&self) {
        self.fallback_searches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_empty_result(&self) {
        self.empty_results.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_refine(&self, duration: Duration) {
        self.total_refine_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_search(&self, duration: Duration) {
        self.total_search_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_enrich(&self, duration: Duration) {
        self.total_enrich_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_analyze(&self, duration: Duration) {
        self.total_analyze_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let total = self.total_requests.load(Ordering::Relaxed);
        MetricsSnapshot {
            total_requests: total,
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            rejected_non_food: self.rejected_non_food.load(Ordering::Relaxed),
            fallback_searches: self.fallback_searches.load(Ordering::Relaxed),
            empty_results: self.empty_results.load(Ordering::Relaxed),
            avg_refine_time_ms: avg_ms(&self.total_refine_time_us, total),
            avg_search_time_ms: avg_ms(&self.total_search_time_us, total),
            avg_enrich_time_ms: avg_ms(&self.total_enrich_time_us, total),
            avg_analyze_time_ms: avg_ms(&self.total_analyze_time_us, total),
        }
    }
}

fn avg_ms(total_us: &AtomicU64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    total_us.load(Ordering::Relaxed) as f64 / count as f64 / 1000.0
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub rejected_non_food: usize,
    pub fallback_searches: usize,
    pub empty_results: usize,
    pub avg_refine_time_ms: f64,
    pub avg_search_time_ms: f64,
    pub avg_enrich_time_ms: f64,
    pub avg_analyze_time_ms: f64,
}
