//! Request metrics and periodic summary reporting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector shared across HTTP workers.
pub struct RequestMetrics {
    /// Predictions served successfully
    pub predictions_served: AtomicU64,
    /// Requests rejected by schema validation
    pub validation_rejections: AtomicU64,
    /// Requests that failed inside the classifier
    pub inference_failures: AtomicU64,
    /// Handler latencies (in microseconds)
    latencies: RwLock<Vec<u64>>,
    /// Fraud probability distribution buckets
    probability_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl RequestMetrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            predictions_served: AtomicU64::new(0),
            validation_rejections: AtomicU64::new(0),
            inference_failures: AtomicU64::new(0),
            latencies: RwLock::new(Vec::with_capacity(1000)),
            probability_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a served prediction.
    pub fn record_request(&self, latency: Duration, fraud_probability: f64) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut latencies) = self.latencies.write() {
            latencies.push(latency.as_micros() as u64);
            // Keep only the most recent window
            if latencies.len() > 10_000 {
                latencies.drain(0..5_000);
            }
        }

        let bucket = (fraud_probability * 10.0).min(9.0) as usize;
        if let Ok(mut buckets) = self.probability_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record a request rejected by validation.
    pub fn record_rejected(&self) {
        self.validation_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request that failed inside the classifier.
    pub fn record_failed(&self) {
        self.inference_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get handler latency statistics.
    pub fn latency_stats(&self) -> LatencyStats {
        let latencies = self.latencies.read().unwrap();
        if latencies.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted: Vec<u64> = latencies.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (requests per second).
    pub fn throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.predictions_served.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get the fraud probability distribution.
    pub fn probability_distribution(&self) -> [u64; 10] {
        *self.probability_buckets.read().unwrap()
    }

    /// Log a summary of everything recorded so far.
    pub fn log_summary(&self) {
        let served = self.predictions_served.load(Ordering::Relaxed);
        let rejected = self.validation_rejections.load(Ordering::Relaxed);
        let failed = self.inference_failures.load(Ordering::Relaxed);
        let stats = self.latency_stats();

        info!(
            served,
            rejected,
            failed,
            throughput = format!("{:.1} req/s", self.throughput()),
            mean_us = stats.mean_us,
            p50_us = stats.p50_us,
            p95_us = stats.p95_us,
            p99_us = stats.p99_us,
            max_us = stats.max_us,
            "Request metrics summary"
        );

        let distribution = self.probability_distribution();
        info!(?distribution, "Fraud probability distribution (0.0-1.0 in tenths)");
    }
}

impl Default for RequestMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Handler latency statistics.
#[derive(Debug, Default)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodic reporter that logs metrics summaries.
pub struct MetricsReporter {
    metrics: Arc<RequestMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<RequestMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Log a summary on a fixed interval until the server exits.
    pub async fn run(self) {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.log_summary();
        }
    }
}
