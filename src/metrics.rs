//! Performance metrics and statistics tracking for the scoring service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for scoring performance
pub struct ScoringMetrics {
    /// Total requests scored
    pub transactions_scored: AtomicU64,
    /// Requests predicted fraudulent
    pub fraud_predictions: AtomicU64,
    /// Scored requests by risk tier
    scored_by_level: RwLock<HashMap<String, u64>>,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Confidence distribution buckets
    confidence_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ScoringMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            transactions_scored: AtomicU64::new(0),
            fraud_predictions: AtomicU64::new(0),
            scored_by_level: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            confidence_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record one scored request
    pub fn record_score(
        &self,
        processing_time: Duration,
        confidence: f64,
        is_fraud: bool,
        risk_level: &str,
    ) {
        self.transactions_scored.fetch_add(1, Ordering::Relaxed);
        if is_fraud {
            self.fraud_predictions.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only last 10000 for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (confidence * 10.0).min(9.0) as usize;
        if let Ok(mut buckets) = self.confidence_buckets.write() {
            buckets[bucket] += 1;
        }

        if let Ok(mut by_level) = self.scored_by_level.write() {
            *by_level.entry(risk_level.to_string()).or_insert(0) += 1;
        }
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = self.processing_times.read().unwrap();
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (requests per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.transactions_scored.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get confidence distribution
    pub fn get_confidence_distribution(&self) -> [u64; 10] {
        *self.confidence_buckets.read().unwrap()
    }

    /// Get scored requests by risk tier
    pub fn get_scored_by_level(&self) -> HashMap<String, u64> {
        self.scored_by_level.read().unwrap().clone()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let scored = self.transactions_scored.load(Ordering::Relaxed);
        let fraud = self.fraud_predictions.load(Ordering::Relaxed);
        let fraud_share = if scored > 0 {
            (fraud as f64 / scored as f64) * 100.0
        } else {
            0.0
        };

        let processing = self.get_processing_stats();
        let throughput = self.get_throughput();
        let by_level = self.get_scored_by_level();
        let confidence_dist = self.get_confidence_distribution();

        info!("==================== SCORING METRICS SUMMARY ====================");
        info!(
            "Requests scored: {} | throughput: {:.1} req/s | flagged fraudulent: {} ({:.1}%)",
            scored, throughput, fraud, fraud_share
        );
        info!(
            "Processing time (us): mean={} p50={} p95={} p99={} max={}",
            processing.mean_us, processing.p50_us, processing.p95_us, processing.p99_us,
            processing.max_us
        );
        info!("Scored by risk tier:");
        for (level, count) in &by_level {
            let pct = if scored > 0 {
                (*count as f64 / scored as f64) * 100.0
            } else {
                0.0
            };
            info!("  {:8}: {:>6} ({:>5.1}%)", level, count, pct);
        }
        info!("Confidence distribution:");
        let total: u64 = confidence_dist.iter().sum();
        for (i, &count) in confidence_dist.iter().enumerate() {
            let pct = if total > 0 {
                (count as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            info!(
                "  {:.1}-{:.1}: {:>6} ({:>5.1}%)",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct
            );
        }
        info!("=================================================================");
    }
}

impl Default for ScoringMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Real-time metrics reporter that prints periodic summaries
pub struct MetricsReporter {
    metrics: std::sync::Arc<ScoringMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<ScoringMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = ScoringMetrics::new();

        metrics.record_score(Duration::from_micros(100), 0.55, false, "Medium");
        metrics.record_score(Duration::from_micros(200), 0.92, true, "High");

        assert_eq!(metrics.transactions_scored.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.fraud_predictions.load(Ordering::Relaxed), 1);

        let by_level = metrics.get_scored_by_level();
        assert_eq!(by_level.get("High"), Some(&1));
        assert_eq!(by_level.get("Medium"), Some(&1));
    }

    #[test]
    fn test_confidence_buckets() {
        let metrics = ScoringMetrics::new();

        metrics.record_score(Duration::from_micros(50), 0.05, false, "Low");
        metrics.record_score(Duration::from_micros(50), 0.95, true, "High");
        metrics.record_score(Duration::from_micros(50), 1.0, true, "High");

        let dist = metrics.get_confidence_distribution();
        assert_eq!(dist[0], 1);
        assert_eq!(dist[9], 2);
    }

    #[test]
    fn test_processing_stats() {
        let metrics = ScoringMetrics::new();
        for us in [100u64, 200, 300, 400] {
            metrics.record_score(Duration::from_micros(us), 0.5, false, "Medium");
        }

        let stats = metrics.get_processing_stats();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean_us, 250);
        assert_eq!(stats.max_us, 400);
    }
}
