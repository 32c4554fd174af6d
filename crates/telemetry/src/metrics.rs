use lazy_static::lazy_static;
use prometheus::{Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ==== Crowd Analytics Metrics ====
    pub static ref CROWD_ANALYSIS_RUNS: IntCounterVec = {
        let metric = IntCounterVec::new(
            Opts::new(
                "crowd_analysis_runs_total",
                "Total number of completed crowd analyses",
            ),
            &["capacity"],
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    pub static ref CROWD_SAMPLES_ANALYZED: IntCounter = {
        let metric = IntCounter::new(
            "crowd_samples_analyzed_total",
            "Total number of occupancy samples analysed",
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    pub static ref CROWD_BOTTLENECKS_DETECTED: IntCounterVec = {
        let metric = IntCounterVec::new(
            Opts::new(
                "crowd_bottlenecks_detected_total",
                "Total number of bottleneck periods emitted",
            ),
            &["severity"],
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    pub static ref CROWD_DETECTIONS_SKIPPED: IntCounter = {
        let metric = IntCounter::new(
            "crowd_detections_skipped_total",
            "Malformed bounding boxes skipped during zone analysis",
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    pub static ref CROWD_ANALYSIS_DURATION: Histogram = {
        let metric = Histogram::with_opts(
            HistogramOpts::new(
                "crowd_analysis_duration_seconds",
                "Wall time spent assembling one analytics report",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    pub static ref CROWD_CAPACITY_SCORE: Gauge = {
        let metric = Gauge::new(
            "crowd_capacity_score",
            "Composite capacity score (0-100) of the most recent analysis",
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };
}

/// Helper function to encode metrics for Prometheus scraping
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| {
        prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crowd_metrics_accessible() {
        let before = CROWD_BOTTLENECKS_DETECTED
            .with_label_values(&["Critical"])
            .get();
        CROWD_BOTTLENECKS_DETECTED
            .with_label_values(&["Critical"])
            .inc();
        assert_eq!(
            CROWD_BOTTLENECKS_DETECTED
                .with_label_values(&["Critical"])
                .get(),
            before + 1
        );

        CROWD_CAPACITY_SCORE.set(72.5);
        assert_eq!(CROWD_CAPACITY_SCORE.get(), 72.5);
    }

    #[test]
    fn test_encode_metrics_succeeds() {
        CROWD_SAMPLES_ANALYZED.inc();
        let encoded = encode_metrics().expect("metrics should encode");
        assert!(encoded.contains("crowd_samples_analyzed_total"));
    }
}
