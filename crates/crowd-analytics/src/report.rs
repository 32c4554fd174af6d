//! Report assembly: runs every analyzer over one occupancy series and, when
//! a resource snapshot is supplied, the capacity planner.

use crate::analyzer::bottleneck::{BottleneckAnalysis, BottleneckDetector};
use crate::analyzer::density::{CrowdDensity, DensityClassifier};
use crate::analyzer::flow::{FlowAnalyzer, FlowMetrics};
use crate::analyzer::spatial::{SpatialDistribution, SpatialZoneAnalyzer};
use crate::analyzer::visualization::{VisualizationAggregator, VisualizationData};
use crate::analyzer::SeriesAnalyzer;
use crate::capacity::{CapacityInputs, CapacityPlanner, CapacityReport};
use crate::config::EngineConfig;
use crate::error::ConfigError;
use common::resources::ResourceState;
use common::samples::{is_time_ordered, FrameGeometry, Sample};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::time::Instant;
use tracing::{info, warn};

/// Per-call inputs that accompany the sample series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisContext {
    #[serde(default)]
    pub frame: FrameGeometry,
    /// Length of the source recording; the sample time span is used when absent
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub resources: Option<ResourceState>,
}

impl AnalysisContext {
    pub fn new(frame: FrameGeometry) -> Self {
        Self {
            frame,
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    pub fn with_resources(mut self, resources: ResourceState) -> Self {
        self.resources = Some(resources);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    /// Density at the average occupancy, truncated to whole people
    pub crowd_density: CrowdDensity,
    pub peak_density: CrowdDensity,
    /// Samples at or above the high-density person count
    pub high_density_frames: usize,
    pub spatial_distribution: SpatialDistribution,
    pub bottleneck_analysis: BottleneckAnalysis,
    pub visualization_data: VisualizationData,
    pub flow_metrics: FlowMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<CapacityReport>,
    pub sample_count: usize,
    pub duration_seconds: f64,
}

impl AnalyticsReport {
    pub fn average_occupancy(&self) -> f64 {
        self.bottleneck_analysis.baseline
    }

    pub fn peak_occupancy(&self) -> u32 {
        self.bottleneck_analysis.max_occupancy
    }
}

/// Stateless analytics engine; one instance can serve any number of calls
#[derive(Debug, Clone)]
pub struct CrowdAnalyticsEngine {
    config: EngineConfig,
}

impl CrowdAnalyticsEngine {
    /// Validates the configuration up front so that analysis itself never fails
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn analyze(&self, samples: &[Sample], context: &AnalysisContext) -> AnalyticsReport {
        let span = tracing::info_span!("crowd_analysis", samples = samples.len());
        let _enter = span.enter();
        let start = Instant::now();

        let samples = ordered(samples);
        let samples = samples.as_ref();

        let area = context
            .resources
            .as_ref()
            .map_or(self.config.default_area_sqm, |r| {
                r.area_or(self.config.default_area_sqm)
            });

        let bottleneck_analysis = BottleneckDetector::new(
            self.config.bottleneck_threshold_multiplier,
            self.config.min_bottleneck_duration,
        )
        .analyze(samples);
        let flow_metrics = FlowAnalyzer::new().analyze(samples);
        let visualization_data =
            VisualizationAggregator::new(self.config.visualization_interval_seconds).analyze(samples);
        let spatial_distribution = SpatialZoneAnalyzer::new(context.frame).analyze(samples);

        let average = bottleneck_analysis.baseline;
        let peak = bottleneck_analysis.max_occupancy;
        let classifier = DensityClassifier::new(area);
        let crowd_density = classifier.classify(average.trunc() as u32);
        let peak_density = classifier.classify(peak);
        let high_density_frames = samples
            .iter()
            .filter(|s| s.occupancy() >= self.config.high_density_threshold)
            .count();

        let duration_seconds = context
            .duration_seconds
            .filter(|d| d.is_finite() && *d >= 0.0)
            .unwrap_or_else(|| time_span(samples));

        let capacity = context.resources.as_ref().map(|resources| {
            let inputs = CapacityInputs {
                average_occupancy: average,
                peak_occupancy: peak,
                duration_minutes: duration_seconds / 60.0,
            };
            CapacityPlanner::new(&self.config).plan(&inputs, resources)
        });

        record_metrics(&bottleneck_analysis, &spatial_distribution, capacity.as_ref(), samples.len());
        telemetry::metrics::CROWD_ANALYSIS_DURATION.observe(start.elapsed().as_secs_f64());

        info!(
            samples = samples.len(),
            average_occupancy = average,
            peak_occupancy = peak,
            density = %crowd_density.density_level,
            bottlenecks = bottleneck_analysis.bottlenecks_detected,
            capacity_score = capacity.as_ref().map(|c| c.capacity_score),
            "crowd analysis complete"
        );

        AnalyticsReport {
            crowd_density,
            peak_density,
            high_density_frames,
            spatial_distribution,
            bottleneck_analysis,
            visualization_data,
            flow_metrics,
            capacity,
            sample_count: samples.len(),
            duration_seconds,
        }
    }
}

/// Borrow the input when already ordered, otherwise a stable sort by timestamp
fn ordered(samples: &[Sample]) -> Cow<'_, [Sample]> {
    if is_time_ordered(samples) {
        return Cow::Borrowed(samples);
    }

    warn!(
        samples = samples.len(),
        "samples out of timestamp order, re-sorting"
    );
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.timestamp_seconds.total_cmp(&b.timestamp_seconds));
    Cow::Owned(sorted)
}

fn time_span(samples: &[Sample]) -> f64 {
    match (samples.first(), samples.last()) {
        (Some(first), Some(last)) => (last.timestamp_seconds - first.timestamp_seconds).max(0.0),
        _ => 0.0,
    }
}

fn record_metrics(
    bottlenecks: &BottleneckAnalysis,
    spatial: &SpatialDistribution,
    capacity: Option<&CapacityReport>,
    sample_count: usize,
) {
    use telemetry::metrics::{
        CROWD_ANALYSIS_RUNS, CROWD_BOTTLENECKS_DETECTED, CROWD_CAPACITY_SCORE,
        CROWD_DETECTIONS_SKIPPED, CROWD_SAMPLES_ANALYZED,
    };

    let mode = if capacity.is_some() { "with_capacity" } else { "crowd_only" };
    CROWD_ANALYSIS_RUNS.with_label_values(&[mode]).inc();
    CROWD_SAMPLES_ANALYZED.inc_by(sample_count as u64);
    CROWD_DETECTIONS_SKIPPED.inc_by(spatial.skipped_detections);

    for period in &bottlenecks.bottleneck_periods {
        CROWD_BOTTLENECKS_DETECTED
            .with_label_values(&[period.severity.as_str()])
            .inc();
    }

    if let Some(report) = capacity {
        CROWD_CAPACITY_SCORE.set(report.capacity_score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::density::DensityLevel;
    use crate::analyzer::flow::Trend;
    use common::samples::BoundingBox;

    fn series(counts: &[i64]) -> Vec<Sample> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &c)| Sample::new(i as u64 * 30, i as f64, c))
            .collect()
    }

    #[test]
    fn test_engine_rejects_invalid_config() {
        let config = EngineConfig {
            min_bottleneck_duration: 0,
            ..EngineConfig::default()
        };
        assert!(CrowdAnalyticsEngine::new(config).is_err());
    }

    #[test]
    fn test_crowd_only_report() {
        let engine = CrowdAnalyticsEngine::new(EngineConfig::default()).unwrap();
        let report = engine.analyze(&series(&[10, 12, 14, 16, 18, 20]), &AnalysisContext::default());

        assert_eq!(report.sample_count, 6);
        assert_eq!(report.duration_seconds, 5.0);
        assert!(report.capacity.is_none());
        assert_eq!(report.crowd_density.person_count, 15);
        assert_eq!(report.peak_density.person_count, 20);
        assert_eq!(report.peak_density.density_level, DensityLevel::Moderate);
        assert_eq!(report.high_density_frames, 3);
        assert_eq!(report.flow_metrics.trend, Trend::Increasing);
        assert!(!report.spatial_distribution.has_data());
    }

    #[test]
    fn test_average_density_truncates() {
        let engine = CrowdAnalyticsEngine::new(EngineConfig::default()).unwrap();
        // mean 9.5
        let report = engine.analyze(&series(&[9, 10]), &AnalysisContext::default());
        assert_eq!(report.crowd_density.person_count, 9);
        assert_eq!(report.average_occupancy(), 9.5);
    }

    #[test]
    fn test_unordered_input_is_resorted() {
        let engine = CrowdAnalyticsEngine::new(EngineConfig::default()).unwrap();
        let ordered = series(&[1, 1, 9, 9, 9, 1, 1]);
        let mut shuffled = ordered.clone();
        shuffled.swap(0, 6);
        shuffled.swap(2, 4);

        let context = AnalysisContext::default();
        assert_eq!(engine.analyze(&shuffled, &context), engine.analyze(&ordered, &context));
    }

    #[test]
    fn test_context_duration_overrides_span() {
        let engine = CrowdAnalyticsEngine::new(EngineConfig::default()).unwrap();
        let context = AnalysisContext::default().with_duration(1200.0);
        let report = engine.analyze(&series(&[3, 4]), &context);
        assert_eq!(report.duration_seconds, 1200.0);

        let bogus = AnalysisContext::default().with_duration(f64::NAN);
        assert_eq!(engine.analyze(&series(&[3, 4]), &bogus).duration_seconds, 1.0);
    }

    #[test]
    fn test_spatial_analysis_uses_context_frame() {
        let engine = CrowdAnalyticsEngine::new(EngineConfig::default()).unwrap();
        let samples = vec![Sample::new(0, 0.0, 2).with_detections(vec![
            BoundingBox::new(10.0, 10.0, 50.0, 50.0, 0.9),
            BoundingBox::new(50.0, 50.0, 10.0, 10.0, 0.9),
        ])];

        let report = engine.analyze(&samples, &AnalysisContext::new(FrameGeometry::new(300, 300)));
        assert_eq!(report.spatial_distribution.total_detections_analyzed, 1);
        assert_eq!(report.spatial_distribution.skipped_detections, 1);
    }

    #[test]
    fn test_empty_series_is_neutral() {
        let engine = CrowdAnalyticsEngine::new(EngineConfig::default()).unwrap();
        let report = engine.analyze(&[], &AnalysisContext::default());
        assert_eq!(report.sample_count, 0);
        assert_eq!(report.duration_seconds, 0.0);
        assert_eq!(report.bottleneck_analysis.bottlenecks_detected, 0);
        assert!(report.visualization_data.chart_data.is_empty());
        assert_eq!(report.crowd_density.density_level, DensityLevel::VeryLow);
    }
}
