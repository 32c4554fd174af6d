/// Chart-ready time bucketing of the occupancy series
use super::{clock_label, mean, occupancies, population_std, SeriesAnalyzer};
use common::samples::Sample;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBucket {
    /// `MM:SS` label of the bucket start
    pub time: String,
    /// Bucket start in seconds, aligned to the interval
    pub timestamp: f64,
    pub average: f64,
    pub min: u32,
    pub max: u32,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub overall_average: f64,
    pub overall_min: u32,
    pub overall_max: u32,
    pub std_deviation: f64,
    pub total_samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationData {
    pub chart_data: Vec<ChartBucket>,
    pub interval_seconds: f64,
    pub total_intervals: usize,
    pub summary: SeriesSummary,
}

/// Running statistics for the bucket being filled
struct OpenBucket {
    start: f64,
    counts: Vec<u32>,
}

impl OpenBucket {
    fn new(start: f64) -> Self {
        Self {
            start,
            counts: Vec::new(),
        }
    }

    fn finish(self) -> Option<ChartBucket> {
        let min = *self.counts.iter().min()?;
        let max = *self.counts.iter().max()?;
        let values: Vec<f64> = self.counts.iter().map(|&c| f64::from(c)).collect();

        Some(ChartBucket {
            time: clock_label(self.start),
            timestamp: self.start,
            average: mean(&values),
            min,
            max,
            samples: self.counts.len(),
        })
    }
}

pub struct VisualizationAggregator {
    interval_seconds: f64,
}

impl VisualizationAggregator {
    /// `interval_seconds` must be positive; the engine config validates it
    pub fn new(interval_seconds: f64) -> Self {
        Self { interval_seconds }
    }

    fn align(&self, timestamp: f64) -> f64 {
        (timestamp / self.interval_seconds).floor() * self.interval_seconds
    }
}

impl Default for VisualizationAggregator {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl SeriesAnalyzer for VisualizationAggregator {
    type Output = VisualizationData;

    fn id(&self) -> &'static str {
        "visualization_aggregator"
    }

    fn analyze(&self, samples: &[Sample]) -> VisualizationData {
        let mut chart_data = Vec::new();
        let mut open: Option<OpenBucket> = None;

        for sample in samples {
            let timestamp = sample.timestamp_seconds;
            let rolls_over = match &open {
                Some(bucket) => timestamp >= bucket.start + self.interval_seconds,
                None => true,
            };

            if rolls_over {
                if let Some(done) = open.take().and_then(OpenBucket::finish) {
                    chart_data.push(done);
                }
                open = Some(OpenBucket::new(self.align(timestamp)));
            }

            if let Some(bucket) = open.as_mut() {
                bucket.counts.push(sample.occupancy());
            }
        }

        // the trailing partial bucket is always kept
        if let Some(done) = open.and_then(OpenBucket::finish) {
            chart_data.push(done);
        }

        let counts = occupancies(samples);
        let summary = if samples.is_empty() {
            SeriesSummary::default()
        } else {
            SeriesSummary {
                overall_average: mean(&counts),
                overall_min: samples.iter().map(Sample::occupancy).min().unwrap_or(0),
                overall_max: samples.iter().map(Sample::occupancy).max().unwrap_or(0),
                std_deviation: population_std(&counts),
                total_samples: samples.len(),
            }
        };

        VisualizationData {
            total_intervals: chart_data.len(),
            chart_data,
            interval_seconds: self.interval_seconds,
            summary,
        }
    }
}
