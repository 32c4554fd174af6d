/// Flow metrics: direction of change and variability of the occupancy series
use super::{mean, occupancies, population_std, SeriesAnalyzer};
use common::samples::Sample;
use serde::{Deserialize, Serialize};

const TREND_THRESHOLD: f64 = 0.5;
const HIGH_VARIABILITY_CV: f64 = 40.0;
const MODERATE_VARIABILITY_CV: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Trend {
    Increasing,
    Decreasing,
    #[default]
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Variability {
    High,
    Moderate,
    #[default]
    Low,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowMetrics {
    /// Mean change in occupancy between consecutive samples
    pub flow_rate: f64,
    pub trend: Trend,
    pub variability: Variability,
    /// Standard deviation as a percentage of the mean
    pub coefficient_of_variation: f64,
    pub average_count: f64,
    pub std_deviation: f64,
}

#[derive(Debug, Default)]
pub struct FlowAnalyzer;

impl FlowAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl SeriesAnalyzer for FlowAnalyzer {
    type Output = FlowMetrics;

    fn id(&self) -> &'static str {
        "flow_analyzer"
    }

    fn analyze(&self, samples: &[Sample]) -> FlowMetrics {
        if samples.len() < 2 {
            return FlowMetrics::default();
        }

        let counts = occupancies(samples);
        let changes: Vec<f64> = counts.windows(2).map(|w| w[1] - w[0]).collect();
        let flow_rate = mean(&changes);

        let trend = if flow_rate > TREND_THRESHOLD {
            Trend::Increasing
        } else if flow_rate < -TREND_THRESHOLD {
            Trend::Decreasing
        } else {
            Trend::Stable
        };

        let average_count = mean(&counts);
        let std_deviation = population_std(&counts);
        let coefficient_of_variation = if average_count > 0.0 {
            std_deviation / average_count * 100.0
        } else {
            0.0
        };

        let variability = if coefficient_of_variation > HIGH_VARIABILITY_CV {
            Variability::High
        } else if coefficient_of_variation > MODERATE_VARIABILITY_CV {
            Variability::Moderate
        } else {
            Variability::Low
        };

        FlowMetrics {
            flow_rate,
            trend,
            variability,
            coefficient_of_variation,
            average_count,
            std_deviation,
        }
    }
}
