pub mod bottleneck;
pub mod density;
pub mod flow;
pub mod spatial;
pub mod visualization;

use common::samples::Sample;

/// Core trait implemented by every analysis over an occupancy series.
///
/// Implementations are pure: the same samples always produce the same
/// output, and degenerate input (empty, single sample, malformed boxes)
/// yields a documented neutral result instead of an error.
pub trait SeriesAnalyzer: Send + Sync {
    type Output;

    /// Get the unique analyzer identifier (e.g., "bottleneck_detector")
    fn id(&self) -> &'static str;

    /// Analyze a time-ordered sample sequence
    fn analyze(&self, samples: &[Sample]) -> Self::Output;
}

/// Arithmetic mean, 0 for an empty slice
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation, 0 for an empty slice
pub(crate) fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean(values);
    let variance = values
        .iter()
        .map(|&x| {
            let diff = x - mean;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

pub(crate) fn occupancies(samples: &[Sample]) -> Vec<f64> {
    samples.iter().map(|s| f64::from(s.occupancy())).collect()
}

/// Format an offset in seconds as `MM:SS`
pub(crate) fn clock_label(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}
