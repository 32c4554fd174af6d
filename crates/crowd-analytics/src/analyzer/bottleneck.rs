/// Bottleneck detection: segments the occupancy series into sustained
/// high-load periods and grades each one against the series baseline.
///
/// The detector makes a single forward pass. Samples at or above
/// `baseline * multiplier` open or extend a period; the first sample below
/// the threshold closes it. Periods shorter than the minimum run length are
/// transient spikes and are dropped without trace.
use super::{clock_label, mean, occupancies, SeriesAnalyzer};
use common::samples::Sample;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    /// Grade by peak-to-baseline ratio
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 2.0 {
            Self::Critical
        } else if ratio >= 1.75 {
            Self::High
        } else if ratio >= 1.5 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn score(&self) -> u8 {
        match self {
            Self::Low => 2,
            Self::Moderate => 3,
            Self::High => 4,
            Self::Critical => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckPeriod {
    /// Timestamp of the first congested sample (seconds)
    pub start_time: f64,
    /// Timestamp of the last congested sample (seconds)
    pub end_time: f64,
    pub start_frame: u64,
    pub end_frame: u64,
    /// `MM:SS` rendering of `start_time`
    pub start_label: String,
    pub end_label: String,
    pub duration_seconds: f64,
    pub peak_count: u32,
    pub average_count: f64,
    pub severity: Severity,
    pub severity_score: u8,
    pub frame_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckAnalysis {
    pub bottlenecks_detected: usize,
    pub bottleneck_periods: Vec<BottleneckPeriod>,
    pub total_bottleneck_duration_seconds: f64,
    pub threshold_used: f64,
    /// Mean occupancy over the whole series
    pub baseline: f64,
    pub max_occupancy: u32,
}

impl BottleneckAnalysis {
    fn empty() -> Self {
        Self {
            bottlenecks_detected: 0,
            bottleneck_periods: Vec::new(),
            total_bottleneck_duration_seconds: 0.0,
            threshold_used: 0.0,
            baseline: 0.0,
            max_occupancy: 0,
        }
    }

    /// Most severe period, if any
    pub fn worst_severity(&self) -> Option<Severity> {
        self.bottleneck_periods.iter().map(|p| p.severity).max()
    }
}

/// Accumulator for the period currently being extended
struct OpenPeriod {
    start_time: f64,
    end_time: f64,
    start_frame: u64,
    end_frame: u64,
    peak: u32,
    values: Vec<f64>,
}

impl OpenPeriod {
    fn start(sample: &Sample) -> Self {
        let count = sample.occupancy();
        Self {
            start_time: sample.timestamp_seconds,
            end_time: sample.timestamp_seconds,
            start_frame: sample.frame_index,
            end_frame: sample.frame_index,
            peak: count,
            values: vec![f64::from(count)],
        }
    }

    fn extend(&mut self, sample: &Sample) {
        let count = sample.occupancy();
        self.end_time = sample.timestamp_seconds;
        self.end_frame = sample.frame_index;
        self.peak = self.peak.max(count);
        self.values.push(f64::from(count));
    }

    fn frame_count(&self) -> usize {
        self.values.len()
    }

    fn into_period(self, baseline: f64) -> BottleneckPeriod {
        let ratio = if baseline > 0.0 {
            f64::from(self.peak) / baseline
        } else {
            1.0
        };
        let severity = Severity::from_ratio(ratio);

        BottleneckPeriod {
            start_time: self.start_time,
            end_time: self.end_time,
            start_frame: self.start_frame,
            end_frame: self.end_frame,
            start_label: clock_label(self.start_time),
            end_label: clock_label(self.end_time),
            duration_seconds: self.end_time - self.start_time,
            peak_count: self.peak,
            average_count: mean(&self.values),
            severity,
            severity_score: severity.score(),
            frame_count: self.values.len(),
        }
    }
}

pub struct BottleneckDetector {
    threshold_multiplier: f64,
    min_duration: usize,
}

impl BottleneckDetector {
    /// `min_duration` is in frames; the engine config guarantees it is at least 1
    pub fn new(threshold_multiplier: f64, min_duration: usize) -> Self {
        Self {
            threshold_multiplier,
            min_duration,
        }
    }

    /// Emit the period if it lasted long enough, otherwise drop it
    fn close(&self, open: OpenPeriod, baseline: f64, periods: &mut Vec<BottleneckPeriod>) {
        if open.frame_count() >= self.min_duration {
            periods.push(open.into_period(baseline));
        }
    }
}

impl Default for BottleneckDetector {
    fn default() -> Self {
        Self::new(1.5, 3)
    }
}

impl SeriesAnalyzer for BottleneckDetector {
    type Output = BottleneckAnalysis;

    fn id(&self) -> &'static str {
        "bottleneck_detector"
    }

    fn analyze(&self, samples: &[Sample]) -> BottleneckAnalysis {
        if samples.is_empty() {
            return BottleneckAnalysis::empty();
        }

        let baseline = mean(&occupancies(samples));
        let threshold = baseline * self.threshold_multiplier;
        let max_occupancy = samples.iter().map(Sample::occupancy).max().unwrap_or(0);

        let mut periods = Vec::new();
        let mut open: Option<OpenPeriod> = None;

        for sample in samples {
            if f64::from(sample.occupancy()) >= threshold {
                match open.as_mut() {
                    Some(period) => period.extend(sample),
                    None => open = Some(OpenPeriod::start(sample)),
                }
            } else if let Some(period) = open.take() {
                self.close(period, baseline, &mut periods);
            }
        }

        if let Some(period) = open.take() {
            self.close(period, baseline, &mut periods);
        }

        let total_duration = periods.iter().map(|p| p.duration_seconds).sum();

        tracing::debug!(
            baseline,
            threshold,
            periods = periods.len(),
            "bottleneck segmentation complete"
        );

        BottleneckAnalysis {
            bottlenecks_detected: periods.len(),
            bottleneck_periods: periods,
            total_bottleneck_duration_seconds: total_duration,
            threshold_used: threshold,
            baseline,
            max_occupancy,
        }
    }
}
