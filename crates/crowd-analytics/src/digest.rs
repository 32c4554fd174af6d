//! Read-only view over stored reports for downstream summarizers.
//!
//! A digest holds the headline facts of one analysis so a consumer can
//! describe it without walking the full report.

use crate::analyzer::bottleneck::Severity;
use crate::analyzer::density::DensityLevel;
use crate::analyzer::flow::{Trend, Variability};
use crate::analyzer::spatial::DistributionPattern;
use crate::capacity::{Alert, CapacityStatus};
use crate::error::StoreError;
use crate::report::AnalyticsReport;
use crate::store::{AnalysisId, MemoryReportStore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityDigest {
    pub location: String,
    pub status: CapacityStatus,
    pub score: f64,
    pub additional_nurses_needed: u32,
    pub additional_beds_needed: u32,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDigest {
    pub sample_count: usize,
    pub duration_seconds: f64,
    pub average_occupancy: f64,
    pub peak_occupancy: u32,
    pub density_level: DensityLevel,
    pub peak_density_level: DensityLevel,
    pub bottleneck_count: usize,
    pub worst_severity: Option<Severity>,
    pub trend: Trend,
    pub variability: Variability,
    pub distribution_pattern: DistributionPattern,
    /// Hotspot positions, most crowded first
    pub hotspot_positions: Vec<String>,
    pub capacity: Option<CapacityDigest>,
}

impl ReportDigest {
    pub fn from_report(report: &AnalyticsReport) -> Self {
        let capacity = report.capacity.as_ref().map(|c| CapacityDigest {
            location: c.location.clone(),
            status: c.overall_status,
            score: c.capacity_score,
            additional_nurses_needed: c.staffing_analysis.additional_nurses_needed,
            additional_beds_needed: c.bed_analysis.additional_capacity_needed,
            alerts: c.critical_alerts.clone(),
        });

        Self {
            sample_count: report.sample_count,
            duration_seconds: report.duration_seconds,
            average_occupancy: report.average_occupancy(),
            peak_occupancy: report.peak_occupancy(),
            density_level: report.crowd_density.density_level,
            peak_density_level: report.peak_density.density_level,
            bottleneck_count: report.bottleneck_analysis.bottlenecks_detected,
            worst_severity: report.bottleneck_analysis.worst_severity(),
            trend: report.flow_metrics.trend,
            variability: report.flow_metrics.variability,
            distribution_pattern: report.spatial_distribution.distribution_pattern,
            hotspot_positions: report
                .spatial_distribution
                .hotspots
                .iter()
                .map(|zone| zone.position.clone())
                .collect(),
            capacity,
        }
    }
}

/// Narrow read interface handed to summarizers instead of the store itself
pub trait ReportReader: Send + Sync {
    fn digest(&self, id: &AnalysisId) -> Result<ReportDigest, StoreError>;
}

impl ReportReader for MemoryReportStore {
    fn digest(&self, id: &AnalysisId) -> Result<ReportDigest, StoreError> {
        self.with_report(id, ReportDigest::from_report)
    }
}
