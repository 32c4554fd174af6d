//! Capacity planning: combines the observed crowd with a resource snapshot
//! into staffing and bed recommendations, a composite score, alerts, and a
//! short summary.

pub mod beds;
pub mod erlang;
pub mod staffing;

use crate::config::EngineConfig;
use beds::{BedForecast, BedPlanner, Urgency};
use common::resources::ResourceState;
use erlang::WaitTime;
use serde::{Deserialize, Serialize};
use staffing::{StaffingPlanner, StaffingRecommendation};

/// Crowd figures the planner needs, taken from the series analyses
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityInputs {
    pub average_occupancy: f64,
    pub peak_occupancy: u32,
    pub duration_minutes: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CapacityStatus {
    Critical,
    Poor,
    Fair,
    Good,
    Optimal,
}

impl CapacityStatus {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Optimal
        } else if score >= 60.0 {
            Self::Good
        } else if score >= 40.0 {
            Self::Fair
        } else if score >= 20.0 {
            Self::Poor
        } else {
            Self::Critical
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Optimal => "Optimal - All resources adequate",
            Self::Good => "Good - Minor constraints",
            Self::Fair => "Fair - Notable constraints",
            Self::Poor => "Poor - Significant strain",
            Self::Critical => "Critical - Severe strain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

impl Alert {
    fn critical(message: String) -> Self {
        Self {
            level: AlertLevel::Critical,
            message,
        }
    }

    fn warning(message: String) -> Self {
        Self {
            level: AlertLevel::Warning,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityReport {
    pub location: String,
    pub staffing_analysis: StaffingRecommendation,
    pub bed_analysis: BedForecast,
    /// Composite score in [0, 100]
    pub capacity_score: f64,
    pub overall_status: CapacityStatus,
    pub status_description: String,
    pub critical_alerts: Vec<Alert>,
    pub summary: String,
}

impl CapacityReport {
    pub fn has_critical_alert(&self) -> bool {
        self.critical_alerts
            .iter()
            .any(|alert| alert.level == AlertLevel::Critical)
    }
}

pub struct CapacityPlanner<'a> {
    config: &'a EngineConfig,
}

impl<'a> CapacityPlanner<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn plan(&self, inputs: &CapacityInputs, resources: &ResourceState) -> CapacityReport {
        let area = resources.area_or(self.config.default_area_sqm);

        let staffing = StaffingPlanner::new(self.config).recommend(
            inputs.average_occupancy,
            inputs.duration_minutes,
            resources.staffing.available_nurses,
            area,
        );

        let beds = BedPlanner::new(
            self.config.critical_care_ratio,
            self.config.bed_uncertainty_buffer,
        )
        .forecast(
            inputs.average_occupancy,
            inputs.peak_occupancy,
            resources.beds.total,
            resources.beds.occupied,
            resources.beds.available,
        );

        let capacity_score = capacity_score(
            resources.staffing.available_nurses,
            staffing.recommended_nurses,
            resources.beds.available,
            beds.estimated_beds_needed,
        );
        let overall_status = CapacityStatus::from_score(capacity_score);
        let critical_alerts = self.alerts(&staffing, &beds);
        let summary = summarize(
            &resources.location_name,
            inputs.average_occupancy,
            &staffing,
            &beds,
        );

        tracing::debug!(
            location = %resources.location_name,
            capacity_score,
            status = ?overall_status,
            alerts = critical_alerts.len(),
            "capacity plan complete"
        );

        CapacityReport {
            location: resources.location_name.clone(),
            staffing_analysis: staffing,
            bed_analysis: beds,
            capacity_score,
            overall_status,
            status_description: overall_status.description().to_string(),
            critical_alerts,
            summary,
        }
    }

    fn alerts(&self, staffing: &StaffingRecommendation, beds: &BedForecast) -> Vec<Alert> {
        let mut alerts = Vec::new();

        let additional_nurses = staffing.additional_nurses_needed;
        if additional_nurses >= 3 {
            alerts.push(Alert::critical(format!(
                "Need {} additional nurses to meet optimal staffing",
                additional_nurses
            )));
        } else if additional_nurses >= 1 {
            alerts.push(Alert::warning(format!(
                "Need {} additional nurse(s)",
                additional_nurses
            )));
        }

        match beds.urgency_level {
            Urgency::Critical => alerts.push(Alert::critical(format!(
                "Bed shortage of {} beds",
                beds.additional_capacity_needed
            ))),
            Urgency::High => alerts.push(Alert::warning(format!(
                "May need {} additional beds",
                beds.additional_capacity_needed
            ))),
            _ => {}
        }

        match staffing.predicted_wait_time_minutes {
            WaitTime::Unstable => alerts.push(Alert::critical(
                "Queue is unstable: arrivals exceed staffed service capacity".to_string(),
            )),
            WaitTime::Minutes(wait) if wait > self.config.wait_alert_minutes => {
                alerts.push(Alert::warning(format!(
                    "Predicted wait time {:.0} minutes (target: {} min)",
                    wait, self.config.target_wait_time_minutes
                )))
            }
            WaitTime::Minutes(_) => {}
        }

        alerts
    }
}

/// `50·min(1, nurses/max(1, rec)) + 50·min(1, beds/needed)`, clamped to [0, 100].
/// The bed term is a full 50 when no beds are needed.
pub fn capacity_score(
    available_nurses: u32,
    recommended_nurses: u32,
    available_beds: u32,
    beds_needed: u32,
) -> f64 {
    let staffing_component =
        50.0 * (f64::from(available_nurses) / f64::from(recommended_nurses.max(1))).min(1.0);
    let bed_component = if beds_needed > 0 {
        50.0 * (f64::from(available_beds) / f64::from(beds_needed)).min(1.0)
    } else {
        50.0
    };
    (staffing_component + bed_component).clamp(0.0, 100.0)
}

fn summarize(
    location: &str,
    average_occupancy: f64,
    staffing: &StaffingRecommendation,
    beds: &BedForecast,
) -> String {
    let mut summary = format!(
        "Analysis for {}: Detected average of {:.1} waiting patients. ",
        location, average_occupancy
    );

    if staffing.additional_nurses_needed > 0 {
        summary.push_str(&format!(
            "Recommend {} nurses (add {}). ",
            staffing.recommended_nurses, staffing.additional_nurses_needed
        ));
    } else {
        summary.push_str(&format!(
            "Current staffing ({} nurses) appears adequate. ",
            staffing.current_available
        ));
    }

    if beds.additional_capacity_needed > 0 {
        summary.push_str(&format!(
            "May need {} additional beds. ",
            beds.additional_capacity_needed
        ));
    } else {
        summary.push_str("Bed capacity appears adequate. ");
    }

    match staffing.predicted_wait_time_minutes {
        WaitTime::Minutes(wait) => summary.push_str(&format!("Expected wait time: {:.0} minutes.", wait)),
        WaitTime::Unstable => summary.push_str("Expected wait time: unbounded, queue is unstable."),
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::resources::{Beds, Staffing};

    fn ward(available_nurses: u32, total: u32, occupied: u32, available: u32) -> ResourceState {
        ResourceState {
            staffing: Staffing {
                total_nurses: available_nurses + 2,
                available_nurses,
                ..Staffing::default()
            },
            beds: Beds {
                total,
                occupied,
                available,
                ..Beds::default()
            },
            area_sqm: Some(100.0),
            location_name: "Emergency Room A".to_string(),
        }
    }

    #[test]
    fn test_score_bounds_and_bands() {
        assert_eq!(capacity_score(10, 5, 20, 10), 100.0);
        assert_eq!(capacity_score(0, 100, 0, 10), 0.0);
        assert_eq!(capacity_score(5, 10, 0, 0), 75.0);
        assert_eq!(capacity_score(0, 0, 0, 0), 50.0);

        assert_eq!(CapacityStatus::from_score(80.0), CapacityStatus::Optimal);
        assert_eq!(CapacityStatus::from_score(79.9), CapacityStatus::Good);
        assert_eq!(CapacityStatus::from_score(40.0), CapacityStatus::Fair);
        assert_eq!(CapacityStatus::from_score(20.0), CapacityStatus::Poor);
        assert_eq!(CapacityStatus::from_score(0.0), CapacityStatus::Critical);
    }

    #[test]
    fn test_score_stays_in_range_for_extreme_ratios() {
        for &(nurses, rec, beds, needed) in &[
            (0, 100, 0, 1000),
            (u32::MAX, 1, u32::MAX, 1),
            (1, 0, 5, 0),
            (1000, 1, 0, 1),
        ] {
            let score = capacity_score(nurses, rec, beds, needed);
            assert!((0.0..=100.0).contains(&score));
        }
    }

    #[test]
    fn test_understaffed_ward_raises_alerts() {
        let config = EngineConfig::default();
        let inputs = CapacityInputs {
            average_occupancy: 10.0,
            peak_occupancy: 14,
            duration_minutes: 20.0,
        };
        let report = CapacityPlanner::new(&config).plan(&inputs, &ward(2, 50, 42, 8));

        // lambda 60/h, mu 6 -> a = 10, so more than 2 nurses are needed
        assert!(report.staffing_analysis.recommended_nurses > 10);
        assert!(report.staffing_analysis.additional_nurses_needed >= 3);
        assert_eq!(report.bed_analysis.urgency_level, Urgency::Critical);
        assert!(report.has_critical_alert());
        assert!(report
            .critical_alerts
            .iter()
            .any(|a| a.message == "Bed shortage of 2 beds"));
        assert!(report.capacity_score < 60.0);
        assert_eq!(report.location, "Emergency Room A");
        assert!(report.summary.starts_with("Analysis for Emergency Room A"));
        assert!(report.summary.contains("May need 2 additional beds."));
    }

    #[test]
    fn test_quiet_ward_is_optimal() {
        let config = EngineConfig::default();
        let inputs = CapacityInputs {
            average_occupancy: 1.0,
            peak_occupancy: 2,
            duration_minutes: 60.0,
        };
        let report = CapacityPlanner::new(&config).plan(&inputs, &ward(6, 100, 20, 80));

        assert_eq!(report.staffing_analysis.additional_nurses_needed, 0);
        assert_eq!(report.capacity_score, 100.0);
        assert_eq!(report.overall_status, CapacityStatus::Optimal);
        assert!(report.critical_alerts.is_empty());
        assert!(report.summary.contains("Current staffing (6 nurses) appears adequate."));
        assert!(report.summary.contains("Bed capacity appears adequate."));
    }

    #[test]
    fn test_unstable_queue_is_critical() {
        let config = EngineConfig {
            target_wait_time_minutes: 1e-9,
            ..EngineConfig::default()
        };
        let inputs = CapacityInputs {
            average_occupancy: 10.0,
            peak_occupancy: 12,
            duration_minutes: 20.0,
        };
        let report = CapacityPlanner::new(&config).plan(&inputs, &ward(2, 100, 10, 90));

        assert!(report.staffing_analysis.predicted_wait_time_minutes.is_unstable());
        assert!(report.critical_alerts.iter().any(|a| a.level == AlertLevel::Critical
            && a.message.starts_with("Queue is unstable")));
        assert!(report.summary.ends_with("queue is unstable."));
    }

    #[test]
    fn test_alert_level_serialization() {
        let alert = Alert::warning("Need 1 additional nurse(s)".to_string());
        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value["level"], "WARNING");
    }
}
