/// Bed demand forecast from the observed waiting population
use serde::{Deserialize, Serialize};

pub const BED_ALGORITHM: &str = "Lee-Longton Algorithm + Occupancy Forecasting";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Urgency {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Moderate,
    High,
    Critical,
}

impl Urgency {
    /// Grade by buffered projected occupancy and absolute bed shortage
    pub fn classify(projected_occupancy: f64, shortage: f64) -> Self {
        if projected_occupancy >= 1.0 || shortage > 10.0 {
            Self::Critical
        } else if projected_occupancy >= 0.9 || shortage > 5.0 {
            Self::High
        } else if projected_occupancy >= 0.75 || shortage > 2.0 {
            Self::Moderate
        } else if projected_occupancy >= 0.6 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Moderate => "Moderate",
            Self::Low => "Low",
            Self::VeryLow => "Very Low",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Critical => "Critical - Immediate action required",
            Self::High => "High - Plan additional capacity",
            Self::Moderate => "Moderate - Monitor closely",
            Self::Low => "Low - Normal operations",
            Self::VeryLow => "Very Low - Adequate capacity",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedForecast {
    pub estimated_waiting_patients: f64,
    pub estimated_peak_patients: u32,
    pub current_occupancy_rate: f64,
    /// Occupancy after admitting every waiting patient, with the uncertainty buffer applied
    pub projected_occupancy_rate: f64,
    pub current_available_beds: u32,
    pub estimated_beds_needed: u32,
    pub additional_capacity_needed: u32,
    pub critical_care_beds_needed: f64,
    pub general_beds_needed: f64,
    pub urgency_level: Urgency,
    pub urgency_description: String,
    pub recommendation: String,
    pub algorithm: String,
}

pub struct BedPlanner {
    critical_care_ratio: f64,
    uncertainty_buffer: f64,
}

impl BedPlanner {
    pub fn new(critical_care_ratio: f64, uncertainty_buffer: f64) -> Self {
        Self {
            critical_care_ratio,
            uncertainty_buffer,
        }
    }

    fn recommendation(urgency: Urgency, shortage: u32, available_beds: u32) -> String {
        match urgency {
            Urgency::Critical => format!(
                "URGENT: Implement surge capacity protocols. Missing ~{} beds. Divert non-critical admissions.",
                shortage
            ),
            Urgency::High => format!(
                "Prepare surge beds and notify administration. Potential shortage of ~{} beds.",
                shortage
            ),
            Urgency::Moderate => format!(
                "Monitor bed status closely. May need ~{} additional beds soon.",
                shortage
            ),
            Urgency::Low | Urgency::VeryLow => format!(
                "Normal operations. Adequate bed capacity available ({} beds free).",
                available_beds
            ),
        }
    }

    /// `waiting` is the average observed occupancy, `peak` the maximum
    pub fn forecast(&self, waiting: f64, peak: u32, total: u32, occupied: u32, available: u32) -> BedForecast {
        let waiting = if waiting.is_finite() { waiting.max(0.0) } else { 0.0 };

        let (current_rate, base_projected) = if total > 0 {
            (
                f64::from(occupied) / f64::from(total),
                (f64::from(occupied) + waiting) / f64::from(total),
            )
        } else {
            // no bed inventory: treat as full
            (0.0, 1.0)
        };
        let projected = base_projected * self.uncertainty_buffer;

        let shortage = (waiting - f64::from(available)).max(0.0);
        let urgency = Urgency::classify(projected, shortage);
        let additional = shortage.round() as u32;

        if urgency >= Urgency::High {
            tracing::warn!(
                projected_occupancy = projected,
                shortage,
                urgency = %urgency,
                "bed capacity under pressure"
            );
        }

        BedForecast {
            estimated_waiting_patients: waiting,
            estimated_peak_patients: peak,
            current_occupancy_rate: current_rate,
            projected_occupancy_rate: projected,
            current_available_beds: available,
            estimated_beds_needed: waiting.round() as u32,
            additional_capacity_needed: additional,
            critical_care_beds_needed: waiting * self.critical_care_ratio,
            general_beds_needed: waiting * (1.0 - self.critical_care_ratio),
            urgency_level: urgency,
            urgency_description: urgency.description().to_string(),
            // whole beds short, fractional part dropped
            recommendation: Self::recommendation(urgency, shortage.trunc() as u32, available),
            algorithm: BED_ALGORITHM.to_string(),
        }
    }
}

impl Default for BedPlanner {
    fn default() -> Self {
        Self::new(0.2, 1.15)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ward_near_capacity() {
        let forecast = BedPlanner::default().forecast(10.0, 14, 50, 42, 8);

        assert_eq!(forecast.additional_capacity_needed, 2);
        assert_eq!(forecast.estimated_beds_needed, 10);
        assert!((forecast.current_occupancy_rate - 0.84).abs() < 1e-12);
        assert!((forecast.projected_occupancy_rate - 52.0 / 50.0 * 1.15).abs() < 1e-12);
        assert!(forecast.urgency_level >= Urgency::Moderate);
        assert_eq!(forecast.urgency_level, Urgency::Critical);
        assert!(forecast.recommendation.starts_with("URGENT"));
        assert!((forecast.critical_care_beds_needed - 2.0).abs() < 1e-12);
        assert!((forecast.general_beds_needed - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_urgency_bands() {
        assert_eq!(Urgency::classify(1.0, 0.0), Urgency::Critical);
        assert_eq!(Urgency::classify(0.1, 11.0), Urgency::Critical);
        assert_eq!(Urgency::classify(0.9, 0.0), Urgency::High);
        assert_eq!(Urgency::classify(0.1, 6.0), Urgency::High);
        assert_eq!(Urgency::classify(0.75, 0.0), Urgency::Moderate);
        assert_eq!(Urgency::classify(0.1, 3.0), Urgency::Moderate);
        assert_eq!(Urgency::classify(0.6, 0.0), Urgency::Low);
        assert_eq!(Urgency::classify(0.59, 2.0), Urgency::VeryLow);
    }

    #[test]
    fn test_ample_capacity() {
        let forecast = BedPlanner::default().forecast(2.0, 3, 100, 20, 80);
        assert_eq!(forecast.additional_capacity_needed, 0);
        assert_eq!(forecast.urgency_level, Urgency::VeryLow);
        assert_eq!(
            forecast.recommendation,
            "Normal operations. Adequate bed capacity available (80 beds free)."
        );
        assert_eq!(forecast.urgency_description, "Very Low - Adequate capacity");
    }

    #[test]
    fn test_no_bed_inventory_projects_full() {
        let forecast = BedPlanner::default().forecast(0.0, 0, 0, 0, 0);
        assert_eq!(forecast.current_occupancy_rate, 0.0);
        assert!((forecast.projected_occupancy_rate - 1.15).abs() < 1e-12);
        assert_eq!(forecast.urgency_level, Urgency::Critical);
        assert_eq!(forecast.additional_capacity_needed, 0);
    }

    #[test]
    fn test_recommendation_counts_whole_beds_short() {
        // shortage 2.6: the total rounds up, the advice counts whole beds
        let forecast = BedPlanner::default().forecast(10.6, 12, 100, 10, 8);
        assert_eq!(forecast.urgency_level, Urgency::Moderate);
        assert_eq!(forecast.additional_capacity_needed, 3);
        assert_eq!(
            forecast.recommendation,
            "Monitor bed status closely. May need ~2 additional beds soon."
        );
    }

    #[test]
    fn test_urgency_serializes_with_spaces() {
        assert_eq!(
            serde_json::to_value(Urgency::VeryLow).unwrap(),
            serde_json::json!("Very Low")
        );
        assert_eq!(serde_json::to_value(Urgency::High).unwrap(), serde_json::json!("High"));
    }
}
