/// Crowd density classification: people per square meter into five tiers
use serde::{Deserialize, Serialize};

/// Tier breakpoints in people per square meter; a value equal to a
/// breakpoint belongs to the tier above it.
const LOW_BREAKPOINT: f64 = 0.1;
const MODERATE_BREAKPOINT: f64 = 0.2;
const HIGH_BREAKPOINT: f64 = 0.4;
const VERY_HIGH_BREAKPOINT: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DensityLevel {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl DensityLevel {
    pub fn from_density(density_per_sqm: f64) -> Self {
        if density_per_sqm >= VERY_HIGH_BREAKPOINT {
            Self::VeryHigh
        } else if density_per_sqm >= HIGH_BREAKPOINT {
            Self::High
        } else if density_per_sqm >= MODERATE_BREAKPOINT {
            Self::Moderate
        } else if density_per_sqm >= LOW_BREAKPOINT {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    /// Severity from 1 (very low) to 5 (very high)
    pub fn severity_score(&self) -> u8 {
        match self {
            Self::VeryLow => 1,
            Self::Low => 2,
            Self::Moderate => 3,
            Self::High => 4,
            Self::VeryHigh => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }
}

impl std::fmt::Display for DensityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrowdDensity {
    pub person_count: u32,
    pub area_sqm: f64,
    pub density_per_sqm: f64,
    pub density_level: DensityLevel,
    pub severity_score: u8,
}

/// Classifies an occupancy count against a fixed floor area
#[derive(Debug, Clone, Copy)]
pub struct DensityClassifier {
    area_sqm: f64,
}

impl DensityClassifier {
    pub fn new(area_sqm: f64) -> Self {
        Self { area_sqm }
    }

    /// Total over all inputs: a non-positive or non-finite area yields density 0
    pub fn classify(&self, person_count: u32) -> CrowdDensity {
        let density_per_sqm = if self.area_sqm > 0.0 && self.area_sqm.is_finite() {
            f64::from(person_count) / self.area_sqm
        } else {
            0.0
        };
        let density_level = DensityLevel::from_density(density_per_sqm);

        CrowdDensity {
            person_count,
            area_sqm: self.area_sqm,
            density_per_sqm,
            density_level,
            severity_score: density_level.severity_score(),
        }
    }
}

impl Default for DensityClassifier {
    fn default() -> Self {
        Self::new(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_level() {
        let classifier = DensityClassifier::default();

        let very_low = classifier.classify(5);
        assert_eq!(very_low.density_level, DensityLevel::VeryLow);
        assert_eq!(very_low.density_per_sqm, 0.05);
        assert_eq!(very_low.severity_score, 1);

        let high = classifier.classify(50);
        assert_eq!(high.density_level, DensityLevel::High);
        assert_eq!(high.severity_score, 4);

        let very_high = classifier.classify(90);
        assert_eq!(very_high.density_level, DensityLevel::VeryHigh);
        assert_eq!(very_high.severity_score, 5);
    }

    #[test]
    fn test_breakpoints_belong_to_upper_tier() {
        let classifier = DensityClassifier::new(100.0);
        assert_eq!(classifier.classify(10).density_level, DensityLevel::Low);
        assert_eq!(classifier.classify(20).density_level, DensityLevel::Moderate);
        assert_eq!(classifier.classify(40).density_level, DensityLevel::High);
        assert_eq!(classifier.classify(60).density_level, DensityLevel::VeryHigh);

        assert_eq!(DensityLevel::from_density(0.1), DensityLevel::Low);
        assert_eq!(DensityLevel::from_density(0.0999), DensityLevel::VeryLow);
    }

    #[test]
    fn test_non_positive_area_yields_zero_density() {
        for area in [0.0, -25.0, f64::NAN] {
            let result = DensityClassifier::new(area).classify(40);
            assert_eq!(result.density_per_sqm, 0.0);
            assert_eq!(result.density_level, DensityLevel::VeryLow);
        }
    }

    #[test]
    fn test_level_serializes_as_label() {
        let json = serde_json::to_value(DensityLevel::VeryHigh).unwrap();
        assert_eq!(json, serde_json::json!("Very High"));
        assert_eq!(DensityLevel::Moderate.to_string(), "Moderate");
    }
}
