//! Live resource snapshot supplied by the hospital operations collaborator.
//!
//! The shape mirrors the JSON context that accompanies an analysis request.
//! Older clients send `resources` instead of `beds` and `*_beds` field names;
//! both spellings are accepted.

use serde::{Deserialize, Serialize};

/// Staffing and bed state for the monitored location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    #[serde(default)]
    pub staffing: Staffing,

    #[serde(default, alias = "resources")]
    pub beds: Beds,

    /// Monitored floor area; non-positive values disable density scoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_sqm: Option<f64>,

    #[serde(default = "default_location_name")]
    pub location_name: String,
}

fn default_location_name() -> String {
    "Hospital Area".to_string()
}

impl Default for ResourceState {
    fn default() -> Self {
        Self {
            staffing: Staffing::default(),
            beds: Beds::default(),
            area_sqm: None,
            location_name: default_location_name(),
        }
    }
}

impl ResourceState {
    /// Area to use for density and service-rate estimates
    pub fn area_or(&self, default_area_sqm: f64) -> f64 {
        self.area_sqm.unwrap_or(default_area_sqm)
    }
}

/// Shift currently on duty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    #[default]
    Day,
    Evening,
    Night,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staffing {
    #[serde(default)]
    pub total_nurses: u32,
    #[serde(default)]
    pub available_nurses: u32,
    #[serde(default)]
    pub total_doctors: u32,
    #[serde(default)]
    pub available_doctors: u32,
    #[serde(default, alias = "shift_type")]
    pub shift: Shift,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beds {
    #[serde(default, alias = "total_beds")]
    pub total: u32,
    #[serde(default, alias = "occupied_beds")]
    pub occupied: u32,
    #[serde(default, alias = "available_beds")]
    pub available: u32,
    #[serde(default, alias = "critical_care_beds")]
    pub critical_care: u32,
    #[serde(default, alias = "general_beds")]
    pub general: u32,
    #[serde(default, alias = "observation_beds")]
    pub observation: u32,
}
