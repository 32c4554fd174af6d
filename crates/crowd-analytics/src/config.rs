use crate::error::ConfigError;
use common::validation::{validate_finite, validate_greater_than, validate_positive, validate_range};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// How the staffing search picks among candidate agent counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffingObjective {
    /// Lowest predicted wait among candidates meeting the target; ties go to fewer agents.
    ///
    /// Predicted wait falls strictly as agents are added, so whenever the
    /// target is reachable this picks the top of the window, `ceil(a) + 5`.
    /// Use [`StaffingObjective::FirstMeetingTarget`] for the smallest
    /// sufficient agent count.
    #[default]
    MinimalWait,
    /// Fewest agents whose predicted wait meets the target
    FirstMeetingTarget,
}

impl FromStr for StaffingObjective {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minimal_wait" => Ok(Self::MinimalWait),
            "first_meeting_target" => Ok(Self::FirstMeetingTarget),
            _ => Err(format!("Invalid staffing objective: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Person count at or above which a frame counts as high density
    #[serde(default = "default_high_density_threshold")]
    pub high_density_threshold: u32,

    /// Bottleneck threshold as a multiple of the series average (> 1)
    #[serde(default = "default_bottleneck_multiplier")]
    pub bottleneck_threshold_multiplier: f64,

    /// Minimum consecutive frames for a bottleneck period
    #[serde(default = "default_min_bottleneck_duration")]
    pub min_bottleneck_duration: usize,

    /// Chart bucket width in seconds
    #[serde(default = "default_visualization_interval")]
    pub visualization_interval_seconds: f64,

    /// Acceptable average queue wait used by the staffing search
    #[serde(default = "default_target_wait")]
    pub target_wait_time_minutes: f64,

    /// Share of waiting patients expected to need critical care (0.0 to 1.0)
    #[serde(default = "default_critical_care_ratio")]
    pub critical_care_ratio: f64,

    /// Multiplier applied to projected bed occupancy
    #[serde(default = "default_bed_uncertainty_buffer")]
    pub bed_uncertainty_buffer: f64,

    /// Arrivals per observed person per video length, for the arrival-rate proxy
    #[serde(default = "default_arrival_multiplier")]
    pub arrival_multiplier: f64,

    /// People served per hour by one agent in a compact area
    #[serde(default = "default_base_service_rate")]
    pub base_service_rate: f64,

    /// Area beyond which service rate degrades proportionally
    #[serde(default = "default_reference_area")]
    pub reference_area_sqm: f64,

    /// Floor for the estimated service rate
    #[serde(default = "default_min_service_rate")]
    pub min_service_rate: f64,

    /// Area assumed when the resource snapshot does not carry one
    #[serde(default = "default_area")]
    pub default_area_sqm: f64,

    #[serde(default)]
    pub staffing_objective: StaffingObjective,

    /// Predicted wait above which an alert is raised
    #[serde(default = "default_wait_alert")]
    pub wait_alert_minutes: f64,
}

fn default_high_density_threshold() -> u32 {
    15
}

fn default_bottleneck_multiplier() -> f64 {
    1.5
}

fn default_min_bottleneck_duration() -> usize {
    3
}

fn default_visualization_interval() -> f64 {
    10.0
}

fn default_target_wait() -> f64 {
    10.0
}

fn default_critical_care_ratio() -> f64 {
    0.2
}

fn default_bed_uncertainty_buffer() -> f64 {
    1.15
}

fn default_arrival_multiplier() -> f64 {
    2.0
}

fn default_base_service_rate() -> f64 {
    6.0
}

fn default_reference_area() -> f64 {
    200.0
}

fn default_min_service_rate() -> f64 {
    1.0
}

fn default_area() -> f64 {
    100.0 // square meters
}

fn default_wait_alert() -> f64 {
    30.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            high_density_threshold: default_high_density_threshold(),
            bottleneck_threshold_multiplier: default_bottleneck_multiplier(),
            min_bottleneck_duration: default_min_bottleneck_duration(),
            visualization_interval_seconds: default_visualization_interval(),
            target_wait_time_minutes: default_target_wait(),
            critical_care_ratio: default_critical_care_ratio(),
            bed_uncertainty_buffer: default_bed_uncertainty_buffer(),
            arrival_multiplier: default_arrival_multiplier(),
            base_service_rate: default_base_service_rate(),
            reference_area_sqm: default_reference_area(),
            min_service_rate: default_min_service_rate(),
            default_area_sqm: default_area(),
            staffing_objective: StaffingObjective::default(),
            wait_alert_minutes: default_wait_alert(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON configuration object; `null` yields the defaults
    pub fn from_json(value: serde_json::Value) -> Result<Self, ConfigError> {
        let config: Self = if value.is_null() {
            Self::default()
        } else {
            serde_json::from_value(value)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `CROWD_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = env_parse("CROWD_HIGH_DENSITY_THRESHOLD")? {
            config.high_density_threshold = v;
        }
        if let Some(v) = env_parse("CROWD_BOTTLENECK_MULTIPLIER")? {
            config.bottleneck_threshold_multiplier = v;
        }
        if let Some(v) = env_parse("CROWD_MIN_BOTTLENECK_FRAMES")? {
            config.min_bottleneck_duration = v;
        }
        if let Some(v) = env_parse("CROWD_VIZ_INTERVAL_SECONDS")? {
            config.visualization_interval_seconds = v;
        }
        if let Some(v) = env_parse("CROWD_TARGET_WAIT_MINUTES")? {
            config.target_wait_time_minutes = v;
        }
        if let Some(v) = env_parse("CROWD_CRITICAL_CARE_RATIO")? {
            config.critical_care_ratio = v;
        }
        if let Some(v) = env_parse("CROWD_BED_UNCERTAINTY_BUFFER")? {
            config.bed_uncertainty_buffer = v;
        }
        if let Some(v) = env_parse("CROWD_ARRIVAL_MULTIPLIER")? {
            config.arrival_multiplier = v;
        }
        if let Some(v) = env_parse("CROWD_BASE_SERVICE_RATE")? {
            config.base_service_rate = v;
        }
        if let Some(v) = env_parse("CROWD_DEFAULT_AREA_SQM")? {
            config.default_area_sqm = v;
        }
        if let Some(v) = env_parse("CROWD_REFERENCE_AREA_SQM")? {
            config.reference_area_sqm = v;
        }
        if let Some(v) = env_parse("CROWD_MIN_SERVICE_RATE")? {
            config.min_service_rate = v;
        }
        if let Some(v) = env_parse("CROWD_WAIT_ALERT_MINUTES")? {
            config.wait_alert_minutes = v;
        }
        if let Some(v) = env_parse("CROWD_STAFFING_OBJECTIVE")? {
            config.staffing_objective = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check every field; the engine refuses to start with an invalid config
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.high_density_threshold == 0 {
            return Err(ConfigError::Invalid(
                "high_density_threshold must be at least 1".to_string(),
            ));
        }
        validate_greater_than(
            self.bottleneck_threshold_multiplier,
            1.0,
            "bottleneck_threshold_multiplier",
        )?;
        if self.min_bottleneck_duration == 0 {
            return Err(ConfigError::Invalid(
                "min_bottleneck_duration must be at least 1 frame".to_string(),
            ));
        }
        validate_positive(
            self.visualization_interval_seconds,
            "visualization_interval_seconds",
        )?;
        validate_positive(self.target_wait_time_minutes, "target_wait_time_minutes")?;
        validate_range(self.critical_care_ratio, 0.0, 1.0, "critical_care_ratio")?;
        validate_finite(self.bed_uncertainty_buffer, "bed_uncertainty_buffer")?;
        validate_range(
            self.bed_uncertainty_buffer,
            1.0,
            f64::MAX,
            "bed_uncertainty_buffer",
        )?;
        validate_finite(self.arrival_multiplier, "arrival_multiplier")?;
        validate_range(self.arrival_multiplier, 0.0, f64::MAX, "arrival_multiplier")?;
        validate_positive(self.base_service_rate, "base_service_rate")?;
        validate_positive(self.reference_area_sqm, "reference_area_sqm")?;
        validate_positive(self.min_service_rate, "min_service_rate")?;
        validate_positive(self.default_area_sqm, "default_area_sqm")?;
        validate_positive(self.wait_alert_minutes, "wait_alert_minutes")?;
        Ok(())
    }
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env {
                name: name.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}
