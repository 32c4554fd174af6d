/// Staffing recommendation: estimate queue rates from crowd data, then scan
/// a small window of agent counts with the Erlang C model.
use super::erlang::{QueueModel, WaitTime};
use crate::config::{EngineConfig, StaffingObjective};
use serde::{Deserialize, Serialize};

/// Candidate agent counts examined above `ceil(a)`
const SEARCH_WINDOW: u32 = 5;

/// Beyond this offered load the scan is skipped and the queue reported saturated
const MAX_MODELLED_INTENSITY: f64 = 10_000.0;

pub const STAFFING_ALGORITHM: &str = "Erlang C + Queueing Theory (M/M/c)";

/// Arrival-rate proxy in people per hour.
///
/// No arrival log exists, so the observed average is treated as the
/// equilibrium level of a system where arrivals balance departures:
/// `avg × multiplier × (60 / duration_minutes)`.
pub fn estimate_arrival_rate(average_occupancy: f64, duration_minutes: f64, multiplier: f64) -> f64 {
    if !duration_minutes.is_finite() || duration_minutes <= 0.0 {
        return 0.0;
    }
    (average_occupancy * multiplier * (60.0 / duration_minutes)).max(0.0)
}

/// Per-agent service rate, degraded for areas larger than the reference area
pub fn estimate_service_rate(area_sqm: f64, config: &EngineConfig) -> f64 {
    let area_factor = if area_sqm > config.reference_area_sqm {
        config.reference_area_sqm / area_sqm
    } else {
        1.0
    };
    (config.base_service_rate * area_factor).max(config.min_service_rate)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffingCandidate {
    pub agents: u32,
    pub wait_time_minutes: WaitTime,
    pub probability_waiting: f64,
    pub system_utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffingRecommendation {
    pub recommended_nurses: u32,
    pub additional_nurses_needed: u32,
    pub current_available: u32,
    pub arrival_rate_per_hour: f64,
    pub service_rate_per_agent: f64,
    /// Offered load a = λ/μ
    pub system_intensity: f64,
    pub predicted_wait_time_minutes: WaitTime,
    pub probability_waiting: f64,
    pub system_utilization: f64,
    /// Whether any candidate met the target wait
    pub target_met: bool,
    pub target_wait_time_minutes: f64,
    pub staffing_analysis: Vec<StaffingCandidate>,
    pub confidence: f64,
    pub algorithm: String,
}

pub struct StaffingPlanner<'a> {
    config: &'a EngineConfig,
}

impl<'a> StaffingPlanner<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Candidates `[max(1, ceil(a)), ceil(a) + 5]` with their queue metrics
    pub fn candidates(&self, model: &QueueModel) -> Vec<StaffingCandidate> {
        let intensity = model.traffic_intensity();
        if !intensity.is_finite() || intensity > MAX_MODELLED_INTENSITY {
            tracing::warn!(intensity, "offered load too large to model, skipping staffing scan");
            return Vec::new();
        }

        let base = intensity.max(0.0).ceil() as u32;
        (base.max(1)..=base + SEARCH_WINDOW)
            .map(|agents| StaffingCandidate {
                agents,
                wait_time_minutes: model.average_wait(agents),
                probability_waiting: model.probability_waiting(agents),
                system_utilization: model.utilization(agents),
            })
            .collect()
    }

    fn select(&self, candidates: &[StaffingCandidate]) -> Option<u32> {
        let target = self.config.target_wait_time_minutes;
        let qualifying = candidates.iter().filter_map(|candidate| {
            candidate
                .wait_time_minutes
                .minutes()
                .filter(|&wait| wait <= target)
                .map(|wait| (candidate.agents, wait))
        });

        match self.config.staffing_objective {
            StaffingObjective::FirstMeetingTarget => qualifying.map(|(agents, _)| agents).next(),
            StaffingObjective::MinimalWait => {
                let mut best: Option<(u32, f64)> = None;
                for (agents, wait) in qualifying {
                    // strict comparison keeps the smaller agent count on ties
                    if best.map_or(true, |(_, best_wait)| wait < best_wait) {
                        best = Some((agents, wait));
                    }
                }
                best.map(|(agents, _)| agents)
            }
        }
    }

    pub fn recommend(
        &self,
        average_occupancy: f64,
        duration_minutes: f64,
        available_nurses: u32,
        area_sqm: f64,
    ) -> StaffingRecommendation {
        let arrival_rate = estimate_arrival_rate(
            average_occupancy,
            duration_minutes,
            self.config.arrival_multiplier,
        );
        let service_rate = estimate_service_rate(area_sqm, self.config);
        let model = QueueModel::new(arrival_rate, service_rate);

        let staffing_analysis = self.candidates(&model);
        let selected = self.select(&staffing_analysis);
        let recommended = selected.unwrap_or(available_nurses);

        let confidence =
            (f64::from(recommended) / f64::from(available_nurses.max(1)) * 0.8 + 0.2).clamp(0.0, 1.0);

        tracing::debug!(
            arrival_rate,
            service_rate,
            recommended,
            target_met = selected.is_some(),
            "staffing scan complete"
        );

        StaffingRecommendation {
            recommended_nurses: recommended,
            additional_nurses_needed: recommended.saturating_sub(available_nurses),
            current_available: available_nurses,
            arrival_rate_per_hour: arrival_rate,
            service_rate_per_agent: service_rate,
            system_intensity: model.traffic_intensity(),
            predicted_wait_time_minutes: model.average_wait(recommended),
            probability_waiting: model.probability_waiting(recommended),
            system_utilization: model.utilization(recommended),
            target_met: selected.is_some(),
            target_wait_time_minutes: self.config.target_wait_time_minutes,
            staffing_analysis,
            confidence,
            algorithm: STAFFING_ALGORITHM.to_string(),
        }
    }
}
