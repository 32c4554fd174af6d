//! M/M/c queue model (Erlang C).
//!
//! Rates are per hour. The model never panics or overflows: saturated
//! regimes (no agents, no service, traffic at or above the agent count)
//! report a waiting probability of exactly 1.0 and an [`WaitTime::Unstable`]
//! wait instead of evaluating the closed form.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Average time an arrival spends queued before service
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaitTime {
    Minutes(f64),
    /// The queue grows without bound (λ ≥ c·μ)
    Unstable,
}

impl WaitTime {
    pub fn minutes(&self) -> Option<f64> {
        match self {
            Self::Minutes(m) => Some(*m),
            Self::Unstable => None,
        }
    }

    pub fn is_unstable(&self) -> bool {
        matches!(self, Self::Unstable)
    }

    /// True when the wait is finite and no longer than `limit`
    pub fn within(&self, limit: f64) -> bool {
        self.minutes().is_some_and(|m| m <= limit)
    }
}

impl Serialize for WaitTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Minutes(m) => serializer.serialize_f64(*m),
            Self::Unstable => serializer.serialize_str("unstable"),
        }
    }
}

impl<'de> Deserialize<'de> for WaitTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(m) => Ok(Self::Minutes(m)),
            Raw::Text(s) if s.eq_ignore_ascii_case("unstable") => Ok(Self::Unstable),
            Raw::Text(s) => Err(serde::de::Error::custom(format!(
                "expected minutes or \"unstable\", got \"{}\"",
                s
            ))),
        }
    }
}

/// Arrival and service rates of a multi-server queue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueModel {
    /// λ, arrivals per hour
    pub arrival_rate: f64,
    /// μ, people served per hour by one agent
    pub service_rate: f64,
}

impl QueueModel {
    pub fn new(arrival_rate: f64, service_rate: f64) -> Self {
        Self {
            arrival_rate,
            service_rate,
        }
    }

    /// Offered load a = λ/μ in Erlangs; 0 when μ is not positive
    pub fn traffic_intensity(&self) -> f64 {
        if self.service_rate > 0.0 {
            self.arrival_rate / self.service_rate
        } else {
            0.0
        }
    }

    fn is_saturated(&self, agents: u32) -> bool {
        let intensity = self.traffic_intensity();
        agents == 0
            || self.service_rate.is_nan()
            || self.service_rate <= 0.0
            || !intensity.is_finite()
            || intensity < 0.0
            || intensity >= f64::from(agents)
    }

    /// Probability that an arrival has to queue (Erlang C), in [0, 1]
    pub fn probability_waiting(&self, agents: u32) -> f64 {
        if self.is_saturated(agents) {
            return 1.0;
        }

        let a = self.traffic_intensity();
        let rho = a / f64::from(agents);
        let blocking = erlang_b(a, agents);
        let erlang_c = blocking / (1.0 - rho * (1.0 - blocking));

        erlang_c.clamp(0.0, 1.0)
    }

    /// Mean queueing delay in minutes, `Unstable` unless λ < c·μ
    pub fn average_wait(&self, agents: u32) -> WaitTime {
        if self.is_saturated(agents) {
            return WaitTime::Unstable;
        }

        let capacity = f64::from(agents) * self.service_rate;
        let hours = self.probability_waiting(agents) / (capacity - self.arrival_rate);
        WaitTime::Minutes((hours * 60.0).max(0.0))
    }

    /// Fraction of agent time spent serving, a/c
    pub fn utilization(&self, agents: u32) -> f64 {
        if agents == 0 {
            return 0.0;
        }
        self.traffic_intensity() / f64::from(agents)
    }
}

/// Erlang B blocking probability `(a^c/c!) / Σ_{n=0..c} a^n/n!`.
///
/// Evaluated with the recurrence `B(n) = a·B(n-1) / (n + a·B(n-1))`, which
/// stays in [0, 1] and never forms the factorials or powers directly.
pub fn erlang_b(intensity: f64, agents: u32) -> f64 {
    (1..=agents).fold(1.0, |blocking, n| {
        let load = intensity * blocking;
        load / (f64::from(n) + load)
    })
}
