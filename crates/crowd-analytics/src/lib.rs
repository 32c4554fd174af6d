//! Crowd analytics and capacity planning over per-frame occupancy samples.
//!
//! [`CrowdAnalyticsEngine::analyze`] turns a time-ordered sample series into
//! an [`AnalyticsReport`]: density tiers, a 3x3 zone distribution,
//! bottleneck periods, chart buckets, flow metrics and, given a resource
//! snapshot, Erlang C staffing and bed recommendations.

pub mod analyzer;
pub mod capacity;
pub mod config;
pub mod digest;
pub mod error;
pub mod report;
pub mod store;

pub use analyzer::SeriesAnalyzer;
pub use capacity::erlang::{QueueModel, WaitTime};
pub use capacity::{Alert, AlertLevel, CapacityReport, CapacityStatus};
pub use config::{EngineConfig, StaffingObjective};
pub use digest::{ReportDigest, ReportReader};
pub use error::{ConfigError, StoreError};
pub use report::{AnalysisContext, AnalyticsReport, CrowdAnalyticsEngine};
pub use store::{AnalysisId, MemoryReportStore, ReportStore};
