//! Caller-owned cache of finished reports keyed by analysis id.
//!
//! The engine never reads or writes a store; callers decide what to keep.

use crate::error::StoreError;
use crate::report::AnalyticsReport;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisId(Uuid);

impl AnalysisId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AnalysisId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for AnalysisId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Storage for analytics reports
pub trait ReportStore: Send + Sync {
    /// Store a report under a fresh id
    fn insert(&self, report: AnalyticsReport) -> Result<AnalysisId, StoreError>;

    fn get(&self, id: &AnalysisId) -> Result<Option<AnalyticsReport>, StoreError>;

    /// Remove and return a report, `NotFound` if it was never stored
    fn remove(&self, id: &AnalysisId) -> Result<AnalyticsReport, StoreError>;

    /// All stored ids in ascending order
    fn list_ids(&self) -> Result<Vec<AnalysisId>, StoreError>;

    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// In-memory report store; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryReportStore {
    reports: Arc<RwLock<HashMap<AnalysisId, AnalyticsReport>>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_report<T>(
        &self,
        id: &AnalysisId,
        f: impl FnOnce(&AnalyticsReport) -> T,
    ) -> Result<T, StoreError> {
        let reports = self
            .reports
            .read()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        reports
            .get(id)
            .map(f)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

impl ReportStore for MemoryReportStore {
    fn insert(&self, report: AnalyticsReport) -> Result<AnalysisId, StoreError> {
        let id = AnalysisId::new();
        self.reports
            .write()
            .map_err(|e| StoreError::Lock(e.to_string()))?
            .insert(id, report);
        tracing::debug!(analysis_id = %id, "stored analytics report");
        Ok(id)
    }

    fn get(&self, id: &AnalysisId) -> Result<Option<AnalyticsReport>, StoreError> {
        let reports = self
            .reports
            .read()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        Ok(reports.get(id).cloned())
    }

    fn remove(&self, id: &AnalysisId) -> Result<AnalyticsReport, StoreError> {
        self.reports
            .write()
            .map_err(|e| StoreError::Lock(e.to_string()))?
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn list_ids(&self) -> Result<Vec<AnalysisId>, StoreError> {
        let reports = self
            .reports
            .read()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        let mut ids: Vec<AnalysisId> = reports.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self
            .reports
            .read()
            .map_err(|e| StoreError::Lock(e.to_string()))?
            .len())
    }
}
