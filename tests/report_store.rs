//! Report caching and the summarizer read interface, through the facade crate

use anyhow::Result;
use crowd_capacity::common::resources::ResourceState;
use crowd_capacity::common::samples::Sample;
use crowd_capacity::{
    AnalysisContext, AnalysisId, CrowdAnalyticsEngine, EngineConfig, MemoryReportStore,
    ReportReader, ReportStore, StoreError,
};
use std::sync::Arc;
use std::thread;

fn samples(counts: &[i64]) -> Vec<Sample> {
    counts
        .iter()
        .enumerate()
        .map(|(i, &c)| Sample::new(i as u64, i as f64 * 2.0, c))
        .collect()
}

#[test]
fn stored_report_round_trips_through_json() -> Result<()> {
    let engine = CrowdAnalyticsEngine::new(EngineConfig::default())?;
    let context = AnalysisContext::default()
        .with_duration(900.0)
        .with_resources(ResourceState::default());
    let report = engine.analyze(&samples(&[3, 4, 8, 12, 12, 13, 4, 2]), &context);

    let json = serde_json::to_value(&report)?;
    assert!(json["capacity"]["staffing_analysis"]["recommended_nurses"].is_u64());
    assert!(json["bottleneck_analysis"]["bottleneck_periods"].is_array());
    assert_eq!(json["crowd_density"]["density_level"], "Very Low");

    let store = MemoryReportStore::new();
    let id = store.insert(serde_json::from_value(json)?)?;
    let restored = store
        .get(&id)?
        .ok_or_else(|| anyhow::anyhow!("report missing"))?;

    assert_eq!(restored.sample_count, report.sample_count);
    assert_eq!(restored.peak_occupancy(), report.peak_occupancy());
    assert_eq!(
        restored.bottleneck_analysis.bottleneck_periods.len(),
        report.bottleneck_analysis.bottleneck_periods.len()
    );
    let (restored, original) = match (restored.capacity, report.capacity) {
        (Some(restored), Some(original)) => (restored, original),
        _ => anyhow::bail!("capacity missing"),
    };
    assert_eq!(
        restored.staffing_analysis.recommended_nurses,
        original.staffing_analysis.recommended_nurses
    );
    assert_eq!(restored.critical_alerts, original.critical_alerts);
    assert_eq!(restored.overall_status, original.overall_status);
    Ok(())
}

#[test]
fn digest_exposes_headline_facts() -> Result<()> {
    crowd_capacity::telemetry::init();
    let engine = CrowdAnalyticsEngine::new(EngineConfig::default())?;
    let report = engine.analyze(&samples(&[2, 4, 6, 8, 10]), &AnalysisContext::default());

    let store = MemoryReportStore::new();
    let id = store.insert(report)?;

    let reader: &dyn ReportReader = &store;
    let digest = reader.digest(&id)?;
    assert_eq!(digest.sample_count, 5);
    assert_eq!(digest.average_occupancy, 6.0);
    assert_eq!(digest.peak_occupancy, 10);
    assert!(digest.capacity.is_none());

    assert!(matches!(
        reader.digest(&AnalysisId::new()),
        Err(StoreError::NotFound(_))
    ));
    Ok(())
}

#[test]
fn concurrent_analyses_share_one_store() -> Result<()> {
    let engine = Arc::new(CrowdAnalyticsEngine::new(EngineConfig::default())?);
    let store = MemoryReportStore::new();

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let engine = Arc::clone(&engine);
            let store = store.clone();
            thread::spawn(move || -> Result<AnalysisId, StoreError> {
                let report = engine.analyze(&samples(&[n, n + 1, n + 2]), &AnalysisContext::default());
                store.insert(report)
            })
        })
        .collect();

    for handle in handles {
        let joined = handle
            .join()
            .map_err(|_| anyhow::anyhow!("analysis thread panicked"))?;
        joined?;
    }

    assert_eq!(store.len()?, 8);
    assert_eq!(store.list_ids()?.len(), 8);
    Ok(())
}
