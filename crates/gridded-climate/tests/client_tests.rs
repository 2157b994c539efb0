//! Tests for GriddedClimateClient against a scripted upstream and the
//! in-memory response cache.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use climate_common::{ClimateError, ClimateResult, Coordinate, GriddedAttribute, ProjectionRecord};
use gridded_climate::{GridDataApi, GridDataRequest, GridFetch, GriddedClimateClient, Scenario};
use storage::MemoryGridCache;

const ENDPOINT: &str = "http://grid.test/GridData";
const VOID: &str = r#"{"status": "Invalid request.", "error": "bad ur"}"#;

/// Upstream that answers by grid name and counts calls.
#[derive(Default)]
struct ScriptedApi {
    bodies: Mutex<HashMap<String, String>>,
    calls: AtomicU64,
}

impl ScriptedApi {
    fn with(self, grid: &str, body: &str) -> Self {
        self.bodies
            .lock()
            .unwrap()
            .insert(grid.to_string(), body.to_string());
        self
    }

    fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GridDataApi for ScriptedApi {
    fn endpoint(&self) -> &str {
        ENDPOINT
    }

    async fn fetch(&self, request: &GridDataRequest) -> ClimateResult<GridFetch> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = self
            .bodies
            .lock()
            .unwrap()
            .get(&request.grid)
            .cloned()
            .ok_or_else(|| ClimateError::Upstream(format!("no script for {}", request.grid)))?;
        if body == VOID {
            Ok(GridFetch::NoData(body))
        } else {
            Ok(GridFetch::Data(body))
        }
    }
}

fn san_francisco() -> Coordinate {
    Coordinate::new(37.7576171, -122.3933185)
}

fn historical_body() -> &'static str {
    r#"{"data": [
        ["1950", 1, 40, 60.0, 4, 220, 20.0],
        ["1951", 3, 42, 62.0, 6, 240, 24.0]
    ]}"#
}

fn client(api: Arc<ScriptedApi>, cache: Arc<MemoryGridCache>) -> GriddedClimateClient {
    GriddedClimateClient::new(api, cache).unwrap()
}

// ============================================================================
// Cache behavior
// ============================================================================

#[tokio::test]
async fn test_cache_hit_skips_upstream() {
    let api = Arc::new(
        ScriptedApi::default().with("loca:wmean:rcp85", r#"{"data": [["2080", 3, 41, 61.5, 2, 230, 22.07]]}"#),
    );
    let cache = Arc::new(MemoryGridCache::new());
    let client = client(api.clone(), cache.clone());

    let first = client
        .get_projection(san_francisco(), 2080, Scenario::Rcp85)
        .await
        .unwrap();
    let second = client
        .get_projection(san_francisco(), 2080, Scenario::Rcp85)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(api.calls(), 1);
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_cache_key_includes_year() {
    let api = Arc::new(ScriptedApi::default().with("loca:wmean:rcp45", VOID));
    let cache = Arc::new(MemoryGridCache::new());
    let client = client(api.clone(), cache.clone());

    client.get_projection(san_francisco(), 2050, Scenario::Rcp45).await.unwrap();
    client.get_projection(san_francisco(), 2080, Scenario::Rcp45).await.unwrap();

    assert_eq!(api.calls(), 2);
    assert_eq!(cache.len().await, 2);
}

#[tokio::test]
async fn test_data_void_is_cached_and_empty() {
    let api = Arc::new(
        ScriptedApi::default()
            .with("loca:wmean:rcp45", VOID)
            .with("loca:wmean:rcp85", VOID)
            .with("livneh", VOID),
    );
    let cache = Arc::new(MemoryGridCache::new());
    let client = client(api.clone(), cache.clone());

    let point = Coordinate::new(40.0, -30.0);
    assert!(client.get_results(point, 2080).await.unwrap().is_empty());
    assert_eq!(api.calls(), 3);

    assert!(client.get_results(point, 2080).await.unwrap().is_empty());
    assert_eq!(api.calls(), 3);
    assert_eq!(cache.len().await, 3);
}

#[tokio::test]
async fn test_upstream_failure_is_not_cached() {
    let api = Arc::new(ScriptedApi::default());
    let cache = Arc::new(MemoryGridCache::new());
    let client = client(api.clone(), cache.clone());

    let result = client.get_projection(san_francisco(), 2080, Scenario::Rcp45).await;

    assert!(matches!(result, Err(ClimateError::Upstream(_))));
    assert!(cache.is_empty().await);
}

// ============================================================================
// Merged results
// ============================================================================

#[tokio::test]
async fn test_results_merge_all_three_sources() {
    let api = Arc::new(
        ScriptedApi::default()
            .with("loca:wmean:rcp45", r#"{"data": [["2080", 2, 30, 60.5, 3, 220, 21.0]]}"#)
            .with("loca:wmean:rcp85", r#"{"data": [["2080", 3, 41, 61.5, 2, 230, 22.07]]}"#)
            .with("livneh", historical_body()),
    );
    let client = client(api.clone(), Arc::new(MemoryGridCache::new()));

    let records = client.get_results(san_francisco(), 2080).await.unwrap();

    assert_eq!(records.len(), 6);
    assert_eq!(api.calls(), 3);

    let attributes: Vec<_> = records.iter().map(|r| r.attribute()).collect();
    assert_eq!(
        attributes,
        vec![
            GriddedAttribute::TempNumDaysAbove100f.as_str(),
            GriddedAttribute::TempNumDaysAbove90f.as_str(),
            GriddedAttribute::TempAvg.as_str(),
            GriddedAttribute::TempNumDaysBelow32f.as_str(),
            GriddedAttribute::PrecipitationNumDryDays.as_str(),
            GriddedAttribute::PrecipitationTotal.as_str(),
        ]
    );

    match &records[2] {
        ProjectionRecord::TempAvg(p) => {
            assert_eq!(p.rcp45_mean, 60.5);
            assert_eq!(p.rcp85_mean, 61.5);
            assert_eq!(p.historical_average, 61.0);
        }
        other => panic!("unexpected record {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_projection_value_omits_attribute() {
    let api = Arc::new(
        ScriptedApi::default()
            .with("loca:wmean:rcp45", r#"{"data": [["2080", 2, 30, 60.5, 3, 220, 21.0]]}"#)
            .with("loca:wmean:rcp85", r#"{"data": [["2080", 3, -999, 61.5, 2, 230, 22.07]]}"#)
            .with("livneh", historical_body()),
    );
    let client = client(api, Arc::new(MemoryGridCache::new()));

    let records = client.get_results(san_francisco(), 2080).await.unwrap();

    assert_eq!(records.len(), 5);
    assert!(records
        .iter()
        .all(|r| r.attribute() != GriddedAttribute::TempNumDaysAbove90f.as_str()));
}

#[tokio::test]
async fn test_missing_historical_value_fails_request() {
    let api = Arc::new(
        ScriptedApi::default()
            .with("loca:wmean:rcp45", r#"{"data": [["2080", 2, 30, 60.5, 3, 220, 21.0]]}"#)
            .with("loca:wmean:rcp85", r#"{"data": [["2080", 3, 41, 61.5, 2, 230, 22.07]]}"#)
            .with(
                "livneh",
                r#"{"data": [["1950", 1, 40, 60.0, 4, 220, 20.0], ["1951", 3, 42, 62.0, -999, 240, 24.0]]}"#,
            ),
    );
    let client = client(api, Arc::new(MemoryGridCache::new()));

    let result = client.get_results(san_francisco(), 2080).await;
    assert!(matches!(result, Err(ClimateError::DataContract(_))));
}

#[tokio::test]
async fn test_year_mismatch_fails_request() {
    let api = Arc::new(
        ScriptedApi::default()
            .with("loca:wmean:rcp45", r#"{"data": [["2079", 2, 30, 60.5, 3, 220, 21.0]]}"#)
            .with("loca:wmean:rcp85", r#"{"data": [["2080", 3, 41, 61.5, 2, 230, 22.07]]}"#)
            .with("livneh", historical_body()),
    );
    let client = client(api, Arc::new(MemoryGridCache::new()));

    let result = client.get_results(san_francisco(), 2080).await;
    assert!(matches!(result, Err(ClimateError::DataContract(_))));
}

#[tokio::test]
async fn test_historical_range_is_fixed() {
    let client = client(Arc::new(ScriptedApi::default()), Arc::new(MemoryGridCache::new()));
    let range = client.historical_range();

    assert_eq!(range.start_str(), "1950-01-01");
    assert_eq!(range.end_str(), "2013-01-01");
}
