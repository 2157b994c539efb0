//! In-memory implementations of the projection store and response cache.
//!
//! Rows are scanned linearly with haversine distances, which is fine for
//! fixture-sized datasets. Matching rules are identical to the PostGIS
//! store: a row qualifies only within the distance bound, the nearest
//! qualifying row wins, and ties keep insertion order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use climate_common::{
    ClimateResult, Coordinate, NoaaAttribute, NoaaProjection, ProjectionRecord, SeaLevelRisk,
    TemperatureIncrease,
};

use crate::grid_cache::{CachedResponse, GridCacheKey, GridResponseCache};
use crate::projections::{NearestQuery, ProjectionStore, SpatialSource};

/// A row of observed 1950-2013 averages.
#[derive(Debug, Clone, PartialEq)]
pub struct NoaaObservation {
    pub place_name: String,
    pub lat: f64,
    pub lon: f64,
    pub avg_temp_max_f: f64,
    pub num_days_above_100f: f64,
    pub num_dry_days: f64,
}

impl NoaaObservation {
    fn baseline(&self, attribute: NoaaAttribute) -> f64 {
        match attribute {
            NoaaAttribute::NumDaysAbove100f => self.num_days_above_100f,
            NoaaAttribute::NumDryDays => self.num_dry_days,
        }
    }
}

/// Projection store over rows held in memory.
#[derive(Debug, Default)]
pub struct MemoryProjectionStore {
    temperatures: Vec<TemperatureIncrease>,
    noaa_projections: Vec<(NoaaAttribute, NoaaProjection)>,
    observations: Vec<NoaaObservation>,
    sea_levels: Vec<SeaLevelRisk>,
    queries: AtomicU64,
}

impl MemoryProjectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, row: TemperatureIncrease) -> Self {
        self.temperatures.push(row);
        self
    }

    pub fn with_noaa_projection(mut self, attribute: NoaaAttribute, row: NoaaProjection) -> Self {
        self.noaa_projections.push((attribute, row));
        self
    }

    pub fn with_observation(mut self, row: NoaaObservation) -> Self {
        self.observations.push(row);
        self
    }

    pub fn with_sea_level(mut self, row: SeaLevelRisk) -> Self {
        self.sea_levels.push(row);
        self
    }

    /// Number of lookups served so far.
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }
}

/// Nearest row within `max_distance_m`; the first of equally distant rows wins.
fn nearest<'a, T>(
    rows: impl Iterator<Item = &'a T>,
    point: &Coordinate,
    max_distance_m: f64,
    location: impl Fn(&T) -> Coordinate,
) -> Option<&'a T> {
    let mut best: Option<(&T, f64)> = None;
    for row in rows {
        let distance = point.distance_meters(&location(row));
        if distance > max_distance_m {
            continue;
        }
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((row, distance)),
        }
    }
    best.map(|(row, _)| row)
}

#[async_trait]
impl ProjectionStore for MemoryProjectionStore {
    async fn query_nearest(&self, query: &NearestQuery) -> ClimateResult<Option<ProjectionRecord>> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        let point = &query.point;

        let record = match query.source {
            SpatialSource::TemperatureIncrease => nearest(
                self.temperatures.iter().filter(|t| t.year_start <= query.year),
                point,
                query.max_distance_m,
                |t| Coordinate::new(t.lat, t.lon),
            )
            .map(|t| ProjectionRecord::TemperatureIncrease(t.clone())),
            SpatialSource::NoaaProjection(attribute) => {
                let projection = nearest(
                    self.noaa_projections
                        .iter()
                        .filter(|(a, p)| *a == attribute && p.year == query.year),
                    point,
                    query.max_distance_m,
                    |(_, p)| Coordinate::new(p.lat, p.lon),
                );
                projection.map(|(_, p)| {
                    let baseline = nearest(
                        self.observations.iter(),
                        point,
                        query.baseline_max_distance_m,
                        |o| Coordinate::new(o.lat, o.lon),
                    );
                    let mut projection = p.clone();
                    projection.historical_average = baseline.map(|o| o.baseline(attribute));
                    ProjectionRecord::noaa(attribute, projection)
                })
            }
            SpatialSource::SeaLevelRisk => nearest(
                self.sea_levels.iter().filter(|s| s.year == query.year),
                point,
                query.max_distance_m,
                |s| Coordinate::new(s.lat, s.lon),
            )
            .map(|s| ProjectionRecord::CoastalFloodingSingleYear5ft(s.clone())),
        };

        Ok(record)
    }
}

/// Response cache held in memory. First write per key wins.
#[derive(Default)]
pub struct MemoryGridCache {
    entries: RwLock<HashMap<GridCacheKey, CachedResponse>>,
    gets: AtomicU64,
    puts: AtomicU64,
}

impl MemoryGridCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub fn get_count(&self) -> u64 {
        self.gets.load(Ordering::Relaxed)
    }

    pub fn put_count(&self) -> u64 {
        self.puts.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl GridResponseCache for MemoryGridCache {
    async fn get(&self, key: &GridCacheKey) -> ClimateResult<Option<CachedResponse>> {
        self.gets.fetch_add(1, Ordering::Relaxed);
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &GridCacheKey, body: &str) -> ClimateResult<()> {
        self.puts.fetch_add(1, Ordering::Relaxed);
        let mut entries = self.entries.write().await;
        entries.entry(key.clone()).or_insert_with(|| CachedResponse {
            body: body.to_string(),
            created_at: Utc::now(),
            expires_at: None,
        });
        Ok(())
    }
}
