//! Nearest-record lookups over the climate projection tables.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::{debug, instrument};

use climate_common::{
    ClimateError, ClimateResult, Coordinate, NoaaAttribute, NoaaProjection, ProjectionRecord,
    SeaLevelRisk, TemperatureIncrease,
};

use crate::database::Database;

/// Which table (and which discriminator within it) a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialSource {
    /// `temperatures_cmip5`, rows whose period starts on or before the year.
    TemperatureIncrease,
    /// `noaa_projections` for one attribute and exact year, with the
    /// nearest `noaa_observations` baseline.
    NoaaProjection(NoaaAttribute),
    /// `climate_central_sea_levels` for the exact year.
    SeaLevelRisk,
}

impl SpatialSource {
    pub fn table(&self) -> &'static str {
        match self {
            SpatialSource::TemperatureIncrease => "temperatures_cmip5",
            SpatialSource::NoaaProjection(_) => "noaa_projections",
            SpatialSource::SeaLevelRisk => "climate_central_sea_levels",
        }
    }
}

/// A single "nearest row within distance" lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestQuery {
    pub source: SpatialSource,
    pub point: Coordinate,
    pub year: i32,
    /// Rows farther than this (meters) are never returned.
    pub max_distance_m: f64,
    /// Bound for the correlated baseline lookup; only NOAA sources use it.
    pub baseline_max_distance_m: f64,
}

impl NearestQuery {
    pub fn new(source: SpatialSource, point: Coordinate, year: i32, max_distance_m: f64) -> Self {
        Self {
            source,
            point,
            year,
            max_distance_m,
            baseline_max_distance_m: max_distance_m,
        }
    }

    pub fn with_baseline_distance(mut self, baseline_max_distance_m: f64) -> Self {
        self.baseline_max_distance_m = baseline_max_distance_m;
        self
    }
}

/// Read-only spatial index over the projection tables.
#[async_trait]
pub trait ProjectionStore: Send + Sync {
    /// Return the nearest matching row within `max_distance_m`, normalized,
    /// or `None` when nothing is in range.
    async fn query_nearest(&self, query: &NearestQuery) -> ClimateResult<Option<ProjectionRecord>>;
}

/// PostGIS-backed projection store.
///
/// Distances are computed on `geography` columns, so every bound is in
/// meters on the spheroid. The query point is always a bound parameter.
pub struct PgProjectionStore {
    pool: PgPool,
}

impl PgProjectionStore {
    pub fn new(database: &Database) -> Self {
        Self {
            pool: database.pool().clone(),
        }
    }

    async fn nearest_temperature(&self, query: &NearestQuery) -> ClimateResult<Option<ProjectionRecord>> {
        let row = sqlx::query_as::<_, TemperatureRow>(NEAREST_TEMPERATURE_SQL)
            .bind(query.point.longitude)
            .bind(query.point.latitude)
            .bind(query.year)
            .bind(query.max_distance_m)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ClimateError::Database(format!("Query failed: {}", e)))?;

        Ok(row.map(|r| ProjectionRecord::TemperatureIncrease(r.into())))
    }

    async fn nearest_noaa(
        &self,
        attribute: NoaaAttribute,
        query: &NearestQuery,
    ) -> ClimateResult<Option<ProjectionRecord>> {
        let row = sqlx::query_as::<_, NoaaProjectionRow>(NEAREST_NOAA_SQL)
            .bind(query.point.longitude)
            .bind(query.point.latitude)
            .bind(attribute.as_str())
            .bind(query.year)
            .bind(query.max_distance_m)
            .bind(query.baseline_max_distance_m)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ClimateError::Database(format!("Query failed: {}", e)))?;

        Ok(row.map(|r| ProjectionRecord::noaa(attribute, r.into())))
    }

    async fn nearest_sea_level(&self, query: &NearestQuery) -> ClimateResult<Option<ProjectionRecord>> {
        let row = sqlx::query_as::<_, SeaLevelRow>(NEAREST_SEA_LEVEL_SQL)
            .bind(query.point.longitude)
            .bind(query.point.latitude)
            .bind(query.year)
            .bind(query.max_distance_m)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ClimateError::Database(format!("Query failed: {}", e)))?;

        Ok(row.map(|r| ProjectionRecord::CoastalFloodingSingleYear5ft(r.into())))
    }
}

#[async_trait]
impl ProjectionStore for PgProjectionStore {
    #[instrument(skip(self), fields(table = query.source.table(), year = query.year))]
    async fn query_nearest(&self, query: &NearestQuery) -> ClimateResult<Option<ProjectionRecord>> {
        let record = match query.source {
            SpatialSource::TemperatureIncrease => self.nearest_temperature(query).await?,
            SpatialSource::NoaaProjection(attribute) => self.nearest_noaa(attribute, query).await?,
            SpatialSource::SeaLevelRisk => self.nearest_sea_level(query).await?,
        };

        debug!(found = record.is_some(), "Nearest record lookup complete");
        Ok(record)
    }
}

// $1 = lng, $2 = lat, $3 = year, $4 = max distance (m)
const NEAREST_TEMPERATURE_SQL: &str = r#"
WITH q AS (SELECT ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography AS point)
SELECT t.place_name, t.year_start, t.year_end, t.lat, t.lon,
       t.observed_warming, t.model_26_warming, t.model_45_warming,
       t.model_60_warming, t.model_85_warming
FROM temperatures_cmip5 t, q
WHERE t.attribute = 'temperature_increase'
  AND t.year_start <= $3
  AND ST_DWithin(t.geography, q.point, $4)
ORDER BY t.geography <-> q.point, t.id
LIMIT 1
"#;

// $1 = lng, $2 = lat, $3 = attribute, $4 = year, $5 = max distance (m),
// $6 = baseline max distance (m). The baseline shares the query point and
// has no year filter.
const NEAREST_NOAA_SQL: &str = r#"
WITH q AS (SELECT ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography AS point)
SELECT p.place_name, p.year, p.lat, p.lon,
       p.rcp45_weighted_mean, p.rcp45_min, p.rcp45_max,
       p.rcp85_weighted_mean, p.rcp85_min, p.rcp85_max,
       (
           SELECT CASE $3
                      WHEN 'num_days_above_100f' THEN o.num_days_above_100f
                      WHEN 'num_dry_days' THEN o.num_dry_days
                  END
           FROM noaa_observations o
           WHERE ST_DWithin(o.geography, q.point, $6)
           ORDER BY o.geography <-> q.point, o.id
           LIMIT 1
       ) AS historical_average
FROM noaa_projections p, q
WHERE p.attribute = $3
  AND p.year = $4
  AND ST_DWithin(p.geography, q.point, $5)
ORDER BY p.geography <-> q.point, p.id
LIMIT 1
"#;

// $1 = lng, $2 = lat, $3 = year, $4 = max distance (m)
const NEAREST_SEA_LEVEL_SQL: &str = r#"
WITH q AS (SELECT ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography AS point)
SELECT s.place_name, s.year, s.lat, s.lon, s.rcp26, s.rcp45, s.rcp85
FROM climate_central_sea_levels s, q
WHERE s.attribute = 'coastal_flooding_single_year_5ft'
  AND s.year = $3
  AND ST_DWithin(s.geography, q.point, $4)
ORDER BY s.geography <-> q.point, s.id
LIMIT 1
"#;

/// Internal row type for `temperatures_cmip5`.
#[derive(FromRow)]
struct TemperatureRow {
    place_name: String,
    year_start: i32,
    year_end: i32,
    lat: f64,
    lon: f64,
    observed_warming: f64,
    model_26_warming: f64,
    model_45_warming: f64,
    model_60_warming: f64,
    model_85_warming: f64,
}

impl From<TemperatureRow> for TemperatureIncrease {
    fn from(row: TemperatureRow) -> Self {
        TemperatureIncrease {
            place_name: row.place_name,
            year_start: row.year_start,
            year_end: row.year_end,
            lat: row.lat,
            lon: row.lon,
            observed_warming: row.observed_warming,
            model_26_warming: row.model_26_warming,
            model_45_warming: row.model_45_warming,
            model_60_warming: row.model_60_warming,
            model_85_warming: row.model_85_warming,
        }
    }
}

/// Internal row type for `noaa_projections` joined with its baseline.
#[derive(FromRow)]
struct NoaaProjectionRow {
    place_name: String,
    year: i32,
    lat: f64,
    lon: f64,
    rcp45_weighted_mean: f64,
    rcp45_min: f64,
    rcp45_max: f64,
    rcp85_weighted_mean: f64,
    rcp85_min: f64,
    rcp85_max: f64,
    historical_average: Option<f64>,
}

impl From<NoaaProjectionRow> for NoaaProjection {
    fn from(row: NoaaProjectionRow) -> Self {
        NoaaProjection {
            place_name: row.place_name,
            year: row.year,
            lat: row.lat,
            lon: row.lon,
            rcp45_weighted_mean: row.rcp45_weighted_mean,
            rcp45_min: row.rcp45_min,
            rcp45_max: row.rcp45_max,
            rcp85_weighted_mean: row.rcp85_weighted_mean,
            rcp85_min: row.rcp85_min,
            rcp85_max: row.rcp85_max,
            historical_average: row.historical_average,
        }
    }
}

/// Internal row type for `climate_central_sea_levels`.
#[derive(FromRow)]
struct SeaLevelRow {
    place_name: String,
    year: i32,
    lat: f64,
    lon: f64,
    rcp26: f64,
    rcp45: f64,
    rcp85: f64,
}

impl From<SeaLevelRow> for SeaLevelRisk {
    fn from(row: SeaLevelRow) -> Self {
        SeaLevelRisk {
            place_name: row.place_name,
            year: row.year,
            lat: row.lat,
            lon: row.lon,
            rcp26: row.rcp26,
            rcp45: row.rcp45,
            rcp85: row.rcp85,
        }
    }
}
