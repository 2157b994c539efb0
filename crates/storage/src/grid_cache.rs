//! Persistent cache of gridded-climate API responses.
//!
//! ## Key Structure
//! `(grid, lat, lng, date_start, date_end, api_url)`, a natural key backed by
//! a unique constraint. The requested element list is NOT part of the key:
//! changing the element list requires truncating `acis_responses`.
//!
//! ## Write Discipline
//! Inserts are insert-or-ignore. Two requests missing on the same key may
//! both fetch and both insert; the first stored body wins and the second
//! insert is a no-op, never an error.
//!
//! ## Expiry
//! `expires_at` is stored and returned but never enforced. Entries are
//! permanent until purged by an operator.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use metrics::counter;
use sqlx::{FromRow, PgPool};
use tracing::{debug, instrument};

use climate_common::{ClimateError, ClimateResult, Coordinate, DateRange};

use crate::database::Database;

/// Cache key for one upstream request.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct GridCacheKey {
    /// Upstream grid selector (e.g., "loca:wmean:rcp85")
    pub grid: String,
    /// Latitude in its canonical string form
    pub lat: String,
    /// Longitude in its canonical string form
    pub lng: String,
    pub date_range: DateRange,
    /// Endpoint the response was fetched from
    pub api_url: String,
}

impl GridCacheKey {
    pub fn new(
        grid: impl Into<String>,
        point: Coordinate,
        date_range: DateRange,
        api_url: impl Into<String>,
    ) -> Self {
        Self {
            grid: grid.into(),
            lat: point.lat_key(),
            lng: point.lng_key(),
            date_range,
            api_url: api_url.into(),
        }
    }
}

/// A stored upstream response body.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    /// Exact response text as received from upstream.
    pub body: String,
    pub created_at: DateTime<Utc>,
    /// Informational only; see module docs.
    pub expires_at: Option<NaiveDate>,
}

/// Storage for upstream responses keyed by [`GridCacheKey`].
#[async_trait]
pub trait GridResponseCache: Send + Sync {
    /// Look up a previously stored response.
    async fn get(&self, key: &GridCacheKey) -> ClimateResult<Option<CachedResponse>>;

    /// Store a response. Storing a key that already exists succeeds and
    /// leaves the existing body untouched.
    async fn put(&self, key: &GridCacheKey, body: &str) -> ClimateResult<()>;
}

/// `acis_responses`-table cache.
pub struct PgGridCache {
    pool: PgPool,
}

impl PgGridCache {
    pub fn new(database: &Database) -> Self {
        Self {
            pool: database.pool().clone(),
        }
    }
}

#[async_trait]
impl GridResponseCache for PgGridCache {
    #[instrument(skip(self), fields(grid = %key.grid, lat = %key.lat, lng = %key.lng))]
    async fn get(&self, key: &GridCacheKey) -> ClimateResult<Option<CachedResponse>> {
        let row = sqlx::query_as::<_, CacheRow>(
            "SELECT response, created_at, expires_at FROM acis_responses \
             WHERE grid = $1 AND lat = $2 AND lng = $3 \
             AND date_start = $4 AND date_end = $5 AND api_url = $6 \
             LIMIT 1",
        )
        .bind(&key.grid)
        .bind(&key.lat)
        .bind(&key.lng)
        .bind(key.date_range.start)
        .bind(key.date_range.end)
        .bind(&key.api_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ClimateError::Cache(format!("Cache lookup failed: {}", e)))?;

        Ok(row.map(|r| r.into()))
    }

    #[instrument(skip(self, body), fields(grid = %key.grid, lat = %key.lat, lng = %key.lng))]
    async fn put(&self, key: &GridCacheKey, body: &str) -> ClimateResult<()> {
        let result = sqlx::query(
            "INSERT INTO acis_responses \
             (grid, lat, lng, date_start, date_end, api_url, response) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT DO NOTHING",
        )
        .bind(&key.grid)
        .bind(&key.lat)
        .bind(&key.lng)
        .bind(key.date_range.start)
        .bind(key.date_range.end)
        .bind(&key.api_url)
        .bind(body)
        .execute(&self.pool)
        .await
        .map_err(|e| ClimateError::Cache(format!("Cache insert failed: {}", e)))?;

        if result.rows_affected() == 0 {
            counter!("grid_cache_duplicate_inserts_total").increment(1);
            debug!("Response already cached by a concurrent request");
        }

        Ok(())
    }
}

/// Internal row type for cache reads.
#[derive(FromRow)]
struct CacheRow {
    response: String,
    created_at: DateTime<Utc>,
    expires_at: Option<NaiveDate>,
}

impl From<CacheRow> for CachedResponse {
    fn from(row: CacheRow) -> Self {
        CachedResponse {
            body: row.response,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_uses_canonical_coordinate_strings() {
        let point = Coordinate::new(37.7576171, -122.3933185);
        let range = DateRange::for_year(2080).unwrap();
        let key = GridCacheKey::new("loca:wmean:rcp85", point, range, "https://grid2.rcc-acis.org/GridData");

        assert_eq!(key.lat, "37.7576171");
        assert_eq!(key.lng, "-122.3933185");
        assert_eq!(key.date_range.start_str(), "2080-01-01");
    }

    #[test]
    fn test_keys_differ_by_every_component() {
        let point = Coordinate::new(40.0, -75.0);
        let range = DateRange::for_year(2050).unwrap();
        let base = GridCacheKey::new("loca:wmean:rcp45", point, range, "https://a/GridData");

        let variants = [
            GridCacheKey::new("loca:wmean:rcp85", point, range, "https://a/GridData"),
            GridCacheKey::new("loca:wmean:rcp45", Coordinate::new(40.1, -75.0), range, "https://a/GridData"),
            GridCacheKey::new("loca:wmean:rcp45", Coordinate::new(40.0, -75.1), range, "https://a/GridData"),
            GridCacheKey::new("loca:wmean:rcp45", point, DateRange::for_year(2051).unwrap(), "https://a/GridData"),
            GridCacheKey::new("loca:wmean:rcp45", point, range, "https://b/GridData"),
        ];

        for variant in variants {
            assert_ne!(base, variant);
        }
    }
}
