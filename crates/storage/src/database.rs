//! PostgreSQL/PostGIS connection pool and schema bootstrap.

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use climate_common::{ClimateError, ClimateResult};

/// Database connection pool shared by the projection store and the
/// gridded-response cache.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new connection pool from a database URL.
    pub async fn connect(database_url: &str, max_connections: u32) -> ClimateResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| ClimateError::Database(format!("Connection failed: {}", e)))?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the projection tables and the response cache table if missing.
    ///
    /// Rows are loaded by a separate offline step; this only guarantees the
    /// tables, spatial indexes and the cache uniqueness constraint exist.
    pub async fn migrate(&self) -> ClimateResult<()> {
        // Split SQL statements and execute them individually
        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| ClimateError::Database(format!("Migration failed: {}", e)))?;
            }
        }

        info!("Database schema is up to date");
        Ok(())
    }

    /// Round-trip a trivial query, used by the readiness probe.
    pub async fn ping(&self) -> ClimateResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ClimateError::Database(format!("Ping failed: {}", e)))?;
        Ok(())
    }
}

/// Database schema SQL.
pub(crate) const SCHEMA_SQL: &str = r#"
CREATE EXTENSION IF NOT EXISTS postgis;

CREATE TABLE IF NOT EXISTS temperatures_cmip5 (
    id SERIAL PRIMARY KEY,
    place_name TEXT NOT NULL,
    attribute TEXT NOT NULL,
    year_start INTEGER NOT NULL,
    year_end INTEGER NOT NULL,
    lat DOUBLE PRECISION NOT NULL,
    lon DOUBLE PRECISION NOT NULL,
    geography GEOGRAPHY(POINT, 4326) NOT NULL,
    observed_warming DOUBLE PRECISION NOT NULL,
    model_26_warming DOUBLE PRECISION NOT NULL,
    model_45_warming DOUBLE PRECISION NOT NULL,
    model_60_warming DOUBLE PRECISION NOT NULL,
    model_85_warming DOUBLE PRECISION NOT NULL
);

CREATE TABLE IF NOT EXISTS noaa_projections (
    id SERIAL PRIMARY KEY,
    place_name TEXT NOT NULL,
    attribute TEXT NOT NULL,
    year INTEGER NOT NULL,
    lat DOUBLE PRECISION NOT NULL,
    lon DOUBLE PRECISION NOT NULL,
    geography GEOGRAPHY(POINT, 4326) NOT NULL,
    rcp45_weighted_mean DOUBLE PRECISION NOT NULL,
    rcp45_min DOUBLE PRECISION NOT NULL,
    rcp45_max DOUBLE PRECISION NOT NULL,
    rcp85_weighted_mean DOUBLE PRECISION NOT NULL,
    rcp85_min DOUBLE PRECISION NOT NULL,
    rcp85_max DOUBLE PRECISION NOT NULL
);

CREATE TABLE IF NOT EXISTS noaa_observations (
    id SERIAL PRIMARY KEY,
    place_name TEXT NOT NULL,
    attribute TEXT NOT NULL,
    year_start INTEGER NOT NULL,
    year_end INTEGER NOT NULL,
    lat DOUBLE PRECISION NOT NULL,
    lon DOUBLE PRECISION NOT NULL,
    geography GEOGRAPHY(POINT, 4326) NOT NULL,
    avg_temp_max_f DOUBLE PRECISION NOT NULL,
    num_days_above_100f DOUBLE PRECISION NOT NULL,
    num_dry_days DOUBLE PRECISION NOT NULL
);

CREATE TABLE IF NOT EXISTS climate_central_sea_levels (
    id SERIAL PRIMARY KEY,
    place_name TEXT NOT NULL,
    attribute TEXT NOT NULL,
    year INTEGER NOT NULL,
    lat DOUBLE PRECISION NOT NULL,
    lon DOUBLE PRECISION NOT NULL,
    geography GEOGRAPHY(POINT, 4326) NOT NULL,
    rcp26 DOUBLE PRECISION NOT NULL,
    rcp45 DOUBLE PRECISION NOT NULL,
    rcp85 DOUBLE PRECISION NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_temperatures_cmip5_geography ON temperatures_cmip5 USING GIST (geography);
CREATE INDEX IF NOT EXISTS idx_noaa_projections_geography ON noaa_projections USING GIST (geography);
CREATE INDEX IF NOT EXISTS idx_noaa_observations_geography ON noaa_observations USING GIST (geography);
CREATE INDEX IF NOT EXISTS idx_sea_levels_geography ON climate_central_sea_levels USING GIST (geography);

CREATE TABLE IF NOT EXISTS acis_responses (
    id BIGSERIAL PRIMARY KEY,
    grid TEXT NOT NULL,
    lat TEXT NOT NULL,
    lng TEXT NOT NULL,
    date_start DATE NOT NULL,
    date_end DATE NOT NULL,
    api_url TEXT NOT NULL,
    response TEXT NOT NULL,
    expires_at DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    UNIQUE(grid, lat, lng, date_start, date_end, api_url)
);
"#;
