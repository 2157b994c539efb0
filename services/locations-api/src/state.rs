//! Application state for the Locations API.

use std::sync::Arc;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use geocoding::GoogleGeocoder;
use gridded_climate::{AcisGridApi, GriddedClimateClient};
use storage::{Database, PgGridCache, PgProjectionStore};

use crate::aggregation::AggregationService;
use crate::config::ServiceConfig;

/// Shared application state.
pub struct AppState {
    pub aggregation: AggregationService,

    /// Database handle for readiness checks. `None` when running on
    /// in-memory stores.
    pub database: Option<Database>,

    /// Renders `/metrics`. `None` when no recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Create the state with production collaborators sharing `database`.
    pub fn new(config: &ServiceConfig, database: Database) -> Result<Self> {
        let geocoder = GoogleGeocoder::new(
            config.geocode_url.as_str(),
            config.google_maps_key.as_str(),
            config.http_timeout,
        )?;
        let grid_api = AcisGridApi::new(config.grid_data_url.as_str(), config.http_timeout)?;
        let gridded = GriddedClimateClient::new(
            Arc::new(grid_api),
            Arc::new(PgGridCache::new(&database)),
        )
        .context("Invalid gridded element configuration")?;

        let aggregation = AggregationService::new(
            Arc::new(geocoder),
            Arc::new(PgProjectionStore::new(&database)),
            Arc::new(gridded),
            config.spatial,
        );

        info!(
            grid_data_url = %config.grid_data_url,
            max_distance_m = config.spatial.max_distance_m,
            "Application state initialized"
        );

        Ok(Self::from_parts(aggregation, Some(database)))
    }

    /// Assemble state from already-built parts.
    pub fn from_parts(aggregation: AggregationService, database: Option<Database>) -> Self {
        Self {
            aggregation,
            database,
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
