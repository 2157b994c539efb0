//! Per-request orchestration: geocode, then fan out to every data source.

use std::sync::Arc;

use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, info, instrument};

use climate_common::{
    ClimateError, ClimateResult, Coordinate, GeoLocation, NoaaAttribute, ProjectionRecord,
};
use geocoding::Geocoder;
use gridded_climate::GriddedClimateClient;
use storage::{NearestQuery, ProjectionStore, SpatialSource};

/// Distance bounds for the spatial lookups, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialSettings {
    /// Bound for NOAA projections and sea-level rows.
    pub max_distance_m: f64,
    /// Bound for the CMIP5 temperature table, which is much coarser.
    pub cmip5_max_distance_m: f64,
    /// Bound for the observed baseline joined onto NOAA projections.
    pub baseline_max_distance_m: f64,
}

impl Default for SpatialSettings {
    fn default() -> Self {
        Self {
            max_distance_m: 50_000.0,
            cmip5_max_distance_m: 500_000.0,
            baseline_max_distance_m: 50_000.0,
        }
    }
}

/// Response body for a resolved address.
#[derive(Debug, Clone, Serialize)]
pub struct LocationResults {
    pub geo: GeoLocation,
    pub results: Vec<ProjectionRecord>,
}

/// Combines the geocoder, the spatial store and the gridded client.
pub struct AggregationService {
    geocoder: Arc<dyn Geocoder>,
    store: Arc<dyn ProjectionStore>,
    gridded: Arc<GriddedClimateClient>,
    settings: SpatialSettings,
}

impl AggregationService {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        store: Arc<dyn ProjectionStore>,
        gridded: Arc<GriddedClimateClient>,
        settings: SpatialSettings,
    ) -> Self {
        Self {
            geocoder,
            store,
            gridded,
            settings,
        }
    }

    /// Spatial lookups issued for every request, in output order.
    pub fn spatial_queries(&self, point: Coordinate, year: i32) -> Vec<NearestQuery> {
        let mut queries = vec![NearestQuery::new(
            SpatialSource::TemperatureIncrease,
            point,
            year,
            self.settings.cmip5_max_distance_m,
        )];
        queries.extend(NoaaAttribute::ALL.iter().map(|attribute| {
            NearestQuery::new(
                SpatialSource::NoaaProjection(*attribute),
                point,
                year,
                self.settings.max_distance_m,
            )
            .with_baseline_distance(self.settings.baseline_max_distance_m)
        }));
        queries.push(NearestQuery::new(
            SpatialSource::SeaLevelRisk,
            point,
            year,
            self.settings.max_distance_m,
        ));
        queries
    }

    /// All projections near `address` for `year`, or `None` if the address
    /// cannot be resolved. Any failing source fails the whole request.
    #[instrument(skip(self))]
    pub async fn get_location_results(
        &self,
        address: &str,
        year: i32,
    ) -> ClimateResult<Option<LocationResults>> {
        let Some(geo) = self.geocoder.geocode(address).await? else {
            debug!("Address did not resolve");
            return Ok(None);
        };
        let point = geo.coordinate();
        if !point.is_valid() {
            return Err(ClimateError::Geocoding(format!(
                "Geocoder returned an invalid coordinate ({}, {}) for '{}'",
                geo.lat, geo.lng, geo.formatted_address
            )));
        }

        let queries = self.spatial_queries(point, year);
        let spatial = try_join_all(queries.iter().map(|query| self.store.query_nearest(query)));
        let gridded = self.gridded.get_results(point, year);

        let (spatial, gridded) = tokio::try_join!(spatial, gridded)?;

        let mut results: Vec<ProjectionRecord> = spatial.into_iter().flatten().collect();
        let spatial_count = results.len();
        results.extend(gridded);

        info!(
            formatted_address = %geo.formatted_address,
            spatial = spatial_count,
            gridded = results.len() - spatial_count,
            "Location results assembled"
        );

        Ok(Some(LocationResults { geo, results }))
    }
}
