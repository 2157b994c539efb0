//! Counting fakes for the external collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use climate_common::{ClimateError, ClimateResult, GeoLocation};
use geocoding::Geocoder;
use gridded_climate::{GridDataApi, GridDataRequest, GridFetch};

/// Geocoder answering from a fixed table. Unknown addresses resolve to
/// nothing.
#[derive(Default)]
pub struct FakeGeocoder {
    locations: HashMap<String, GeoLocation>,
    failure: Option<String>,
    calls: AtomicU64,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, address: &str, location: GeoLocation) -> Self {
        self.locations.insert(address.to_string(), location);
        self
    }

    /// Every call fails with a geocoding error.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, address: &str) -> ClimateResult<Option<GeoLocation>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(ClimateError::Geocoding(message.clone()));
        }
        Ok(self.locations.get(address).cloned())
    }
}

/// Gridded API answering by grid name, whatever the location. Grids with
/// no scripted body fail as an upstream error.
pub struct FakeGridApi {
    endpoint: String,
    bodies: HashMap<String, String>,
    calls: AtomicU64,
}

impl FakeGridApi {
    pub fn new() -> Self {
        Self {
            endpoint: "http://grid.test/GridData".to_string(),
            bodies: HashMap::new(),
            calls: AtomicU64::new(0),
        }
    }

    pub fn with_body(mut self, grid: &str, body: impl Into<String>) -> Self {
        self.bodies.insert(grid.to_string(), body.into());
        self
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FakeGridApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GridDataApi for FakeGridApi {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch(&self, request: &GridDataRequest) -> ClimateResult<GridFetch> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = self.bodies.get(&request.grid).cloned().ok_or_else(|| {
            ClimateError::Upstream(format!("Grid {} is not scripted", request.grid))
        })?;

        if gridded_climate::response::is_data_void_body(&body) {
            Ok(GridFetch::NoData(body))
        } else {
            Ok(GridFetch::Data(body))
        }
    }
}
