//! Common test fixtures for the climate locations workspace.
//!
//! Spatial rows sit near San Francisco, New York and Dallas. Dallas is
//! several hundred kilometers from any coast, so it has no sea-level row in
//! range.

use climate_common::{
    GeoLocation, NoaaAttribute, NoaaProjection, SeaLevelRisk, TemperatureIncrease,
};
use storage::{MemoryProjectionStore, NoaaObservation};

/// Year every projection fixture is seeded for.
pub const FIXTURE_YEAR: i32 = 2080;

/// Body the gridded API returns when it has no data for a location.
pub const DATA_VOID_BODY: &str = r#"{"status": "Invalid request.", "error": "bad ur"}"#;

/// Geocoder result for "94107".
pub fn san_francisco_94107() -> GeoLocation {
    GeoLocation::new("San Francisco, CA 94107, USA", 37.7576171, -122.3933185)
}

pub fn new_york() -> GeoLocation {
    GeoLocation::new("New York, NY, USA", 40.7127753, -74.0059728)
}

pub fn dallas() -> GeoLocation {
    GeoLocation::new("Dallas, TX, USA", 32.7766642, -96.7969879)
}

fn temperature(place_name: &str, lat: f64, lon: f64, observed: f64) -> TemperatureIncrease {
    TemperatureIncrease {
        place_name: place_name.to_string(),
        year_start: 2060,
        year_end: 2079,
        lat,
        lon,
        observed_warming: observed,
        model_26_warming: observed + 0.9,
        model_45_warming: observed + 1.6,
        model_60_warming: observed + 2.0,
        model_85_warming: observed + 3.1,
    }
}

fn noaa_projection(place_name: &str, lat: f64, lon: f64, rcp45: f64, rcp85: f64) -> NoaaProjection {
    NoaaProjection {
        place_name: place_name.to_string(),
        year: FIXTURE_YEAR,
        lat,
        lon,
        rcp45_weighted_mean: rcp45,
        rcp45_min: rcp45 * 0.5,
        rcp45_max: rcp45 * 1.5,
        rcp85_weighted_mean: rcp85,
        rcp85_min: rcp85 * 0.5,
        rcp85_max: rcp85 * 1.5,
        historical_average: None,
    }
}

fn sea_level(place_name: &str, lat: f64, lon: f64) -> SeaLevelRisk {
    SeaLevelRisk {
        place_name: place_name.to_string(),
        year: FIXTURE_YEAR,
        lat,
        lon,
        rcp26: 0.12,
        rcp45: 0.21,
        rcp85: 0.48,
    }
}

/// Projection store seeded with rows near the fixture places.
pub fn seeded_store() -> MemoryProjectionStore {
    MemoryProjectionStore::new()
        .with_temperature(temperature("San Francisco", 37.75, -122.45, 0.8))
        .with_temperature(temperature("New York", 40.71, -74.0, 1.1))
        .with_temperature(temperature("Dallas", 32.78, -96.8, 1.3))
        .with_noaa_projection(
            NoaaAttribute::NumDaysAbove100f,
            noaa_projection("San Francisco County", 37.77, -122.42, 1.0, 3.0),
        )
        .with_noaa_projection(
            NoaaAttribute::NumDryDays,
            noaa_projection("San Francisco County", 37.77, -122.42, 230.0, 241.0),
        )
        .with_noaa_projection(
            NoaaAttribute::NumDaysAbove100f,
            noaa_projection("Dallas County", 32.77, -96.78, 28.0, 52.0),
        )
        .with_observation(NoaaObservation {
            place_name: "San Francisco County".to_string(),
            lat: 37.77,
            lon: -122.42,
            avg_temp_max_f: 64.2,
            num_days_above_100f: 0.2,
            num_dry_days: 228.0,
        })
        .with_sea_level(sea_level("San Francisco", 37.8, -122.4))
        .with_sea_level(sea_level("New York", 40.7, -74.01))
}

/// Single-year projection body with the six element values in order.
pub fn projection_body(year: i32, values: [f64; 6]) -> String {
    let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!(r#"{{"data": [["{}", {}]]}}"#, year, values.join(", "))
}

/// Two-year historical body whose per-element means are
/// `[2, 41, 61, 5, 230, 22]`.
pub fn historical_body() -> String {
    r#"{"data": [["1950", 1, 40, 60.0, 4, 220, 20.0], ["1951", 3, 42, 62.0, 6, 240, 24.0]]}"#
        .to_string()
}
