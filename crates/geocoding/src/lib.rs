//! Address geocoding.
//!
//! A [`Geocoder`] resolves free-text addresses to a canonical name and
//! coordinate. "Not found" is `Ok(None)`; every other failure is a
//! [`ClimateError::Geocoding`](climate_common::ClimateError::Geocoding).

pub mod google;

use async_trait::async_trait;

use climate_common::{ClimateResult, GeoLocation};

pub use google::{GoogleGeocoder, DEFAULT_GEOCODE_URL};

/// Resolves an address to its best match.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best match for `address`, or `None` if the address matched nothing.
    async fn geocode(&self, address: &str) -> ClimateResult<Option<GeoLocation>>;
}
