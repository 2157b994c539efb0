//! Geographic coordinates, resolved locations and date ranges.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A WGS84 point in degrees.
///
/// This is the only join key between data sources: rows from different
/// tables and the gridded API are related purely by spatial proximity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Earth's radius in meters (WGS84 mean radius).
    pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another point in meters (haversine).
    pub fn distance_meters(&self, other: &Coordinate) -> f64 {
        let lat1_rad = self.latitude.to_radians();
        let lat2_rad = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        Self::EARTH_RADIUS_M * c
    }

    /// Latitude as stored in cache keys.
    ///
    /// Uses the shortest decimal form that round-trips, so the same `f64`
    /// always produces the same key.
    pub fn lat_key(&self) -> String {
        self.latitude.to_string()
    }

    /// Longitude as stored in cache keys.
    pub fn lng_key(&self) -> String {
        self.longitude.to_string()
    }

    /// Whether both components are finite and within geographic bounds.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A geocoded address: canonical name plus its coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub formatted_address: String,
    pub lat: f64,
    pub lng: f64,
}

impl GeoLocation {
    pub fn new(formatted_address: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            formatted_address: formatted_address.into(),
            lat,
            lng,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// Inclusive calendar date range used for upstream queries and cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// January 1st through December 31st of `year`.
    ///
    /// Returns `None` for years chrono cannot represent.
    pub fn for_year(year: i32) -> Option<Self> {
        Some(Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }

    /// Start date formatted as `YYYY-MM-DD`.
    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    /// End date formatted as `YYYY-MM-DD`.
    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_zero() {
        let sf = Coordinate::new(37.773972, -122.431297);
        assert_eq!(sf.distance_meters(&sf), 0.0);
    }

    #[test]
    fn test_distance_london_paris() {
        let london = Coordinate::new(51.5074, -0.1278);
        let paris = Coordinate::new(48.8566, 2.3522);
        let distance_km = london.distance_meters(&paris) / 1000.0;
        // ~344 km
        assert!((distance_km - 344.0).abs() < 5.0);
    }

    #[test]
    fn test_distance_high_latitude_longitude_shrinks() {
        // One degree of longitude is much shorter near the pole.
        let equator = Coordinate::new(0.0, 0.0).distance_meters(&Coordinate::new(0.0, 1.0));
        let arctic = Coordinate::new(70.0, 0.0).distance_meters(&Coordinate::new(70.0, 1.0));
        assert!(arctic < equator / 2.5);
    }

    #[test]
    fn test_cache_key_strings_round_trip() {
        let point = Coordinate::new(37.7576171, -122.5776844);
        assert_eq!(point.lat_key(), "37.7576171");
        assert_eq!(point.lng_key(), "-122.5776844");
        assert_eq!(point.lat_key().parse::<f64>().unwrap(), point.latitude);
    }

    #[test]
    fn test_is_valid() {
        assert!(Coordinate::new(45.0, 90.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, f64::NAN).is_valid());
    }

    #[test]
    fn test_date_range_for_year() {
        let range = DateRange::for_year(2080).unwrap();
        assert_eq!(range.start_str(), "2080-01-01");
        assert_eq!(range.end_str(), "2080-12-31");
    }
}
