//! Tests for Coordinate distance behavior used by nearest-record matching.

use climate_common::{Coordinate, DateRange, GeoLocation};

// ============================================================================
// Distance tests
// ============================================================================

#[test]
fn test_distance_is_symmetric() {
    let sf = Coordinate::new(37.773972, -122.431297);
    let dallas = Coordinate::new(32.777, -96.797);
    let there = sf.distance_meters(&dallas);
    let back = dallas.distance_meters(&sf);
    assert!((there - back).abs() < 1e-6);
}

#[test]
fn test_distance_one_degree_latitude() {
    let a = Coordinate::new(10.0, 20.0);
    let b = Coordinate::new(11.0, 20.0);
    // ~111.2 km per degree of latitude
    assert!((a.distance_meters(&b) - 111_195.0).abs() < 100.0);
}

#[test]
fn test_distance_across_antimeridian() {
    let west = Coordinate::new(0.0, 179.9);
    let east = Coordinate::new(0.0, -179.9);
    assert!(west.distance_meters(&east) < 25_000.0);
}

#[test]
fn test_zip_94107_to_san_francisco_center() {
    // Geocoded 94107 vs. the seeded San Francisco point.
    let zip = Coordinate::new(37.7576171, -122.3933185);
    let sf = Coordinate::new(37.773972, -122.431297);
    let distance = zip.distance_meters(&sf);
    assert!(distance > 3_000.0 && distance < 5_000.0);
}

// ============================================================================
// GeoLocation / DateRange tests
// ============================================================================

#[test]
fn test_geolocation_coordinate() {
    let geo = GeoLocation::new("San Francisco, CA 94107, USA", 37.7576171, -122.3933185);
    let point = geo.coordinate();
    assert_eq!(point.latitude, 37.7576171);
    assert_eq!(point.longitude, -122.3933185);
}

#[test]
fn test_geolocation_json_shape() {
    let geo = GeoLocation::new("Dallas, TX, USA", 32.7766642, -96.79698789999999);
    let json = serde_json::to_value(&geo).unwrap();
    assert_eq!(json["formatted_address"], "Dallas, TX, USA");
    assert_eq!(json["lat"], 32.7766642);
}

#[test]
fn test_date_range_leap_year_end() {
    let range = DateRange::for_year(2000).unwrap();
    assert_eq!(range.end_str(), "2000-12-31");
    assert!(DateRange::for_year(i32::MAX).is_none());
}
