//! Common types and utilities shared across the climate location services.

pub mod coordinate;
pub mod error;
pub mod record;

pub use coordinate::{Coordinate, DateRange, GeoLocation};
pub use error::{ClimateError, ClimateResult};
pub use record::{
    GriddedAttribute, GriddedProjection, NoaaAttribute, NoaaProjection, ProjectionRecord,
    SeaLevelRisk, TemperatureIncrease,
};
