//! Gridded climate projections from the RCC-ACIS `GridData` service.
//!
//! Requests go through the persistent response cache in `storage`, so a
//! given grid/location/date range is fetched from upstream at most once
//! (modulo concurrent first requests).

pub mod api;
pub mod client;
pub mod elements;
pub mod response;

pub use api::{AcisGridApi, GridDataApi, GridDataRequest, GridFetch, DEFAULT_GRID_DATA_URL};
pub use client::{ElementValues, GriddedClimateClient, Scenario};
pub use elements::{element_attributes, validate_element_mappings, GridElement, GRID_ELEMENTS};
