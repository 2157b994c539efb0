//! Storage abstractions for the climate location services.
//!
//! Provides:
//! - PostGIS nearest-record lookups over the projection tables
//! - The persistent cache of gridded-climate API responses
//! - In-memory implementations of both for fixtures and tests

pub mod database;
pub mod grid_cache;
pub mod memory;
pub mod projections;

pub use database::Database;
pub use grid_cache::{CachedResponse, GridCacheKey, GridResponseCache, PgGridCache};
pub use memory::{MemoryGridCache, MemoryProjectionStore, NoaaObservation};
pub use projections::{NearestQuery, PgProjectionStore, ProjectionStore, SpatialSource};
