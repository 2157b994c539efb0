//! HTTP request handlers for the Locations API.

pub mod health;
pub mod locations;
