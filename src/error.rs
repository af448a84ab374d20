//! Error types for the geocoding client and route planner.

use thiserror::Error;

/// A single geocoding request failed.
///
/// These never abort a route calculation; the address is reported as not
/// found instead.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("geocoding service returned {0}")]
    Status(reqwest::StatusCode),
    #[error("geocoding service returned an unparsable coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: String, lon: String },
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("starting address is empty")]
    EmptyStartAddress,
    #[error("could not geocode starting address '{0}'")]
    StartAddressNotFound(String),
}
