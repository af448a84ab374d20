//! lead-router: plan a short driving route through nearby sales leads.
//!
//! Geocodes lead addresses (rate limited, with fallback queries), keeps the
//! leads closest to the start and orders them with nearest-neighbour + 2-opt.

pub mod address;
pub mod error;
pub mod geocode;
pub mod haversine;
pub mod lead;
pub mod maps;
pub mod nominatim;
pub mod planner;
pub mod rate_limit;
pub mod solver;
pub mod traits;
