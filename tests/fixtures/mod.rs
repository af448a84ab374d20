//! Test fixtures for lead-router.
//!
//! Provides real metro-Atlanta locations and builders for leads.

pub mod atlanta_locations;

pub use atlanta_locations::*;
