//! Seams between the route engine and its collaborators.
//!
//! Kept minimal so the CRM (or a test) can plug in its own geocoder and
//! distance source.

use crate::address::MatchPrecision;
use crate::lead::Coordinate;

/// A successfully geocoded address.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocodeMatch {
    pub coordinate: Coordinate,
    /// Which query in the fallback cascade produced the match.
    pub precision: MatchPrecision,
}

impl GeocodeMatch {
    pub fn exact(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            precision: MatchPrecision::Exact,
        }
    }

    /// True when only a less specific query matched.
    pub fn is_approximate(&self) -> bool {
        self.precision != MatchPrecision::Exact
    }
}

/// Resolves free-text addresses to coordinates.
///
/// Implementations are expected to be slow and rate limited. Callers must
/// not issue overlapping requests. Failures of any kind surface as `None`.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> Option<GeocodeMatch>;

    /// Minimum spacing between two requests, used for time estimates.
    fn request_interval(&self) -> std::time::Duration {
        std::time::Duration::ZERO
    }
}

/// Provides a distance matrix (miles) for a set of locations.
///
/// The matrix is indexed by the provided location order.
pub trait DistanceMatrixProvider {
    fn matrix_for(&self, locations: &[Coordinate]) -> Vec<Vec<f64>>;
}
