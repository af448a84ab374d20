//! Great-circle distances in miles.
//!
//! "As the crow flies": ignores roads, but needs no routing service and is
//! good enough to order a handful of nearby stops.

use crate::lead::Coordinate;
use crate::traits::DistanceMatrixProvider;

/// Earth radius in miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Haversine distance between two points in miles.
///
/// NaN components propagate to a NaN distance.
pub fn haversine_distance(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Pairwise distances for `locations`.
///
/// Each unordered pair is evaluated once and mirrored, so the result is
/// exactly symmetric with a zero diagonal.
pub fn build_distance_matrix(locations: &[Coordinate]) -> Vec<Vec<f64>> {
    let n = locations.len();
    let mut matrix = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in i + 1..n {
            let dist = haversine_distance(locations[i], locations[j]);
            matrix[i][j] = dist;
            matrix[j][i] = dist;
        }
    }

    matrix
}

/// Haversine-based distance matrix provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineMatrix;

impl DistanceMatrixProvider for HaversineMatrix {
    fn matrix_for(&self, locations: &[Coordinate]) -> Vec<Vec<f64>> {
        build_distance_matrix(locations)
    }
}
