//! Route solver: nearest-neighbour construction followed by 2-opt.
//!
//! Routes are open paths anchored at index 0 (the start location); there is
//! no return leg.

use std::iter;

use rayon::prelude::*;
use serde::Serialize;

use crate::haversine::{HaversineMatrix, build_distance_matrix, haversine_distance};
use crate::lead::{Coordinate, Lead};
use crate::traits::DistanceMatrixProvider;

#[derive(Debug, Clone)]
pub struct RouteOptions {
    /// Maximum number of leads in the route (the start is not counted).
    pub max_stops: usize,
    /// Maximum number of 2-opt passes.
    pub two_opt_iterations: usize,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            max_stops: 5,
            two_opt_iterations: 100,
        }
    }
}

/// A lead at its position in the route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStop {
    #[serde(flatten)]
    pub lead: Lead,
    /// 1-based visiting position.
    pub route_order: usize,
    /// Miles from the previous stop (or the start), two decimals.
    pub distance_from_previous: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStats {
    /// Miles, two decimals.
    pub total_distance: f64,
    pub leads_included: usize,
    /// Leads without usable coordinates.
    pub leads_skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub ordered_leads: Vec<RouteStop>,
    pub route_stats: RouteStats,
}

impl RouteResult {
    fn empty(skipped: usize) -> Self {
        Self {
            ordered_leads: Vec::new(),
            route_stats: RouteStats {
                leads_skipped: skipped,
                ..RouteStats::default()
            },
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn distance_from_start(start: Coordinate, lead: &Lead) -> f64 {
    lead.usable_coords()
        .map_or(f64::INFINITY, |coords| haversine_distance(start, coords))
}

/// The `max_leads` leads closest to `start`, nearest first.
///
/// Returns every lead, in input order, when there are no more than
/// `max_leads`. Equal distances keep their input order.
pub fn select_nearest_leads<'a>(
    start: Coordinate,
    leads: &[&'a Lead],
    max_leads: usize,
) -> Vec<&'a Lead> {
    if leads.len() <= max_leads {
        return leads.to_vec();
    }

    let mut with_distance: Vec<(f64, &'a Lead)> = leads
        .par_iter()
        .map(|lead| (distance_from_start(start, lead), *lead))
        .collect();
    with_distance.sort_by(|a, b| a.0.total_cmp(&b.0));

    with_distance
        .into_iter()
        .take(max_leads)
        .map(|(_, lead)| lead)
        .collect()
}

/// Greedy tour: from `start`, always step to the closest unvisited index.
pub fn nearest_neighbor_tsp(matrix: &[Vec<f64>], start: usize) -> Vec<usize> {
    let n = matrix.len();
    if start >= n {
        return Vec::new();
    }

    let mut visited = vec![false; n];
    let mut route = Vec::with_capacity(n);
    visited[start] = true;
    route.push(start);
    let mut current = start;

    while route.len() < n {
        let mut nearest: Option<(usize, f64)> = None;
        for (i, &dist) in matrix[current].iter().enumerate() {
            if visited[i] {
                continue;
            }
            match nearest {
                Some((_, best)) if dist >= best => {}
                // NaN never compares smaller; keep the first candidate so the tour still completes.
                Some(_) if dist.is_nan() => {}
                _ => nearest = Some((i, dist)),
            }
        }

        let Some((next, _)) = nearest else { break };
        visited[next] = true;
        route.push(next);
        current = next;
    }

    route
}

/// Sum of consecutive legs along `route`.
pub fn route_distance(route: &[usize], matrix: &[Vec<f64>]) -> f64 {
    route
        .windows(2)
        .map(|leg| matrix[leg[0]][leg[1]])
        .sum()
}

/// Improve `route` by reversing segments while that shortens it.
///
/// Position 0 never moves. Each pass scans every `(i, j)` with
/// `1 <= i < j < n`, keeps any strictly improving reversal and carries on
/// scanning from there; passes repeat until one finds nothing or
/// `max_iterations` passes have run.
pub fn two_opt_improve(route: &[usize], matrix: &[Vec<f64>], max_iterations: usize) -> Vec<usize> {
    let mut best = route.to_vec();
    let mut best_distance = route_distance(&best, matrix);
    let n = best.len();

    let mut improved = true;
    let mut passes = 0;
    while improved && passes < max_iterations {
        improved = false;
        passes += 1;

        for i in 1..n.saturating_sub(1) {
            for j in i + 1..n {
                best[i..=j].reverse();
                let candidate = route_distance(&best, matrix);
                if candidate < best_distance {
                    best_distance = candidate;
                    improved = true;
                } else {
                    best[i..=j].reverse();
                }
            }
        }
    }

    tracing::debug!(passes, distance = best_distance, "2-opt finished");
    best
}

/// Order up to `options.max_stops` leads into a short route from `start`.
pub fn solve_route(start: Coordinate, leads: &[Lead], options: &RouteOptions) -> RouteResult {
    solve_route_with(start, leads, options, &HaversineMatrix)
}

/// [`solve_route`] with a custom distance source.
///
/// Lead selection always uses straight-line distance from the start.
pub fn solve_route_with<M>(
    start: Coordinate,
    leads: &[Lead],
    options: &RouteOptions,
    matrix_provider: &M,
) -> RouteResult
where
    M: DistanceMatrixProvider + ?Sized,
{
    let valid: Vec<&Lead> = leads
        .iter()
        .filter(|lead| lead.usable_coords().is_some())
        .collect();
    let skipped = leads.len() - valid.len();

    if valid.is_empty() {
        tracing::info!(skipped, "no leads with coordinates to route");
        return RouteResult::empty(leads.len());
    }

    let selected = select_nearest_leads(start, &valid, options.max_stops);

    let locations: Vec<Coordinate> = iter::once(start)
        .chain(selected.iter().filter_map(|lead| lead.usable_coords()))
        .collect();

    let mut matrix = matrix_provider.matrix_for(&locations);
    if matrix.len() != locations.len() || matrix.iter().any(|row| row.len() != locations.len()) {
        tracing::warn!(
            expected = locations.len(),
            actual = matrix.len(),
            "distance matrix has wrong shape, falling back to haversine"
        );
        matrix = build_distance_matrix(&locations);
    }

    let route = nearest_neighbor_tsp(&matrix, 0);
    let route = two_opt_improve(&route, &matrix, options.two_opt_iterations);

    let ordered_leads: Vec<RouteStop> = route
        .windows(2)
        .enumerate()
        .map(|(position, leg)| RouteStop {
            // index 0 is the start, leads follow in selection order
            lead: selected[leg[1] - 1].clone(),
            route_order: position + 1,
            distance_from_previous: round2(matrix[leg[0]][leg[1]]),
        })
        .collect();

    let total_distance = round2(route_distance(&route, &matrix));
    tracing::info!(
        stops = ordered_leads.len(),
        total_miles = total_distance,
        skipped,
        "route solved"
    );

    RouteResult {
        ordered_leads,
        route_stats: RouteStats {
            total_distance,
            leads_included: selected.len(),
            leads_skipped: skipped,
        },
    }
}
