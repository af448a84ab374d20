//! End-to-end route planning: geocode what is missing, then solve.

use std::sync::atomic::AtomicBool;

use serde::Serialize;

use crate::error::PlanError;
use crate::geocode::{GeocodeProgress, GeocodeReport, geocode_leads};
use crate::lead::{Coordinate, Lead};
use crate::maps::google_maps_url;
use crate::solver::{RouteOptions, RouteResult, solve_route};
use crate::traits::Geocoder;

/// A solved route together with the geocoding done to produce it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlan {
    pub start: Coordinate,
    #[serde(flatten)]
    pub route: RouteResult,
    pub geocoding: GeocodeReport,
    /// Input leads with newly resolved coordinates attached; the caller
    /// decides whether to persist them.
    #[serde(skip)]
    pub leads: Vec<Lead>,
}

impl RoutePlan {
    pub fn maps_url(&self, start_address: &str) -> String {
        google_maps_url(start_address, &self.route.ordered_leads)
    }
}

/// Geocode leads lacking coordinates, then route from `start`.
///
/// Geocoding is sequential and reports progress once per lead. Leads that
/// cannot be resolved are skipped, never fatal. `cancel` stops the
/// geocoding pass between leads; whatever is located by then is routed.
pub fn plan_route<G, F>(
    geocoder: &G,
    start: Coordinate,
    leads: &[Lead],
    options: &RouteOptions,
    cancel: Option<&AtomicBool>,
    on_progress: F,
) -> RoutePlan
where
    G: Geocoder + ?Sized,
    F: FnMut(&GeocodeProgress),
{
    let geocoding = geocode_leads(geocoder, leads, cancel, on_progress);
    if geocoding.failed_count() > 0 {
        tracing::warn!(
            failed = geocoding.failed_count(),
            "some leads could not be geocoded and will be skipped"
        );
    }

    let leads = geocoding.apply(leads);
    let route = solve_route(start, &leads, options);

    RoutePlan {
        start,
        route,
        geocoding,
        leads,
    }
}

/// [`plan_route`] starting from a free-text address.
pub fn plan_route_from_address<G, F>(
    geocoder: &G,
    start_address: &str,
    leads: &[Lead],
    options: &RouteOptions,
    cancel: Option<&AtomicBool>,
    on_progress: F,
) -> Result<RoutePlan, PlanError>
where
    G: Geocoder + ?Sized,
    F: FnMut(&GeocodeProgress),
{
    let start_address = start_address.trim();
    if start_address.is_empty() {
        return Err(PlanError::EmptyStartAddress);
    }

    let start = geocoder
        .geocode(start_address)
        .ok_or_else(|| PlanError::StartAddressNotFound(start_address.to_string()))?;
    if start.is_approximate() {
        tracing::warn!(
            address = start_address,
            precision = ?start.precision,
            "starting address only matched approximately"
        );
    }

    Ok(plan_route(
        geocoder,
        start.coordinate,
        leads,
        options,
        cancel,
        on_progress,
    ))
}
