//! Batch geocoding of leads and addresses.
//!
//! Requests go out strictly one after another; progress is reported once
//! per address, before the (possibly slow) lookup starts.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;

use crate::address::MAX_QUERIES_PER_ADDRESS;
use crate::lead::{Coordinate, Lead, LeadId};
use crate::traits::{GeocodeMatch, Geocoder};

/// Progress of a sequential geocoding pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeProgress {
    /// 1-based index of the item being resolved.
    pub current: usize,
    pub total: usize,
    /// Lead name, or the address when the lead has no name.
    pub label: String,
}

/// A coordinate newly resolved for a lead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCoordinate {
    pub lead_id: LeadId,
    pub coords: Coordinate,
    pub approximate: bool,
}

/// Outcome of [`geocode_leads`].
///
/// Input leads are left untouched; use [`GeocodeReport::apply`] to obtain
/// updated copies for persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeReport {
    pub resolved: Vec<ResolvedCoordinate>,
    pub failed: Vec<LeadId>,
    /// Leads that already had usable coordinates.
    pub already_located: usize,
    /// The pass was cancelled before every lead was attempted.
    pub cancelled: bool,
}

impl GeocodeReport {
    pub fn geocoded_count(&self) -> usize {
        self.resolved.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Copies of `leads` with resolved coordinates attached.
    pub fn apply(&self, leads: &[Lead]) -> Vec<Lead> {
        let by_id: HashMap<&LeadId, Coordinate> = self
            .resolved
            .iter()
            .map(|resolved| (&resolved.lead_id, resolved.coords))
            .collect();

        leads
            .iter()
            .map(|lead| {
                let mut lead = lead.clone();
                if lead.usable_coords().is_none() {
                    if let Some(coords) = by_id.get(&lead.id) {
                        lead.coords = Some(*coords);
                    }
                }
                lead
            })
            .collect()
    }
}

fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
}

/// Geocode every lead that has an address but no usable coordinate.
///
/// `cancel` is checked between leads; an in-flight lookup always finishes.
pub fn geocode_leads<G, F>(
    geocoder: &G,
    leads: &[Lead],
    cancel: Option<&AtomicBool>,
    mut on_progress: F,
) -> GeocodeReport
where
    G: Geocoder + ?Sized,
    F: FnMut(&GeocodeProgress),
{
    let pending: Vec<&Lead> = leads.iter().filter(|lead| lead.needs_geocoding()).collect();
    let mut report = GeocodeReport {
        already_located: leads.iter().filter(|lead| lead.usable_coords().is_some()).count(),
        ..GeocodeReport::default()
    };

    if !pending.is_empty() {
        tracing::info!(
            pending = pending.len(),
            estimate = %estimate_geocode_time(pending.len(), geocoder.request_interval()),
            "geocoding leads"
        );
    }

    for (i, lead) in pending.iter().enumerate() {
        if is_cancelled(cancel) {
            tracing::info!(remaining = pending.len() - i, "geocoding cancelled");
            report.cancelled = true;
            break;
        }

        on_progress(&GeocodeProgress {
            current: i + 1,
            total: pending.len(),
            label: lead.label().to_string(),
        });

        match geocoder.geocode(&lead.address) {
            Some(found) => report.resolved.push(ResolvedCoordinate {
                lead_id: lead.id.clone(),
                coords: found.coordinate,
                approximate: found.is_approximate(),
            }),
            None => report.failed.push(lead.id.clone()),
        }
    }

    report
}

/// Geocode a list of addresses, skipping blanks and duplicates.
///
/// Only resolved addresses appear in the result.
pub fn geocode_addresses<G, S, F>(
    geocoder: &G,
    addresses: &[S],
    mut on_progress: F,
) -> HashMap<String, GeocodeMatch>
where
    G: Geocoder + ?Sized,
    S: AsRef<str>,
    F: FnMut(&GeocodeProgress),
{
    let mut seen = HashSet::new();
    let unique: Vec<&str> = addresses
        .iter()
        .map(AsRef::as_ref)
        .filter(|address| !address.trim().is_empty())
        .filter(|address| seen.insert(*address))
        .collect();

    let mut results = HashMap::with_capacity(unique.len());
    for (i, address) in unique.iter().enumerate() {
        on_progress(&GeocodeProgress {
            current: i + 1,
            total: unique.len(),
            label: address.to_string(),
        });

        if let Some(found) = geocoder.geocode(address) {
            results.insert(address.to_string(), found);
        }
    }
    results
}

/// Human readable time to send `requests` requests spaced by `interval`.
///
/// Phrased in seconds below one minute, otherwise in whole minutes.
/// Both round up.
pub fn estimate_geocode_time(requests: usize, interval: Duration) -> String {
    let total_ms = interval.as_millis() * requests as u128;

    if total_ms < 60_000 {
        format!("~{} seconds", total_ms.div_ceil(1000))
    } else {
        let minutes = total_ms.div_ceil(60_000);
        let plural = if minutes > 1 { "s" } else { "" };
        format!("~{minutes} minute{plural}")
    }
}

/// Upper bound for `addresses` lookups when every fallback query is needed.
pub fn estimate_worst_case_geocode_time(addresses: usize, interval: Duration) -> String {
    estimate_geocode_time(addresses * MAX_QUERIES_PER_ADDRESS, interval)
}
