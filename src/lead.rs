//! Lead records as consumed by the route engine.
//!
//! The CRM owns these records and their persistence. The router only reads
//! them and reports newly resolved coordinates back to the caller.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both components are finite numbers. Range is not checked.
    pub fn is_usable(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lon)
    }
}

/// Opaque lead identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub String);

impl LeadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    #[default]
    Active,
    Converted,
    Archived,
}

/// A sales lead with the fields the router cares about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: LeadId,
    #[serde(default)]
    pub name: String,
    /// Free-text street address. Blank addresses are never routed.
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub coords: Option<Coordinate>,
    /// ISO-8601 timestamp or plain date of the most recent visit.
    #[serde(default)]
    pub last_visit: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub status: LeadStatus,
}

impl Lead {
    pub fn new(id: impl Into<String>, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: LeadId::new(id),
            name: name.into(),
            address: address.into(),
            coords: None,
            last_visit: None,
            neighborhood: None,
            status: LeadStatus::Active,
        }
    }

    pub fn with_coords(mut self, lat: f64, lon: f64) -> Self {
        self.coords = Some(Coordinate::new(lat, lon));
        self
    }

    pub fn with_last_visit(mut self, last_visit: impl Into<String>) -> Self {
        self.last_visit = Some(last_visit.into());
        self
    }

    pub fn with_status(mut self, status: LeadStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_neighborhood(mut self, neighborhood: impl Into<String>) -> Self {
        self.neighborhood = Some(neighborhood.into());
        self
    }

    /// The stored coordinate, if it can be routed.
    pub fn usable_coords(&self) -> Option<Coordinate> {
        self.coords.filter(Coordinate::is_usable)
    }

    pub fn has_address(&self) -> bool {
        !self.address.trim().is_empty()
    }

    pub fn needs_geocoding(&self) -> bool {
        self.has_address() && self.usable_coords().is_none()
    }

    /// Name for progress reporting, falling back to the address.
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() {
            self.address.as_str()
        } else {
            self.name.as_str()
        }
    }

    /// Parsed `last_visit`, accepting RFC 3339 timestamps and bare dates.
    pub fn last_visit_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.last_visit.as_deref()?.trim();
        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Some(at.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Whole days between the last visit and `now`.
    pub fn days_since_visit(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_visit_at().map(|at| (now - at).num_days())
    }
}

/// Eligibility rules for picking which leads to consider for a route.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFilter {
    /// Minimum days since the last visit before a lead is due again.
    pub follow_up_days: i64,
    /// Only leads with this status, or any status when `None`.
    pub status: Option<LeadStatus>,
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self {
            follow_up_days: 14,
            status: Some(LeadStatus::Active),
        }
    }
}

impl CandidateFilter {
    pub fn is_eligible(&self, lead: &Lead, now: DateTime<Utc>) -> bool {
        if !lead.has_address() {
            return false;
        }
        if let Some(status) = self.status {
            if lead.status != status {
                return false;
            }
        }
        match lead.days_since_visit(now) {
            Some(days) => days >= self.follow_up_days,
            None => true,
        }
    }

    pub fn apply<'a>(&self, leads: &'a [Lead], now: DateTime<Utc>) -> Vec<&'a Lead> {
        leads
            .iter()
            .filter(|lead| self.is_eligible(lead, now))
            .collect()
    }
}
