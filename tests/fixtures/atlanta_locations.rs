//! Real metro-Atlanta locations for realistic test fixtures.
//!
//! Coordinates are approximate business locations taken from OpenStreetMap.

use lead_router::lead::{Coordinate, Lead};

/// A named location with an address and coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub address: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, address: &'static str, lat: f64, lng: f64) -> Self {
        Self {
            name,
            address,
            lat,
            lng,
        }
    }

    pub fn coords(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }

    /// A lead for this location with coordinates already resolved.
    pub fn lead(&self, id: &str) -> Lead {
        Lead::new(id, self.name, self.address).with_coords(self.lat, self.lng)
    }

    /// A lead for this location that still needs geocoding.
    pub fn ungeocoded_lead(&self, id: &str) -> Lead {
        Lead::new(id, self.name, self.address)
    }
}

// ============================================================================
// Start locations
// ============================================================================

pub const DOWNTOWN_ATLANTA: Location = Location::new(
    "Five Points",
    "30 Alabama St SW, Atlanta, GA 30303",
    33.7536,
    -84.3915,
);

pub const WOODSTOCK_SQUARE: Location = Location::new(
    "Woodstock Square",
    "8534 Main St, Woodstock, GA 30188",
    34.1015,
    -84.5194,
);

// ============================================================================
// Intown Atlanta
// ============================================================================

pub const INTOWN: &[Location] = &[
    Location::new(
        "Ponce City Market",
        "675 Ponce De Leon Ave NE, Atlanta, GA 30308",
        33.7725,
        -84.3657,
    ),
    Location::new("Krog Street Market", "99 Krog St NE, Atlanta, GA 30307", 33.7571, -84.3641),
    Location::new(
        "Westside Provisions",
        "1198 Howell Mill Rd, Atlanta, GA 30318",
        33.7866,
        -84.4116,
    ),
    Location::new(
        "Sweet Auburn Curb Market",
        "209 Edgewood Ave SE, Atlanta, GA 30303",
        33.7542,
        -84.3803,
    ),
    Location::new(
        "Piedmont Park Greystone",
        "1320 Monroe Dr NE, Atlanta, GA 30306",
        33.7890,
        -84.3720,
    ),
    Location::new("Little Five Points", "1131 Euclid Ave NE, Atlanta, GA 30307", 33.7644, -84.3495),
    Location::new(
        "Grant Park Farmers Market",
        "600 Cherokee Ave SE, Atlanta, GA 30312",
        33.7374,
        -84.3712,
    ),
];

// ============================================================================
// North suburbs
// ============================================================================

pub const NORTH_SUBURBS: &[Location] = &[
    Location::new("Marietta Square", "50 N Park Sq NE, Marietta, GA 30060", 33.9526, -84.5499),
    Location::new("Roswell Canton St", "1000 Canton St, Roswell, GA 30075", 34.0279, -84.3616),
    Location::new("Alpharetta Avalon", "400 Avalon Blvd, Alpharetta, GA 30009", 34.0707, -84.2746),
    Location::new("Kennesaw Depot", "2828 Cherokee St NW, Kennesaw, GA 30144", 34.0234, -84.6155),
    Location::new("Canton Cannon Park", "130 E Main St, Canton, GA 30114", 34.2368, -84.4908),
    Location::new("Bluff Coffee", "619 Bluff Dr. Woodstock GA 30188", 34.1120, -84.5110),
    Location::new(
        "Highway 92 Plaza",
        "12186 GA-92 STE 110, Woodstock, GA 30188",
        34.0937,
        -84.4930,
    ),
];

// ============================================================================
// Far away (should lose to nearby leads in candidate selection)
// ============================================================================

pub const FAR_AWAY: &[Location] = &[
    Location::new("Savannah Broughton St", "100 Main St, Savannah, GA 31401", 32.0790, -81.0925),
    Location::new("Macon Downtown", "500 Cherry St, Macon, GA 31201", 32.8365, -83.6310),
    Location::new("Athens Downtown", "100 College Ave, Athens, GA 30601", 33.9584, -83.3760),
];

pub fn all_locations() -> Vec<Location> {
    let mut all = Vec::with_capacity(INTOWN.len() + NORTH_SUBURBS.len() + FAR_AWAY.len());
    all.extend_from_slice(INTOWN);
    all.extend_from_slice(NORTH_SUBURBS);
    all.extend_from_slice(FAR_AWAY);
    all
}

/// Leads with coordinates for every fixture location, ids `lead-<n>`.
pub fn located_leads() -> Vec<Lead> {
    all_locations()
        .iter()
        .enumerate()
        .map(|(i, loc)| loc.lead(&format!("lead-{i}")))
        .collect()
}
