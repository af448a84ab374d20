//! Free-text US address parsing for fallback geocoding queries.

use std::sync::LazyLock;

use regex::Regex;

/// State and territory codes recognised in addresses.
///
/// Some overlap street suffixes and quadrants ("Ct", "NE"), so the parser
/// keeps the state-like token nearest the end of the address.
const STATE_ABBREVIATIONS: [&str; 51] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA", "KS",
    "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY",
    "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV",
    "WI", "WY", "DC",
];

const STREET_TYPES: [&str; 17] = [
    "st", "street", "ave", "avenue", "dr", "drive", "rd", "road", "ln", "lane", "blvd",
    "boulevard", "ct", "court", "way", "pl", "place",
];

/// A state code preceded by a comma or whitespace (so "GA-92" is skipped)
/// and followed by a zip, a comma, or the end of the text.
static STATE_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    STATE_ABBREVIATIONS
        .iter()
        .map(|abbr| {
            let re = Regex::new(&format!(r"(?i)(?:,\s*|\s)({abbr})(?:\s+\d{{5}}|\s*$|,)"))
                .expect("valid state regex");
            (*abbr, re)
        })
        .collect()
});

static ZIP_AFTER_STATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{5})(-\d{4})?\b").expect("valid zip regex"));

static TRAILING_ZIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{5})(-\d{4})?\s*$").expect("valid zip regex"));

static ANY_ZIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{5}(-\d{4})?\b").expect("valid zip regex"));

static COMMA_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*").expect("valid separator regex"));

/// City, state and zip pulled out of an address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressComponents {
    pub city: Option<String>,
    pub state: Option<&'static str>,
    pub zip: Option<String>,
}

/// How specific the query that produced a geocode was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchPrecision {
    Exact,
    WithoutZip,
    CityStateZip,
    CityState,
}

/// Maximum number of queries the fallback cascade can produce.
pub const MAX_QUERIES_PER_ADDRESS: usize = 4;

/// Extract city, two-letter state and 5-digit zip from `address`.
pub fn parse_address_components(address: &str) -> AddressComponents {
    // (whole match start, state end), last occurrence wins
    let state_match = STATE_PATTERNS
        .iter()
        .filter_map(|(abbr, re)| {
            re.captures_iter(address).last().and_then(|caps| {
                let whole = caps.get(0)?;
                let state = caps.get(1)?;
                Some((*abbr, whole.start(), state.end()))
            })
        })
        .max_by_key(|&(_, start, _)| start);

    let zip = match state_match {
        Some((_, _, state_end)) => ZIP_AFTER_STATE
            .captures(&address[state_end..])
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string()),
        None => TRAILING_ZIP
            .captures(address)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string()),
    };

    let city = state_match.and_then(|(_, start, _)| city_before(&address[..start]));

    AddressComponents {
        city,
        state: state_match.map(|(abbr, _, _)| abbr),
        zip,
    }
}

fn city_before(before_state: &str) -> Option<String> {
    let before_state = before_state.trim();
    let before_state = before_state.strip_suffix(',').unwrap_or(before_state).trim_end();

    let parts: Vec<&str> = COMMA_SPLIT.split(before_state).collect();
    if parts.len() >= 2 {
        let city = parts[parts.len() - 1].trim();
        return (!city.is_empty()).then(|| city.to_string());
    }

    // No commas: walk back from the end until a street type or a number.
    let mut city_words = Vec::new();
    for word in before_state.split_whitespace().rev() {
        let normalized = word.to_lowercase().replace(['.', ','], "");
        let is_number = !normalized.is_empty() && normalized.chars().all(|c| c.is_ascii_digit());
        if STREET_TYPES.contains(&normalized.as_str()) || is_number {
            break;
        }
        city_words.push(word);
    }
    city_words.reverse();

    let city = city_words.join(" ").replace(['.', ','], "");
    let city = city.trim();
    (!city.is_empty()).then(|| city.to_string())
}

/// Remove the last zip (with optional +4) from `address`.
fn strip_zip(address: &str) -> String {
    let Some(last) = ANY_ZIP.find_iter(address).last() else {
        return address.trim().to_string();
    };
    let mut stripped = String::with_capacity(address.len());
    stripped.push_str(&address[..last.start()]);
    stripped.push_str(&address[last.end()..]);
    stripped.trim().trim_end_matches(',').trim_end().to_string()
}

/// Queries to try, most specific first.
///
/// The literal address always comes first. Less specific queries are
/// only added when the address yields the parts they need, and a query
/// identical to the previous one is not repeated.
pub fn fallback_queries(address: &str) -> Vec<(MatchPrecision, String)> {
    let address = address.trim();
    if address.is_empty() {
        return Vec::new();
    }

    let components = parse_address_components(address);
    let mut queries = vec![(MatchPrecision::Exact, address.to_string())];

    if components.zip.is_some() {
        queries.push((MatchPrecision::WithoutZip, strip_zip(address)));
    }

    if let (Some(city), Some(state)) = (&components.city, components.state) {
        let city_state = format!("{city}, {state}");
        let city_state_zip = match &components.zip {
            Some(zip) => format!("{city_state} {zip}"),
            None => city_state.clone(),
        };
        queries.push((MatchPrecision::CityStateZip, city_state_zip));
        queries.push((MatchPrecision::CityState, city_state));
    }

    queries.dedup_by(|next, prev| next.1 == prev.1);
    queries
}
