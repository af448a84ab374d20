use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use serde_json::{Value, json};
use tracing::Level;

use lead_router::geocode::{
    GeocodeProgress, GeocodeReport, estimate_geocode_time, estimate_worst_case_geocode_time,
};
use lead_router::lead::{CandidateFilter, Coordinate, Lead, LeadStatus};
use lead_router::nominatim::{NominatimClient, NominatimConfig};
use lead_router::planner::{RoutePlan, plan_route, plan_route_from_address};
use lead_router::solver::RouteOptions;
use lead_router::traits::Geocoder;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Plan a driving route through sales leads that are due a visit",
    long_about = None
)]
struct Args {
    /// Lead store: a JSON array of leads, or an object with a "leads" array
    #[arg(long)]
    leads: PathBuf,

    /// Starting address
    #[arg(long)]
    start: String,

    /// Starting point as LAT,LON (skips geocoding the start address)
    #[arg(long, value_parser = parse_coordinate)]
    start_coords: Option<Coordinate>,

    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    max_stops: u32,

    /// Days since the last visit before a lead is due again
    #[arg(long, default_value_t = 14)]
    follow_up_days: i64,

    #[arg(long, value_enum, default_value_t = StatusArg::Active)]
    status: StatusArg,

    #[arg(long, default_value = "https://nominatim.openstreetmap.org")]
    nominatim_url: String,

    /// Countries geocoding results are restricted to
    #[arg(long, default_value = "us")]
    country_codes: String,

    /// Save newly geocoded coordinates back into the lead store
    #[arg(long)]
    write_back: bool,

    /// Print the plan as JSON
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    Active,
    Converted,
    Archived,
    Any,
}

impl StatusArg {
    fn to_filter(self) -> Option<LeadStatus> {
        match self {
            StatusArg::Active => Some(LeadStatus::Active),
            StatusArg::Converted => Some(LeadStatus::Converted),
            StatusArg::Archived => Some(LeadStatus::Archived),
            StatusArg::Any => None,
        }
    }
}

fn parse_coordinate(raw: &str) -> Result<Coordinate, String> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got '{raw}'"))?;
    let lat = lat.trim().parse::<f64>().map_err(|err| format!("latitude: {err}"))?;
    let lon = lon.trim().parse::<f64>().map_err(|err| format!("longitude: {err}"))?;
    Ok(Coordinate::new(lat, lon))
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let mut store = load_store(&args.leads)?;
    let all_leads: Vec<Lead> = serde_json::from_value(leads_array(&store)?.clone())
        .with_context(|| format!("invalid leads in {}", args.leads.display()))?;

    let filter = CandidateFilter {
        follow_up_days: args.follow_up_days,
        status: args.status.to_filter(),
    };
    let candidates: Vec<Lead> = filter
        .apply(&all_leads, Utc::now())
        .into_iter()
        .cloned()
        .collect();
    tracing::info!(
        total = all_leads.len(),
        eligible = candidates.len(),
        "loaded leads"
    );
    if candidates.is_empty() {
        tracing::warn!("no eligible leads to visit");
    }

    let geocoder = NominatimClient::new(NominatimConfig {
        base_url: args.nominatim_url.clone(),
        country_codes: args.country_codes.clone(),
        ..NominatimConfig::default()
    })?;

    let pending = candidates.iter().filter(|lead| lead.needs_geocoding()).count();
    if pending > 0 {
        let interval = geocoder.request_interval();
        eprintln!(
            "Geocoding {} lead(s): {} (up to {})",
            pending,
            estimate_geocode_time(pending, interval),
            estimate_worst_case_geocode_time(pending, interval)
        );
    }

    let options = RouteOptions {
        max_stops: args.max_stops as usize,
        ..RouteOptions::default()
    };
    let progress = |p: &GeocodeProgress| eprintln!("[{}/{}] {}", p.current, p.total, p.label);

    let plan = match args.start_coords {
        Some(start) => plan_route(&geocoder, start, &candidates, &options, None, progress),
        None => plan_route_from_address(
            &geocoder,
            &args.start,
            &candidates,
            &options,
            None,
            progress,
        )?,
    };

    if args.write_back && !plan.geocoding.resolved.is_empty() {
        let updated = write_back(&mut store, &plan.geocoding)?;
        save_store(&args.leads, &store)?;
        tracing::info!(updated, path = %args.leads.display(), "saved geocoded coordinates");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan, &args.start);
    }

    Ok(())
}

fn load_store(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn save_store(path: &Path, store: &Value) -> Result<()> {
    let raw = serde_json::to_string_pretty(store)?;
    fs::write(path, raw).with_context(|| format!("writing {}", path.display()))
}

fn leads_array(store: &Value) -> Result<&Value> {
    match store {
        Value::Array(_) => Ok(store),
        Value::Object(map) => map
            .get("leads")
            .filter(|leads| leads.is_array())
            .context("lead store has no \"leads\" array"),
        _ => bail!("lead store must be a JSON array or object"),
    }
}

/// Set `coords` on stored leads, leaving every other field as it was.
fn write_back(store: &mut Value, report: &GeocodeReport) -> Result<usize> {
    let leads = match store {
        Value::Array(leads) => leads,
        Value::Object(map) => match map.get_mut("leads") {
            Some(Value::Array(leads)) => leads,
            _ => bail!("lead store has no \"leads\" array"),
        },
        _ => bail!("lead store must be a JSON array or object"),
    };

    let mut updated = 0;
    for resolved in &report.resolved {
        let target = leads
            .iter_mut()
            .find(|lead| lead.get("id").and_then(Value::as_str) == Some(resolved.lead_id.as_str()));
        if let Some(Value::Object(lead)) = target {
            lead.insert(
                "coords".to_string(),
                json!({ "lat": resolved.coords.lat, "lon": resolved.coords.lon }),
            );
            updated += 1;
        }
    }
    Ok(updated)
}

fn print_plan(plan: &RoutePlan, start_address: &str) {
    let stats = &plan.route.route_stats;
    if plan.route.ordered_leads.is_empty() {
        println!("No routable leads ({} skipped without coordinates).", stats.leads_skipped);
        return;
    }

    println!("Start: {} ({})", start_address, plan.start);
    for stop in &plan.route.ordered_leads {
        let neighborhood = stop
            .lead
            .neighborhood
            .as_deref()
            .filter(|n| !n.is_empty())
            .map(|n| format!(" [{n}]"))
            .unwrap_or_default();
        let last_visit = stop
            .lead
            .days_since_visit(Utc::now())
            .map(|days| format!(", last visit {days}d ago"))
            .unwrap_or_else(|| ", never visited".to_string());
        println!(
            "{:>3}. {}{} - {} (+{:.2} mi{})",
            stop.route_order,
            stop.lead.name,
            neighborhood,
            stop.lead.address,
            stop.distance_from_previous,
            last_visit
        );
    }
    println!(
        "Total: {:.2} mi, {} stop(s), {} skipped",
        stats.total_distance, stats.leads_included, stats.leads_skipped
    );
    println!("{}", plan.maps_url(start_address));
}
