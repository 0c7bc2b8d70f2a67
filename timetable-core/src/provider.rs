//! Timetable data provider DTOs and conversion.
//!
//! These types map directly to the upstream per-train JSON records. They
//! use `Option` liberally because the source omits fields rather than
//! sending nulls. Conversion into domain [`CallPattern`]s is lenient the
//! way the rest of the pipeline expects: locations without a usable
//! station code are skipped, malformed times become absent times, and
//! only a missing identity fails the whole record.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use crate::domain::{
    AtocCode, CallPattern, CallType, Crs, Headcode, RailTime, RunId, Stop,
};

/// Error during record to domain conversion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConversionError {
    /// The record has no usable run identity
    #[error("missing run identity")]
    MissingRunId,

    /// The run date is absent or not ISO formatted
    #[error("invalid run date: {0}")]
    InvalidRunDate(String),
}

/// One per-train record from the data source.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainRecord {
    /// Run identifier
    pub service_uid: Option<String>,
    /// Run date, ISO "YYYY-MM-DD"
    pub run_date: Option<String>,
    /// Headcode-style train identity
    pub train_identity: Option<String>,
    /// Alternative running identity
    pub running_identity: Option<String>,
    /// Operator ATOC code
    pub atoc_code: Option<String>,
    /// Operator display name
    pub atoc_name: Option<String>,
    /// Service type ("train", "bus", ...)
    pub service_type: Option<String>,
    /// Passenger service flag
    pub is_passenger: Option<bool>,
    /// Train class code ("S" = standard only)
    pub train_class: Option<String>,
    /// Sleeper accommodation code
    pub sleepers: Option<String>,
    /// Whether live times exist for this run
    pub realtime_activated: Option<bool>,
    /// Booked origin(s)
    pub origin: Option<Vec<LocationPair>>,
    /// Booked destination(s)
    pub destination: Option<Vec<LocationPair>>,
    /// Ordered calling points
    pub locations: Option<Vec<LocationRecord>>,
}

/// A named origin/destination pair on a record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPair {
    /// Location display name
    pub description: Option<String>,
    /// Public time at that location, wire format
    pub public_time: Option<String>,
}

/// One calling point on a record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    /// CRS code
    pub crs: Option<String>,
    /// TIPLOC timing-point id
    pub tiploc: Option<String>,
    /// Display name
    pub description: Option<String>,
    /// Booked arrival, wire format "HHMM"
    pub gbtt_booked_arrival: Option<String>,
    /// Booked departure
    pub gbtt_booked_departure: Option<String>,
    /// Realtime arrival
    pub realtime_arrival: Option<String>,
    /// Realtime departure
    pub realtime_departure: Option<String>,
    /// The realtime arrival was observed
    pub realtime_arrival_actual: Option<bool>,
    /// The realtime departure was observed
    pub realtime_departure_actual: Option<bool>,
    /// No live arrival report
    pub realtime_arrival_no_report: Option<bool>,
    /// No live departure report
    pub realtime_departure_no_report: Option<bool>,
    /// No live pass report
    pub realtime_pass_no_report: Option<bool>,
    /// Call classification ("CALL", "PASS", ...)
    pub display_as: Option<String>,
    /// Public boarding/alighting flag
    pub is_public_call: Option<bool>,
    /// Platform number/letter
    pub platform: Option<String>,
    /// Realtime platform confirmation
    pub platform_confirmed: Option<bool>,
    /// Realtime platform alteration
    pub platform_changed: Option<bool>,
}

/// Converts a batch of records, skipping the unconvertible ones.
pub fn convert_records(records: &[TrainRecord]) -> Vec<CallPattern> {
    let mut patterns = Vec::with_capacity(records.len());
    for record in records {
        match convert_record(record) {
            Ok(pattern) => patterns.push(pattern),
            Err(e) => {
                warn!(
                    uid = record.service_uid.as_deref().unwrap_or("?"),
                    "skipping record: {e}"
                );
            }
        }
    }
    patterns
}

/// Converts one record into a domain call pattern.
pub fn convert_record(record: &TrainRecord) -> Result<CallPattern, ConversionError> {
    let uid = record
        .service_uid
        .clone()
        .or_else(|| record.train_identity.clone())
        .or_else(|| record.running_identity.clone())
        .ok_or(ConversionError::MissingRunId)?;
    let run_id = RunId::new(uid).map_err(|_| ConversionError::MissingRunId)?;

    let date_text = record.run_date.clone().unwrap_or_default();
    let run_date = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d")
        .map_err(|_| ConversionError::InvalidRunDate(date_text.clone()))?;

    let mut pattern = CallPattern::new(run_id, run_date);
    pattern.identity = record
        .train_identity
        .clone()
        .or_else(|| record.running_identity.clone())
        .unwrap_or_else(|| pattern.run_id.as_str().to_string());
    pattern.headcode = Headcode::parse(&pattern.identity);
    pattern.operator_code = record
        .atoc_code
        .as_deref()
        .and_then(|code| AtocCode::parse(code).ok());
    pattern.operator_name = record
        .atoc_name
        .clone()
        .or_else(|| record.atoc_code.clone())
        .unwrap_or_default();
    pattern.realtime_activated = record.realtime_activated == Some(true);
    pattern.is_passenger = record.is_passenger != Some(false);
    pattern.train_class = record
        .train_class
        .as_deref()
        .map(str::trim)
        .unwrap_or("")
        .to_string();
    pattern.sleeper_code = record
        .sleepers
        .as_deref()
        .map(str::trim)
        .unwrap_or("")
        .to_string();
    pattern.is_bus = record
        .service_type
        .as_deref()
        .is_some_and(|t| t.trim().eq_ignore_ascii_case("bus"));
    pattern.origin_text = pair_text(record.origin.as_deref());
    pattern.destination_text = pair_text(record.destination.as_deref());

    for location in record.locations.as_deref().unwrap_or(&[]) {
        if let Some(stop) = convert_location(location) {
            pattern.stops.push(stop);
        }
    }

    Ok(pattern)
}

/// "Name HH:MM" for the first origin/destination pair, empty if none.
fn pair_text(pairs: Option<&[LocationPair]>) -> String {
    let Some(pair) = pairs.and_then(<[LocationPair]>::first) else {
        return String::new();
    };
    let name = pair.description.clone().unwrap_or_default();
    let time = pair
        .public_time
        .as_deref()
        .and_then(|t| RailTime::parse_wire(t).ok());
    match (name.is_empty(), time) {
        (false, Some(t)) => format!("{name} {t}"),
        (false, None) => name,
        (true, Some(t)) => t.to_string(),
        (true, None) => String::new(),
    }
}

fn convert_location(location: &LocationRecord) -> Option<Stop> {
    let crs = Crs::parse(location.crs.as_deref()?).ok()?;

    let mut stop = Stop::new(crs, location.description.clone().unwrap_or_default());
    stop.tiploc = location.tiploc.clone().unwrap_or_default();
    stop.platform = location
        .platform
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string);
    stop.platform_confirmed = location.platform_confirmed == Some(true);
    stop.platform_changed = location.platform_changed == Some(true);
    stop.booked_arrival = wire_time(location.gbtt_booked_arrival.as_deref());
    stop.booked_departure = wire_time(location.gbtt_booked_departure.as_deref());
    stop.realtime_arrival = wire_time(location.realtime_arrival.as_deref());
    stop.realtime_departure = wire_time(location.realtime_departure.as_deref());
    stop.arrival_actual = location.realtime_arrival_actual == Some(true);
    stop.departure_actual = location.realtime_departure_actual == Some(true);
    stop.arrival_no_report = location.realtime_arrival_no_report == Some(true);
    stop.departure_no_report = location.realtime_departure_no_report == Some(true);
    stop.pass_no_report = location.realtime_pass_no_report == Some(true);
    stop.call_type = call_type(location.display_as.as_deref());
    stop.is_public_call = location.is_public_call == Some(true);

    Some(stop)
}

/// Malformed wire times are treated as absent.
fn wire_time(raw: Option<&str>) -> Option<RailTime> {
    RailTime::parse_wire(raw?).ok()
}

fn call_type(display_as: Option<&str>) -> CallType {
    match display_as.unwrap_or("").trim().to_ascii_uppercase().as_str() {
        "PASS" => CallType::Pass,
        "CANCELLED_CALL" => CallType::CancelledCall,
        "CANCELLED_PASS" => CallType::CancelledPass,
        "STARTS" => CallType::Starts,
        "ENDS" => CallType::Ends,
        _ => CallType::Call,
    }
}
