//! Call pattern types.
//!
//! A `CallPattern` is the normalized form of one train occurrence: its
//! identity, operator metadata, and the ordered calling points the data
//! source reported. Patterns are owned by the normalizer until handed
//! downstream and are immutable afterwards.

use chrono::NaiveDate;

use super::{AtocCode, Crs, Headcode, RunId, Stop};

/// An off-corridor endpoint a pattern continues to or comes from.
///
/// Feeds the timetable's "comes from"/"continues to" extra rows. The CRS
/// may be absent for locations the source only knows by TIPLOC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// CRS code, if the location has one
    pub crs: Option<Crs>,
    /// TIPLOC timing-point id, empty if unknown
    pub tiploc: String,
    /// Display name
    pub name: String,
}

impl Endpoint {
    /// Builds an endpoint from a stop record.
    pub fn from_stop(stop: &Stop) -> Self {
        Self {
            crs: Some(stop.station),
            tiploc: stop.tiploc.clone(),
            name: stop.station_name.clone(),
        }
    }

    /// Short display text: CRS if known, else TIPLOC, else name.
    pub fn display(&self) -> &str {
        match &self.crs {
            Some(crs) => crs.as_str(),
            None if !self.tiploc.is_empty() => &self.tiploc,
            None => &self.name,
        }
    }
}

/// One train occurrence: identity plus its ordered calling pattern.
#[derive(Debug, Clone)]
pub struct CallPattern {
    /// Run identifier; split products carry a "(1)"/"(2)" suffix
    pub run_id: RunId,
    /// The pre-split run id, set only on split products
    pub original_run_id: Option<RunId>,
    /// Date of the run
    pub run_date: NaiveDate,
    /// Display identity for column headers (headcode-style), suffixed on
    /// split like the run id
    pub identity: String,
    /// Validated headcode, when the identity is in standard format
    pub headcode: Option<Headcode>,
    /// Operator ATOC code
    pub operator_code: Option<AtocCode>,
    /// Operator display name
    pub operator_name: String,
    /// Booked origin display text ("Name HH:MM")
    pub origin_text: String,
    /// Booked destination display text
    pub destination_text: String,
    /// Whether live (predicted/actual) times exist for this run
    pub realtime_activated: bool,
    /// Passenger service flag
    pub is_passenger: bool,
    /// Train class code; "S" means standard-only, empty means unknown
    pub train_class: String,
    /// Sleeper accommodation code, empty if none
    pub sleeper_code: String,
    /// Replacement-bus flag
    pub is_bus: bool,
    /// Ordered calling points
    pub stops: Vec<Stop>,
    /// Where the first half of a split run came from
    pub comes_from: Option<Endpoint>,
    /// Where the second half of a split run continues to
    pub continues_to: Option<Endpoint>,
}

impl CallPattern {
    /// Creates a pattern with identity fields only; callers fill in stops
    /// and metadata.
    pub fn new(run_id: RunId, run_date: NaiveDate) -> Self {
        let identity = run_id.as_str().to_string();
        Self {
            run_id,
            original_run_id: None,
            run_date,
            identity,
            headcode: None,
            operator_code: None,
            operator_name: String::new(),
            origin_text: String::new(),
            destination_text: String::new(),
            realtime_activated: false,
            is_passenger: true,
            train_class: String::new(),
            sleeper_code: String::new(),
            is_bus: false,
            stops: Vec::new(),
            comes_from: None,
            continues_to: None,
        }
    }

    /// True for patterns produced by the normalizer's reversal split.
    pub fn is_split_product(&self) -> bool {
        self.original_run_id.is_some()
    }

    /// Returns the first calling point.
    pub fn first_stop(&self) -> Option<&Stop> {
        self.stops.first()
    }

    /// Returns the last calling point.
    pub fn last_stop(&self) -> Option<&Stop> {
        self.stops.last()
    }

    /// "origin → destination" text for tooltips, empty if neither is known.
    pub fn route_text(&self) -> String {
        if self.origin_text.is_empty() && self.destination_text.is_empty() {
            String::new()
        } else {
            format!("{} → {}", self.origin_text, self.destination_text)
        }
    }

    /// Identity plus route, for trace logs.
    pub fn label(&self) -> String {
        let route = self.route_text();
        if route.is_empty() {
            self.identity.clone()
        } else {
            format!("{} ({})", self.identity, route)
        }
    }

    /// Whether first-class accommodation is available: passenger service,
    /// class not standard-only, and not a replacement bus.
    pub fn first_class_available(&self) -> bool {
        self.is_passenger && self.train_class != "S" && !self.is_bus
    }

    /// Whether the run carries sleeper accommodation.
    pub fn is_sleeper(&self) -> bool {
        !self.sleeper_code.is_empty()
    }
}
