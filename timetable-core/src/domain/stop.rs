//! Calling-point types for train patterns.
//!
//! A `Stop` is one calling-point record inside a train's pattern, carrying
//! scheduled ("booked") and realtime arrival/departure times plus the
//! status flags the data source attaches to each. `CallType` distinguishes
//! public calls from passes, cancellations, and the synthetic start/end
//! markers the source uses for part-cancelled services.

use super::{Crs, RailTime};

/// How the data source classifies one calling point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallType {
    /// Public calling point
    Call,
    /// Non-stopping pass-through
    Pass,
    /// A call removed by cancellation
    CancelledCall,
    /// A pass removed by cancellation
    CancelledPass,
    /// Service starts here short of its booked origin
    Starts,
    /// Service terminates here short of its booked destination
    Ends,
}

impl CallType {
    /// True for pass-throughs (cancelled or not): the train does not call.
    pub fn is_pass(self) -> bool {
        matches!(self, CallType::Pass | CallType::CancelledPass)
    }
}

/// One calling-point record in a train's pattern.
///
/// # Time Semantics
///
/// - Origins carry only departures, destinations only arrivals.
/// - Booked times are the public schedule; realtime times are predictions
///   that become actuals once the movement is reported.
/// - A no-report flag means the train is realtime-activated but no live
///   time could be obtained for this movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    /// Station CRS code
    pub station: Crs,
    /// Station display name
    pub station_name: String,
    /// TIPLOC timing-point id, empty if unknown
    pub tiploc: String,
    /// Platform number/letter (if known)
    pub platform: Option<String>,
    /// Realtime confirmation that the platform is as advertised
    pub platform_confirmed: bool,
    /// Realtime platform alteration flag
    pub platform_changed: bool,
    /// Scheduled arrival time
    pub booked_arrival: Option<RailTime>,
    /// Scheduled departure time
    pub booked_departure: Option<RailTime>,
    /// Realtime (predicted or actual) arrival time
    pub realtime_arrival: Option<RailTime>,
    /// Realtime (predicted or actual) departure time
    pub realtime_departure: Option<RailTime>,
    /// The realtime arrival has been observed, not just predicted
    pub arrival_actual: bool,
    /// The realtime departure has been observed, not just predicted
    pub departure_actual: bool,
    /// No live arrival report could be obtained
    pub arrival_no_report: bool,
    /// No live departure report could be obtained
    pub departure_no_report: bool,
    /// No live pass report could be obtained (applies to both movements)
    pub pass_no_report: bool,
    /// Calling classification
    pub call_type: CallType,
    /// Whether passengers may board/alight here
    pub is_public_call: bool,
}

impl Stop {
    /// Creates a bare call at a station with no times set.
    pub fn new(station: Crs, station_name: impl Into<String>) -> Self {
        Self {
            station,
            station_name: station_name.into(),
            tiploc: String::new(),
            platform: None,
            platform_confirmed: false,
            platform_changed: false,
            booked_arrival: None,
            booked_departure: None,
            realtime_arrival: None,
            realtime_departure: None,
            arrival_actual: false,
            departure_actual: false,
            arrival_no_report: false,
            departure_no_report: false,
            pass_no_report: false,
            call_type: CallType::Call,
            is_public_call: true,
        }
    }

    /// True unless this stop is a (cancelled) pass-through.
    pub fn is_calling(&self) -> bool {
        !self.call_type.is_pass()
    }

    /// Schedule-first arrival: booked if present, else realtime.
    ///
    /// This is the value the matrix uses for dwell and row-mode decisions,
    /// where the public schedule is the reference even when live data
    /// exists.
    pub fn slot_arrival(&self) -> Option<RailTime> {
        self.booked_arrival.or(self.realtime_arrival)
    }

    /// Schedule-first departure: booked if present, else realtime.
    pub fn slot_departure(&self) -> Option<RailTime> {
        self.booked_departure.or(self.realtime_departure)
    }

    /// Any arrival time at all, booked or realtime.
    pub fn has_arrival(&self) -> bool {
        self.booked_arrival.is_some() || self.realtime_arrival.is_some()
    }

    /// Any departure time at all, booked or realtime.
    pub fn has_departure(&self) -> bool {
        self.booked_departure.is_some() || self.realtime_departure.is_some()
    }

    /// No-report status for one movement direction.
    pub fn no_report(&self, is_arrival: bool) -> bool {
        if is_arrival {
            self.pass_no_report || self.arrival_no_report
        } else {
            self.pass_no_report || self.departure_no_report
        }
    }

    /// Dwell in minutes between the schedule-first arrival and departure,
    /// if both exist.
    pub fn dwell_minutes(&self) -> Option<u32> {
        let arr = self.slot_arrival()?;
        let dep = self.slot_departure()?;
        Some(dep.signed_minutes_since(arr).unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crs(s: &str) -> Crs {
        Crs::parse(s).unwrap()
    }

    fn t(s: &str) -> RailTime {
        RailTime::parse_hhmm(s).unwrap()
    }

    #[test]
    fn call_type_pass_classification() {
        assert!(CallType::Pass.is_pass());
        assert!(CallType::CancelledPass.is_pass());
        assert!(!CallType::Call.is_pass());
        assert!(!CallType::CancelledCall.is_pass());
        assert!(!CallType::Starts.is_pass());
        assert!(!CallType::Ends.is_pass());
    }

    #[test]
    fn new_stop_defaults() {
        let stop = Stop::new(crs("SHR"), "Shrewsbury");
        assert_eq!(stop.station, crs("SHR"));
        assert!(stop.is_calling());
        assert!(stop.is_public_call);
        assert!(!stop.has_arrival());
        assert!(!stop.has_departure());
        assert!(stop.dwell_minutes().is_none());
    }

    #[test]
    fn slot_times_prefer_schedule() {
        let mut stop = Stop::new(crs("SHR"), "Shrewsbury");
        stop.realtime_arrival = Some(t("10:05"));
        assert_eq!(stop.slot_arrival(), Some(t("10:05")));

        stop.booked_arrival = Some(t("10:00"));
        assert_eq!(stop.slot_arrival(), Some(t("10:00")));

        stop.realtime_departure = Some(t("10:08"));
        assert_eq!(stop.slot_departure(), Some(t("10:08")));
        stop.booked_departure = Some(t("10:02"));
        assert_eq!(stop.slot_departure(), Some(t("10:02")));
    }

    #[test]
    fn dwell_is_absolute() {
        let mut stop = Stop::new(crs("SHR"), "Shrewsbury");
        stop.booked_arrival = Some(t("10:00"));
        stop.booked_departure = Some(t("10:07"));
        assert_eq!(stop.dwell_minutes(), Some(7));

        // Out-of-order source data still gives a magnitude
        stop.booked_departure = Some(t("09:58"));
        assert_eq!(stop.dwell_minutes(), Some(2));
    }

    #[test]
    fn no_report_per_direction() {
        let mut stop = Stop::new(crs("SHR"), "Shrewsbury");
        assert!(!stop.no_report(true));
        assert!(!stop.no_report(false));

        stop.arrival_no_report = true;
        assert!(stop.no_report(true));
        assert!(!stop.no_report(false));

        stop.arrival_no_report = false;
        stop.pass_no_report = true;
        assert!(stop.no_report(true));
        assert!(stop.no_report(false));
    }
}
