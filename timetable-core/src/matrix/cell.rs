//! Cell contents and displayed-time selection.
//!
//! One cell of the assembled timetable: the text shown, the time value
//! behind it (used by the column sequencer), and formatting status. Cells
//! are built once and then mutated only by the sequencer's annotation
//! phase, which sets the `highlight` field.

use crate::domain::{RailTime, Stop};

/// Ordering violations flagged on a cell by the annotation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// The value exceeds the running minimum to its right in the row
    OutOfOrder,
    /// A departure earlier than the maximum arrival to its left at a
    /// two-row station
    DepartsBeforeArrival,
    /// The value regresses against the train's own earlier rows
    InternallyMisordered,
}

/// Formatting status attached to a cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellFormat {
    /// The realtime value has been observed, not just predicted
    pub actual: bool,
    /// The realtime value is a prediction
    pub predicted: bool,
    /// Struck through: a cancelled call or a short-formed start/end
    pub cancelled: bool,
    /// Realtime-activated but no live report for this movement
    pub no_report: bool,
    /// Italic (endpoint links and uncertain values)
    pub italic: bool,
    /// Hex delay color, when the delay is displayable
    pub delay_color: Option<String>,
    /// Signed delay in minutes, only set for observed times
    pub delay_minutes: Option<i32>,
    /// Annotation set by the column sequencer
    pub highlight: Option<Highlight>,
}

/// Platform annotation attached to a cell when platform display is on.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformNote {
    /// "[12]" or "[?]" when unknown
    pub text: String,
    /// Realtime confirmation
    pub confirmed: bool,
    /// Realtime alteration
    pub changed: bool,
}

/// One timetable cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Displayed text
    pub text: String,
    /// The time value behind the text, if the cell holds one
    pub minutes: Option<RailTime>,
    /// Hover text (endpoint rows carry the full station name)
    pub tooltip: Option<String>,
    /// Platform annotation
    pub platform: Option<PlatformNote>,
    /// Formatting status
    pub format: CellFormat,
}

impl Cell {
    /// The neutral marker for a station skipped mid-run.
    pub fn skipped_marker() -> Self {
        Self {
            text: "|".to_string(),
            minutes: None,
            tooltip: None,
            platform: None,
            format: CellFormat::default(),
        }
    }

    /// An endpoint-link cell for the comes-from/continues-to rows.
    pub fn endpoint(text: impl Into<String>, tooltip: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            minutes: None,
            tooltip: Some(tooltip.into()),
            platform: None,
            format: CellFormat {
                italic: true,
                ..CellFormat::default()
            },
        }
    }

    /// True when the cell carries a usable time value for ordering scans.
    pub fn has_time(&self) -> bool {
        self.minutes.is_some()
    }
}

/// A selected display time for one movement at one stop.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedTime {
    /// Text to show, empty when the source has nothing displayable
    pub text: String,
    /// The time behind the text
    pub time: Option<RailTime>,
    /// Formatting status
    pub format: CellFormat,
}

impl DisplayedTime {
    fn empty() -> Self {
        Self {
            text: String::new(),
            time: None,
            format: CellFormat::default(),
        }
    }

    /// True when there is something to display.
    pub fn is_present(&self) -> bool {
        !self.text.is_empty()
    }
}

/// Selects the displayed time and status for one movement at one stop.
///
/// Priority order: cancellations show the struck schedule; without
/// realtime (disabled, or the train never activated) the schedule shows
/// plain; a no-report movement shows its best time with an uncertainty
/// suffix; otherwise the realtime value shows with actual/predicted status
/// and a delay color.
pub fn choose_displayed_time(
    stop: &Stop,
    is_arrival: bool,
    realtime_activated: bool,
    realtime_enabled: bool,
) -> DisplayedTime {
    use crate::domain::CallType;

    let booked = if is_arrival {
        stop.booked_arrival
    } else {
        stop.booked_departure
    };
    let realtime = if is_arrival {
        stop.realtime_arrival
    } else {
        stop.realtime_departure
    };
    let observed = if is_arrival {
        stop.arrival_actual
    } else {
        stop.departure_actual
    };

    let struck = match stop.call_type {
        CallType::CancelledCall => true,
        CallType::Starts => is_arrival,
        CallType::Ends => !is_arrival,
        _ => false,
    };
    if struck {
        return match booked {
            Some(time) => DisplayedTime {
                text: time.to_string(),
                time: Some(time),
                format: CellFormat {
                    cancelled: true,
                    ..CellFormat::default()
                },
            },
            None => DisplayedTime::empty(),
        };
    }

    if !realtime_activated || !realtime_enabled {
        return match booked {
            Some(time) => DisplayedTime {
                text: time.to_string(),
                time: Some(time),
                format: CellFormat::default(),
            },
            None => DisplayedTime::empty(),
        };
    }

    if stop.no_report(is_arrival) {
        let base = realtime.or(booked);
        let text = match base {
            Some(time) => format!("{time}?"),
            None => "?".to_string(),
        };
        return DisplayedTime {
            text,
            time: base,
            format: CellFormat {
                no_report: true,
                italic: true,
                ..CellFormat::default()
            },
        };
    }

    if let Some(rt) = realtime {
        let delay = booked.map(|b| rt.signed_minutes_since(b));
        return DisplayedTime {
            text: rt.to_string(),
            time: Some(rt),
            format: CellFormat {
                actual: observed,
                predicted: !observed,
                italic: !observed,
                delay_color: delay.and_then(delay_color),
                delay_minutes: if observed { delay } else { None },
                ..CellFormat::default()
            },
        };
    }

    match booked {
        Some(time) => DisplayedTime {
            text: time.to_string(),
            time: Some(time),
            format: CellFormat::default(),
        },
        None => DisplayedTime::empty(),
    }
}

/// Near hue for early running.
const EARLY_NEAR: &str = "#1f3a6f";
/// Far hue for early running.
const EARLY_FAR: &str = "#2c6fbe";
/// Near hue for late running.
const LATE_NEAR: &str = "#7a1f1f";
/// Far hue for late running.
const LATE_FAR: &str = "#e53935";

/// Delay saturation point in minutes.
const DELAY_SATURATION: i32 = 20;

/// Maps a signed delay to a display hue.
///
/// Within a minute of schedule there is no color. Beyond that the hue
/// interpolates from a near tone to a far tone — blues for early running,
/// reds for late — saturating at 20 minutes.
pub fn delay_color(delay_minutes: i32) -> Option<String> {
    let magnitude = delay_minutes.abs();
    if magnitude <= 1 {
        return None;
    }

    let t = ((magnitude - 1) as f64 / (DELAY_SATURATION - 1) as f64).min(1.0);
    let (near, far) = if delay_minutes < 0 {
        (EARLY_NEAR, EARLY_FAR)
    } else {
        (LATE_NEAR, LATE_FAR)
    };
    Some(interpolate_hex(near, far, t))
}

fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    Some((
        ((value >> 16) & 0xff) as u8,
        ((value >> 8) & 0xff) as u8,
        (value & 0xff) as u8,
    ))
}

fn interpolate_hex(start: &str, end: &str, t: f64) -> String {
    let (Some((r1, g1, b1)), Some((r2, g2, b2))) = (hex_to_rgb(start), hex_to_rgb(end)) else {
        return end.to_string();
    };
    let mix = |a: u8, b: u8| -> u8 {
        (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8
    };
    format!(
        "#{:02x}{:02x}{:02x}",
        mix(r1, r2),
        mix(g1, g2),
        mix(b1, b2)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CallType, Crs};

    fn crs(s: &str) -> Crs {
        Crs::parse(s).unwrap()
    }

    fn t(s: &str) -> RailTime {
        RailTime::parse_hhmm(s).unwrap()
    }

    fn stop_with_times(arr: Option<&str>, dep: Option<&str>) -> Stop {
        let mut stop = Stop::new(crs("SHR"), "Shrewsbury");
        stop.booked_arrival = arr.map(|s| t(s));
        stop.booked_departure = dep.map(|s| t(s));
        stop
    }

    #[test]
    fn cancelled_call_shows_struck_schedule() {
        let mut stop = stop_with_times(Some("09:00"), Some("09:02"));
        stop.call_type = CallType::CancelledCall;
        stop.realtime_arrival = Some(t("09:05"));

        let chosen = choose_displayed_time(&stop, true, true, true);
        assert_eq!(chosen.text, "09:00");
        assert_eq!(chosen.time, Some(t("09:00")));
        assert!(chosen.format.cancelled);
        assert!(!chosen.format.actual);
    }

    #[test]
    fn starts_strikes_arrival_only() {
        let mut stop = stop_with_times(Some("09:00"), Some("09:02"));
        stop.call_type = CallType::Starts;

        let arr = choose_displayed_time(&stop, true, false, false);
        assert!(arr.format.cancelled);
        let dep = choose_displayed_time(&stop, false, false, false);
        assert!(!dep.format.cancelled);
        assert_eq!(dep.text, "09:02");
    }

    #[test]
    fn ends_strikes_departure_only() {
        let mut stop = stop_with_times(Some("09:00"), Some("09:02"));
        stop.call_type = CallType::Ends;

        assert!(!choose_displayed_time(&stop, true, false, false).format.cancelled);
        assert!(choose_displayed_time(&stop, false, false, false).format.cancelled);
    }

    #[test]
    fn schedule_only_without_realtime() {
        let mut stop = stop_with_times(Some("09:00"), None);
        stop.realtime_arrival = Some(t("09:07"));

        // Realtime disabled
        let chosen = choose_displayed_time(&stop, true, true, false);
        assert_eq!(chosen.text, "09:00");
        assert_eq!(chosen.format, CellFormat::default());

        // Train not activated
        let chosen = choose_displayed_time(&stop, true, false, true);
        assert_eq!(chosen.text, "09:00");
        assert_eq!(chosen.format, CellFormat::default());
    }

    #[test]
    fn no_report_suffixes_best_time() {
        let mut stop = stop_with_times(Some("09:00"), None);
        stop.arrival_no_report = true;

        let chosen = choose_displayed_time(&stop, true, true, true);
        assert_eq!(chosen.text, "09:00?");
        assert_eq!(chosen.time, Some(t("09:00")));
        assert!(chosen.format.no_report);
        assert!(chosen.format.italic);

        // Realtime value preferred as the base when present
        stop.realtime_arrival = Some(t("09:04"));
        let chosen = choose_displayed_time(&stop, true, true, true);
        assert_eq!(chosen.text, "09:04?");

        // No time at all still flags uncertainty
        let mut bare = Stop::new(crs("SHR"), "Shrewsbury");
        bare.arrival_no_report = true;
        let chosen = choose_displayed_time(&bare, true, true, true);
        assert_eq!(chosen.text, "?");
        assert!(chosen.time.is_none());
    }

    #[test]
    fn realtime_predicted_vs_actual() {
        let mut stop = stop_with_times(Some("09:00"), None);
        stop.realtime_arrival = Some(t("09:07"));

        let chosen = choose_displayed_time(&stop, true, true, true);
        assert_eq!(chosen.text, "09:07");
        assert!(chosen.format.predicted);
        assert!(!chosen.format.actual);
        assert!(chosen.format.delay_minutes.is_none());
        assert!(chosen.format.delay_color.is_some());

        stop.arrival_actual = true;
        let chosen = choose_displayed_time(&stop, true, true, true);
        assert!(chosen.format.actual);
        assert!(!chosen.format.predicted);
        assert_eq!(chosen.format.delay_minutes, Some(7));
    }

    #[test]
    fn realtime_fallback_to_schedule() {
        let stop = stop_with_times(None, Some("09:02"));
        let chosen = choose_displayed_time(&stop, false, true, true);
        assert_eq!(chosen.text, "09:02");
        assert_eq!(chosen.format, CellFormat::default());
    }

    #[test]
    fn nothing_displayable() {
        let stop = Stop::new(crs("SHR"), "Shrewsbury");
        let chosen = choose_displayed_time(&stop, true, false, false);
        assert!(!chosen.is_present());
        assert!(chosen.time.is_none());
    }

    #[test]
    fn delay_color_dead_zone() {
        assert!(delay_color(0).is_none());
        assert!(delay_color(1).is_none());
        assert!(delay_color(-1).is_none());
    }

    #[test]
    fn delay_color_directions() {
        let late = delay_color(5).unwrap();
        let early = delay_color(-5).unwrap();
        assert_ne!(late, early);
        // Saturation: 20 minutes and beyond look the same
        assert_eq!(delay_color(20), delay_color(45));
        assert_eq!(delay_color(-20), delay_color(-45));
        assert_eq!(delay_color(20).unwrap(), LATE_FAR);
        assert_eq!(delay_color(-20).unwrap(), EARLY_FAR);
    }

    #[test]
    fn delay_color_interpolates_towards_far_hue() {
        // Monotone approach to the far hue: the red channel grows with
        // lateness between the near and far tones.
        let r = |c: String| u8::from_str_radix(&c[1..3], 16).unwrap();
        let r5 = r(delay_color(5).unwrap());
        let r12 = r(delay_color(12).unwrap());
        let r20 = r(delay_color(20).unwrap());
        assert!(r5 < r12 && r12 < r20);
    }

    #[test]
    fn marker_and_endpoint_cells() {
        let marker = Cell::skipped_marker();
        assert_eq!(marker.text, "|");
        assert!(!marker.has_time());

        let endpoint = Cell::endpoint("BHM", "Birmingham New Street");
        assert!(endpoint.format.italic);
        assert_eq!(endpoint.tooltip.as_deref(), Some("Birmingham New Street"));
        assert!(!endpoint.has_time());
    }
}
