//! Timetable time handling.
//!
//! The data source provides times as bare "HHMM" strings (occasionally
//! "HHMMSS" with seconds) without any date attached. The assembly pipeline
//! works entirely in minutes since midnight and forgives midnight rollover
//! only at the comparison sites that scan down a train's column, so the
//! time type here is deliberately date-free; `RolloverTracker` supplies the
//! rollover-aware absolute scale where a scan needs one.

use std::fmt;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Minutes in a day.
pub const DAY_MINUTES: u32 = 24 * 60;

/// A time of day with minute precision.
///
/// Stored as minutes since midnight (0..1440). Ordering is within-day;
/// overnight comparisons go through [`RolloverTracker`].
///
/// # Examples
///
/// ```
/// use timetable_core::domain::RailTime;
///
/// let t = RailTime::parse_wire("0930").unwrap();
/// assert_eq!(t.to_string(), "09:30");
/// assert_eq!(t.minutes(), 9 * 60 + 30);
///
/// // Display form parses too
/// assert_eq!(RailTime::parse_hhmm("09:30").unwrap(), t);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RailTime(u16);

impl RailTime {
    /// Create a time from hour and minute components.
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, TimeError> {
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        Ok(Self((hour * 60 + minute) as u16))
    }

    /// Parse a wire-format time: "HHMM", or "HHMMSS" (seconds dropped).
    pub fn parse_wire(s: &str) -> Result<Self, TimeError> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 && bytes.len() != 6 {
            return Err(TimeError::new("expected HHMM or HHMMSS format"));
        }
        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minute = parse_two_digits(&bytes[2..4])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        Self::from_hm(hour, minute)
    }

    /// Parse a display-format time: "HH:MM".
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        let bytes = s.as_bytes();
        if bytes.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }
        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }
        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        Self::from_hm(hour, minute)
    }

    /// Minutes since midnight (0..1440).
    pub fn minutes(&self) -> u32 {
        self.0 as u32
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.minutes() / 60
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.minutes() % 60
    }

    /// Signed difference `self - other` in minutes, within the same day.
    pub fn signed_minutes_since(&self, other: Self) -> i32 {
        self.minutes() as i32 - other.minutes() as i32
    }
}

impl fmt::Debug for RailTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RailTime({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for RailTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

/// Threshold for detecting midnight rollover in a time sequence.
///
/// A time more than 6 hours earlier than its predecessor is taken to be on
/// the next day; smaller backward jumps are genuine misorderings and are
/// left for the violation scans to flag.
pub const ROLLOVER_THRESHOLD_MINUTES: u32 = 6 * 60;

/// Rollover-tolerant absolute-minute scale for scanning a time sequence.
///
/// Feed times in sequence order; each call returns the time on a
/// monotonically extended scale where crossing midnight adds a day.
///
/// # Examples
///
/// ```
/// use timetable_core::domain::{RailTime, RolloverTracker};
///
/// let mut tracker = RolloverTracker::new();
/// let late = tracker.absolute(RailTime::parse_hhmm("23:30").unwrap());
/// let early = tracker.absolute(RailTime::parse_hhmm("00:15").unwrap());
/// assert!(early > late); // 00:15 next day
/// ```
#[derive(Debug, Clone, Default)]
pub struct RolloverTracker {
    day_offset: u32,
    prev: Option<u32>,
}

impl RolloverTracker {
    /// Start a fresh scan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Absolute minutes for the next time in the sequence.
    pub fn absolute(&mut self, time: RailTime) -> u32 {
        let mut base = time.minutes() + self.day_offset;
        if let Some(prev) = self.prev {
            if base < prev && prev - base > ROLLOVER_THRESHOLD_MINUTES {
                self.day_offset += DAY_MINUTES;
                base += DAY_MINUTES;
            }
        }
        self.prev = Some(base);
        base
    }
}
