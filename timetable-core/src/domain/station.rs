//! Station identity types.

use std::fmt;

/// Error returned when parsing an invalid CRS code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid CRS code: {reason}")]
pub struct InvalidCrs {
    reason: &'static str,
}

/// A valid 3-letter CRS (Computer Reservation System) station code.
///
/// CRS codes are always 3 uppercase ASCII letters. This type guarantees
/// that any `Crs` value is valid by construction. Two stations are the
/// same entity iff their codes match.
///
/// # Examples
///
/// ```
/// use timetable_core::domain::Crs;
///
/// let shr = Crs::parse("SHR").unwrap();
/// assert_eq!(shr.as_str(), "SHR");
///
/// // Lowercase is rejected
/// assert!(Crs::parse("shr").is_err());
///
/// // Wrong length is rejected
/// assert!(Crs::parse("SH").is_err());
/// assert!(Crs::parse("SHRW").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crs([u8; 3]);

impl Crs {
    /// Parse a CRS code from a string.
    ///
    /// The input must be exactly 3 uppercase ASCII letters (A-Z).
    pub fn parse(s: &str) -> Result<Self, InvalidCrs> {
        let bytes = s.as_bytes();

        if bytes.len() != 3 {
            return Err(InvalidCrs {
                reason: "must be exactly 3 characters",
            });
        }

        for &b in bytes {
            if !b.is_ascii_uppercase() {
                return Err(InvalidCrs {
                    reason: "must be uppercase ASCII letters A-Z",
                });
            }
        }

        Ok(Crs([bytes[0], bytes[1], bytes[2]]))
    }

    /// Returns the CRS code as a string slice.
    pub fn as_str(&self) -> &str {
        // SAFETY: We only store valid ASCII uppercase letters
        std::str::from_utf8(&self.0).unwrap()
    }
}

impl fmt::Debug for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Crs({})", self.as_str())
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A station as displayed in the assembled timetable.
///
/// Identity is the CRS code; `tiploc` is the secondary timing-point id
/// the data source carries for locations without a CRS, and `name` is the
/// human-readable station name used for row labels and tooltips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    /// CRS code (primary identity)
    pub crs: Crs,
    /// TIPLOC timing-point id, empty if unknown
    pub tiploc: String,
    /// Display name; falls back to the CRS code when the source has none
    pub name: String,
}

impl Station {
    /// Creates a station, defaulting the name to the CRS code when empty.
    pub fn new(crs: Crs, tiploc: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let name = if name.is_empty() {
            crs.as_str().to_string()
        } else {
            name
        };
        Self {
            crs,
            tiploc: tiploc.into(),
            name,
        }
    }

    /// A station known only by its code (no source metadata).
    pub fn from_code(crs: Crs) -> Self {
        Self::new(crs, "", "")
    }
}
