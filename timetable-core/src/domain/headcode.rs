//! Train headcode (train identity) type.

use std::fmt;

/// A validated train headcode (train identity).
///
/// Standard UK headcodes follow the format: digit, letter, two digits
/// (e.g., "1A23"). Non-standard headcodes exist (charter trains, light
/// engine movements) but are rare; `Headcode::parse` returns `None` for
/// these rather than an error, since they're not invalid—just not in the
/// standard format. Column headers fall back to the raw identity string
/// the data source supplied.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Headcode([u8; 4]);

impl Headcode {
    /// Parse a headcode from a string.
    ///
    /// Standard format: digit (0-9), uppercase letter (A-Z), two digits.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();

        if bytes.len() != 4 {
            return None;
        }
        if !bytes[0].is_ascii_digit() {
            return None;
        }
        if !bytes[1].is_ascii_uppercase() {
            return None;
        }
        if !bytes[2].is_ascii_digit() || !bytes[3].is_ascii_digit() {
            return None;
        }

        Some(Headcode([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Returns the headcode as a string slice.
    pub fn as_str(&self) -> &str {
        // SAFETY: We only store valid ASCII characters
        std::str::from_utf8(&self.0).unwrap()
    }
}

impl fmt::Debug for Headcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Headcode({})", self.as_str())
    }
}

impl fmt::Display for Headcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
