//! Train operator code type.

use std::fmt;

/// Error returned when parsing an invalid ATOC code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid ATOC code: {reason}")]
pub struct InvalidAtocCode {
    reason: &'static str,
}

/// A two-letter ATOC train operating company code (e.g., "GW", "VT").
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtocCode([u8; 2]);

impl AtocCode {
    /// Parse an ATOC code from a string.
    ///
    /// The input must be exactly 2 uppercase ASCII letters.
    pub fn parse(s: &str) -> Result<Self, InvalidAtocCode> {
        let bytes = s.as_bytes();

        if bytes.len() != 2 {
            return Err(InvalidAtocCode {
                reason: "must be exactly 2 characters",
            });
        }
        for &b in bytes {
            if !b.is_ascii_uppercase() {
                return Err(InvalidAtocCode {
                    reason: "must be uppercase ASCII letters A-Z",
                });
            }
        }

        Ok(AtocCode([bytes[0], bytes[1]]))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        // SAFETY: We only store valid ASCII uppercase letters
        std::str::from_utf8(&self.0).unwrap()
    }
}

impl fmt::Debug for AtocCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AtocCode({})", self.as_str())
    }
}

impl fmt::Display for AtocCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid() {
        assert!(AtocCode::parse("GW").is_ok());
        assert!(AtocCode::parse("VT").is_ok());
        assert!(AtocCode::parse("ZZ").is_ok());
    }

    #[test]
    fn reject_invalid() {
        assert!(AtocCode::parse("").is_err());
        assert!(AtocCode::parse("G").is_err());
        assert!(AtocCode::parse("GWR").is_err());
        assert!(AtocCode::parse("gw").is_err());
        assert!(AtocCode::parse("G1").is_err());
    }

    #[test]
    fn as_str_roundtrip() {
        assert_eq!(AtocCode::parse("GW").unwrap().as_str(), "GW");
        assert_eq!(AtocCode::parse("VT").unwrap().to_string(), "VT");
    }
}
