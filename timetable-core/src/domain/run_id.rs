//! Run identity type.

use std::fmt;

/// Error returned when parsing an invalid run id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid run id: {reason}")]
pub struct InvalidRunId {
    reason: &'static str,
}

/// The data source's unique identifier for one train occurrence.
///
/// Run ids are opaque identifiers assigned upstream; the only validation is
/// that they must be non-empty. A run id together with its run date
/// identifies a physical run.
///
/// When the normalizer splits a pattern at a service reversal, the split
/// products keep the original id with a "(1)"/"(2)" suffix so the two
/// columns remain distinguishable.
///
/// # Examples
///
/// ```
/// use timetable_core::domain::RunId;
///
/// let id = RunId::new("P12345".to_string()).unwrap();
/// assert_eq!(id.as_str(), "P12345");
/// assert_eq!(id.with_suffix("(1)").as_str(), "P12345(1)");
///
/// // Empty strings are rejected
/// assert!(RunId::new("".to_string()).is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RunId(String);

impl RunId {
    /// Create a new run id from a string.
    ///
    /// Returns an error if the string is empty.
    pub fn new(s: String) -> Result<Self, InvalidRunId> {
        if s.is_empty() {
            return Err(InvalidRunId {
                reason: "run id cannot be empty",
            });
        }
        Ok(RunId(s))
    }

    /// Returns the run id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the RunId and returns the inner String.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns a copy with a split-product suffix appended.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        RunId(format!("{}{}", self.0, suffix))
    }
}

impl fmt::Debug for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RunId({})", self.0)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_valid_id() {
        assert!(RunId::new("P12345".to_string()).is_ok());
        assert!(RunId::new("Q67890".to_string()).is_ok());
        assert!(RunId::new("X".to_string()).is_ok());
    }

    #[test]
    fn reject_empty() {
        assert!(RunId::new("".to_string()).is_err());
    }

    #[test]
    fn as_str_roundtrip() {
        let id = RunId::new("P12345".to_string()).unwrap();
        assert_eq!(id.as_str(), "P12345");
    }

    #[test]
    fn with_suffix_appends() {
        let id = RunId::new("P12345".to_string()).unwrap();
        assert_eq!(id.with_suffix("(1)").as_str(), "P12345(1)");
        assert_eq!(id.with_suffix("(2)").as_str(), "P12345(2)");
        // Original is unchanged
        assert_eq!(id.as_str(), "P12345");
    }

    #[test]
    fn display() {
        let id = RunId::new("Q67890".to_string()).unwrap();
        assert_eq!(id.to_string(), "Q67890");
    }

    #[test]
    fn equality_and_hash() {
        use std::collections::HashSet;
        let a = RunId::new("P12345".to_string()).unwrap();
        let b = RunId::new("P12345".to_string()).unwrap();
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert!(!set.contains(&RunId::new("Q67890".to_string()).unwrap()));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any non-empty string is a valid run id
        #[test]
        fn nonempty_always_valid(s in ".+") {
            prop_assert!(RunId::new(s).is_ok());
        }

        /// Roundtrip: new then as_str returns the original
        #[test]
        fn roundtrip(s in ".+") {
            let id = RunId::new(s.clone()).unwrap();
            prop_assert_eq!(id.as_str(), s.as_str());
        }

        /// Suffixing concatenates
        #[test]
        fn suffix_concatenates(s in "[A-Z][0-9]{4}") {
            let id = RunId::new(s.clone()).unwrap();
            let suffixed = id.with_suffix("(2)");
            let expected = format!("{}(2)", s);
            prop_assert_eq!(suffixed.as_str(), expected.as_str());
        }
    }
}
