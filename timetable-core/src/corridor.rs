//! Corridor specification.
//!
//! A corridor is the origin/via/destination chain one timetable query is
//! built over. The caller supplies it already expanded: optional-waypoint
//! powerset enumeration happens upstream, so this core always sees a single
//! concrete waypoint chain.

use std::collections::HashMap;

use crate::domain::Crs;

/// One corridor-designated station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waypoint {
    /// Station code
    pub crs: Crs,
    /// Whether trains must serve this waypoint (origin and destination
    /// always are; intermediate vias may be optional)
    pub required: bool,
}

impl Waypoint {
    /// A required waypoint.
    pub fn required(crs: Crs) -> Self {
        Self {
            crs,
            required: true,
        }
    }

    /// An optional via.
    pub fn optional(crs: Crs) -> Self {
        Self {
            crs,
            required: false,
        }
    }
}

/// Ordered waypoint chain for one query. Immutable input.
#[derive(Debug, Clone)]
pub struct CorridorSpec {
    waypoints: Vec<Waypoint>,
    index: HashMap<Crs, usize>,
}

impl CorridorSpec {
    /// Builds a corridor from an ordered waypoint chain.
    ///
    /// A station repeated in the chain keeps its first position, matching
    /// how the coarse waypoint index is consumed downstream.
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        let mut index = HashMap::new();
        for (i, wp) in waypoints.iter().enumerate() {
            index.entry(wp.crs).or_insert(i);
        }
        Self { waypoints, index }
    }

    /// Convenience constructor from codes, all required.
    pub fn from_codes(codes: &[Crs]) -> Self {
        Self::new(codes.iter().copied().map(Waypoint::required).collect())
    }

    /// The ordered waypoints.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Position of a station in the waypoint chain, if it is one.
    pub fn waypoint_index(&self, crs: Crs) -> Option<usize> {
        self.index.get(&crs).copied()
    }

    /// Whether a station is a corridor waypoint.
    pub fn contains(&self, crs: Crs) -> bool {
        self.index.contains_key(&crs)
    }

    /// Number of waypoints.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// True when the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}
