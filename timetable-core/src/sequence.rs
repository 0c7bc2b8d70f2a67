//! Station sequencing.
//!
//! Merges the differing station subsequences of many call patterns into
//! one total station order for the corridor. Each pattern contributes the
//! calling points between consecutive corridor-waypoint hits; segments
//! running against the waypoint chain are reversed before merging, so both
//! travel directions feed the same order (the reverse direction simply
//! reads it back-to-front).
//!
//! Merging is positional: an unseen station goes immediately before its
//! nearest already-placed following neighbour, next to a lone known
//! neighbour, or at the end. Disagreements between a pattern and the
//! accumulated order are recorded as diagnostics and the best-effort order
//! is kept.

use std::collections::HashMap;

use tracing::debug;

use crate::corridor::CorridorSpec;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::domain::{CallPattern, Crs, Station};

/// The derived station order for one corridor query.
///
/// Invariants: each station appears at most once, and positions are the
/// contiguous range `0..len()`. Position lookup is O(1) via an auxiliary
/// map kept in step with the sequence.
#[derive(Debug, Clone, Default)]
pub struct StationOrder {
    stations: Vec<Station>,
    index: HashMap<Crs, usize>,
}

impl StationOrder {
    /// An empty order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of a station, if present.
    pub fn position(&self, crs: Crs) -> Option<usize> {
        self.index.get(&crs).copied()
    }

    /// Whether a station is in the order.
    pub fn contains(&self, crs: Crs) -> bool {
        self.index.contains_key(&crs)
    }

    /// The ordered stations.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Station at a position.
    pub fn get(&self, position: usize) -> Option<&Station> {
        self.stations.get(position)
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// True when no station has been placed.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Inserts an unseen station immediately before `next`.
    ///
    /// No-op (returning false) when the station is already placed or
    /// `next` is not.
    pub fn insert_before(&mut self, station: Station, next: Crs) -> bool {
        if self.contains(station.crs) {
            return false;
        }
        let Some(pos) = self.position(next) else {
            return false;
        };
        self.insert_at(pos, station);
        true
    }

    /// Inserts an unseen station immediately after `prev`.
    pub fn insert_after(&mut self, station: Station, prev: Crs) -> bool {
        if self.contains(station.crs) {
            return false;
        }
        let Some(pos) = self.position(prev) else {
            return false;
        };
        self.insert_at(pos + 1, station);
        true
    }

    /// Appends an unseen station at the end.
    pub fn push_back(&mut self, station: Station) -> bool {
        if self.contains(station.crs) {
            return false;
        }
        let pos = self.stations.len();
        self.insert_at(pos, station);
        true
    }

    fn insert_at(&mut self, position: usize, station: Station) {
        self.index.insert(station.crs, position);
        self.stations.insert(position, station);
        // Re-number everything displaced to the right.
        for (i, st) in self.stations.iter().enumerate().skip(position + 1) {
            self.index.insert(st.crs, i);
        }
    }
}

/// Merges all patterns' corridor segments into one station order.
///
/// With no patterns at all, the corridor waypoints themselves form the
/// order. Conflicts are recorded in `diagnostics`; the order keeps its
/// best-effort shape.
pub fn build_station_order(
    corridor: &CorridorSpec,
    patterns: &[CallPattern],
    diagnostics: &mut Diagnostics,
) -> StationOrder {
    let mut order = StationOrder::new();

    if patterns.is_empty() {
        for wp in corridor.waypoints() {
            order.push_back(Station::from_code(wp.crs));
        }
        return order;
    }

    for pattern in patterns {
        merge_pattern(&mut order, corridor, pattern, diagnostics);
    }

    validate_patterns(&order, patterns, diagnostics);

    debug!(stations = order.len(), "station order built");
    order
}

/// Merges one pattern's waypoint-to-waypoint segments.
fn merge_pattern(
    order: &mut StationOrder,
    corridor: &CorridorSpec,
    pattern: &CallPattern,
    diagnostics: &mut Diagnostics,
) {
    // Every stop at a corridor waypoint, passes included: the hits anchor
    // the segments, even where the train does not call.
    let hits: Vec<(usize, usize)> = pattern
        .stops
        .iter()
        .enumerate()
        .filter_map(|(i, stop)| corridor.waypoint_index(stop.station).map(|c| (i, c)))
        .collect();

    for pair in hits.windows(2) {
        let (i1, c1) = pair[0];
        let (i2, c2) = pair[1];
        if i1 == i2 {
            continue;
        }

        // Hits come in stop order, so i1 < i2; only the corridor
        // orientation can run backwards.
        let mut segment = collect_calling(&pattern.stops[i1..=i2]);
        if c1 > c2 {
            segment.reverse();
        }

        if !segment.is_empty() {
            merge_sequence(order, &segment, pattern, diagnostics);
        }
    }
}

fn collect_calling(stops: &[crate::domain::Stop]) -> Vec<Station> {
    stops
        .iter()
        .filter(|s| s.is_calling())
        .map(|s| Station::new(s.station, s.tiploc.clone(), s.station_name.clone()))
        .collect()
}

/// Merges one oriented calling sequence into the order.
fn merge_sequence(
    order: &mut StationOrder,
    sequence: &[Station],
    pattern: &CallPattern,
    diagnostics: &mut Diagnostics,
) {
    for (idx, station) in sequence.iter().enumerate() {
        if order.contains(station.crs) {
            continue;
        }

        let prev_known = sequence[..idx]
            .iter()
            .rev()
            .find(|s| order.contains(s.crs))
            .map(|s| s.crs);
        let next_known = sequence[idx + 1..]
            .iter()
            .find(|s| order.contains(s.crs))
            .map(|s| s.crs);

        match (prev_known, next_known) {
            (Some(prev), Some(next)) => {
                let prev_pos = order.position(prev).unwrap_or(0);
                let next_pos = order.position(next).unwrap_or(0);
                if prev_pos >= next_pos {
                    diagnostics.push(
                        DiagnosticKind::StationOrderConflict,
                        format!(
                            "inserting {} between {} and {} (run {})",
                            station.crs, prev, next, pattern.run_id
                        ),
                    );
                }
                // Insert before the following neighbour even on conflict.
                order.insert_before(station.clone(), next);
            }
            (Some(prev), None) => {
                order.insert_after(station.clone(), prev);
            }
            (None, Some(next)) => {
                order.insert_before(station.clone(), next);
            }
            (None, None) => {
                order.push_back(station.clone());
            }
        }
    }

    // The whole segment must now map onto strictly increasing positions.
    let positions: Vec<usize> = sequence
        .iter()
        .filter_map(|s| order.position(s.crs))
        .collect();
    if positions.windows(2).any(|w| w[0] >= w[1]) {
        let route: Vec<&str> = sequence.iter().map(|s| s.crs.as_str()).collect();
        diagnostics.push(
            DiagnosticKind::StationOrderConflict,
            format!(
                "pattern disagrees with station order: {} (run {})",
                route.join(" → "),
                pattern.run_id
            ),
        );
    }
}

/// Re-checks every pattern's calling stops against the final order.
///
/// A pattern's corridor-relevant calling positions must be strictly
/// monotone — increasing for forward traversals, decreasing for reverse
/// ones. Anything else disagrees with the merged order.
fn validate_patterns(
    order: &StationOrder,
    patterns: &[CallPattern],
    diagnostics: &mut Diagnostics,
) {
    for pattern in patterns {
        let positions: Vec<usize> = pattern
            .stops
            .iter()
            .filter(|s| s.is_calling())
            .filter_map(|s| order.position(s.station))
            .collect();
        if positions.len() < 2 {
            continue;
        }

        let increasing = positions.windows(2).all(|w| w[0] < w[1]);
        let decreasing = positions.windows(2).all(|w| w[0] > w[1]);
        if !increasing && !decreasing {
            let route: Vec<String> = positions
                .iter()
                .filter_map(|&p| order.get(p))
                .map(|s| s.crs.as_str().to_string())
                .collect();
            diagnostics.push(
                DiagnosticKind::StationOrderConflict,
                format!(
                    "pattern disagrees with station order: {} (run {})",
                    route.join(" → "),
                    pattern.run_id
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CallType, RailTime, RunId, Stop};
    use chrono::NaiveDate;

    fn crs(s: &str) -> Crs {
        Crs::parse(s).unwrap()
    }

    fn station(code: &str) -> Station {
        Station::from_code(crs(code))
    }

    fn pattern(id: &str, codes: &[&str]) -> CallPattern {
        let mut p = CallPattern::new(
            RunId::new(id.to_string()).unwrap(),
            NaiveDate::from_ymd_opt(2025, 11, 20).unwrap(),
        );
        p.stops = codes
            .iter()
            .enumerate()
            .map(|(i, code)| {
                let mut stop = Stop::new(crs(code), *code);
                stop.booked_departure =
                    RailTime::from_hm(9, (i as u32 * 5) % 60).ok();
                stop
            })
            .collect();
        p
    }

    fn corridor(codes: &[&str]) -> CorridorSpec {
        let codes: Vec<Crs> = codes.iter().map(|c| crs(c)).collect();
        CorridorSpec::from_codes(&codes)
    }

    fn order_codes(order: &StationOrder) -> Vec<&str> {
        order.stations().iter().map(|s| s.crs.as_str()).collect()
    }

    // StationOrder invariants

    #[test]
    fn positions_are_contiguous_after_inserts() {
        let mut order = StationOrder::new();
        order.push_back(station("AAA"));
        order.push_back(station("DDD"));
        order.insert_before(station("CCC"), crs("DDD"));
        order.insert_after(station("BBB"), crs("AAA"));

        assert_eq!(order_codes(&order), vec!["AAA", "BBB", "CCC", "DDD"]);
        for (i, st) in order.stations().iter().enumerate() {
            assert_eq!(order.position(st.crs), Some(i));
        }
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut order = StationOrder::new();
        assert!(order.push_back(station("AAA")));
        assert!(!order.push_back(station("AAA")));
        assert!(!order.insert_after(station("AAA"), crs("AAA")));
        assert_eq!(order.len(), 1);
    }

    #[test]
    fn insert_adjacent_to_unknown_neighbour_is_rejected() {
        let mut order = StationOrder::new();
        assert!(!order.insert_before(station("AAA"), crs("ZZZ")));
        assert!(order.is_empty());
    }

    // Merge scenarios

    #[test]
    fn clean_merge_interleaves_intermediates() {
        // Scenario: [A,B,D] then [A,C,D] over waypoints A,D gives A,B,C,D.
        let mut diags = Diagnostics::new();
        let patterns = vec![
            pattern("P10001", &["AAA", "BBB", "DDD"]),
            pattern("P10002", &["AAA", "CCC", "DDD"]),
        ];
        let order = build_station_order(&corridor(&["AAA", "DDD"]), &patterns, &mut diags);

        assert_eq!(order_codes(&order), vec!["AAA", "BBB", "CCC", "DDD"]);
        assert!(diags.is_empty());
    }

    #[test]
    fn conflicting_pattern_is_flagged_and_order_kept() {
        // Scenario: [A,B,C] then [A,C,B] over waypoints A,C keeps A,B,C and
        // flags the second pattern.
        let mut diags = Diagnostics::new();
        let patterns = vec![
            pattern("P10001", &["AAA", "BBB", "CCC"]),
            pattern("P10002", &["AAA", "CCC", "BBB"]),
        ];
        let order = build_station_order(&corridor(&["AAA", "CCC"]), &patterns, &mut diags);

        assert_eq!(order_codes(&order), vec!["AAA", "BBB", "CCC"]);
        assert!(diags.count_of(DiagnosticKind::StationOrderConflict) >= 1);
        let message = &diags.entries()[0].message;
        assert!(message.contains("P10002"), "got: {message}");
    }

    #[test]
    fn reverse_pattern_contributes_in_corridor_orientation() {
        let mut diags = Diagnostics::new();
        let patterns = vec![
            pattern("P10001", &["AAA", "DDD"]),
            // Runs the corridor backwards, calling at an extra station.
            pattern("P10002", &["DDD", "BBB", "AAA"]),
        ];
        let order = build_station_order(&corridor(&["AAA", "DDD"]), &patterns, &mut diags);

        assert_eq!(order_codes(&order), vec!["AAA", "BBB", "DDD"]);
        assert!(diags.is_empty());
    }

    #[test]
    fn passes_are_anchors_but_not_members() {
        let mut diags = Diagnostics::new();
        let mut p = pattern("P10001", &["AAA", "BBB", "DDD"]);
        p.stops[1].call_type = CallType::Pass;
        let order = build_station_order(&corridor(&["AAA", "DDD"]), &[p], &mut diags);

        // BBB is passed, not called, so it never enters the order.
        assert_eq!(order_codes(&order), vec!["AAA", "DDD"]);
        assert!(diags.is_empty());
    }

    #[test]
    fn empty_input_falls_back_to_waypoints() {
        let mut diags = Diagnostics::new();
        let order = build_station_order(&corridor(&["AAA", "BBB", "CCC"]), &[], &mut diags);
        assert_eq!(order_codes(&order), vec!["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn stations_outside_waypoint_span_are_ignored() {
        // The second pattern's trailing call after the last waypoint hit
        // contributes nothing.
        let mut diags = Diagnostics::new();
        let patterns = vec![
            pattern("P10001", &["AAA", "CCC"]),
            pattern("P10002", &["AAA", "CCC", "EEE"]),
        ];
        let order = build_station_order(&corridor(&["AAA", "CCC"]), &patterns, &mut diags);
        assert_eq!(order_codes(&order), vec!["AAA", "CCC"]);
    }

    #[test]
    fn multi_waypoint_chain_merges_segment_by_segment() {
        let mut diags = Diagnostics::new();
        let patterns = vec![
            pattern("P10001", &["AAA", "BBB", "CCC", "DDD", "EEE"]),
            pattern("P10002", &["AAA", "XXX", "CCC", "YYY", "EEE"]),
        ];
        let order = build_station_order(
            &corridor(&["AAA", "CCC", "EEE"]),
            &patterns,
            &mut diags,
        );
        assert_eq!(
            order_codes(&order),
            vec!["AAA", "BBB", "XXX", "CCC", "DDD", "YYY", "EEE"]
        );
        assert!(diags.is_empty());
    }
}
