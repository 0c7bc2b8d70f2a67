//! Call-pattern normalization.
//!
//! Two concerns, applied in order before anything downstream sees the
//! patterns: splitting calling sequences that revisit a corridor station
//! (service reversals and joins run the same stock through a station
//! twice, which would fold two visits into one timetable column), and
//! deduplicating candidate records that describe the same physical run
//! (the same train is discovered from more than one station's search).

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use tracing::debug;

use crate::corridor::CorridorSpec;
use crate::domain::{CallPattern, Endpoint, Stop};

/// Splits reversing patterns, then removes duplicate records.
pub fn normalize_patterns(
    patterns: Vec<CallPattern>,
    corridor: &CorridorSpec,
) -> Vec<CallPattern> {
    dedupe_patterns(split_reversing_patterns(patterns, corridor))
}

/// Splits any pattern that revisits a station into two independent
/// patterns tagged "(1)" and "(2)".
///
/// The split point is the last corridor waypoint strictly before the
/// repeated visit (falling back to the stop just before it). The boundary
/// stop is shared by both halves, and cross-links record where each half
/// continues from/to so the matrix can render its extra rows. Patterns
/// already marked as split products are never re-split.
pub fn split_reversing_patterns(
    patterns: Vec<CallPattern>,
    corridor: &CorridorSpec,
) -> Vec<CallPattern> {
    let mut out = Vec::with_capacity(patterns.len());

    for pattern in patterns {
        if pattern.is_split_product() || pattern.stops.is_empty() {
            out.push(pattern);
            continue;
        }

        let Some(split_index) = find_repeat_split_index(&pattern.stops, corridor) else {
            out.push(pattern);
            continue;
        };

        debug!(
            run_id = %pattern.run_id,
            split_index,
            "splitting pattern at revisited station"
        );

        let first_stops: Vec<Stop> = pattern.stops[..=split_index].to_vec();
        let second_stops: Vec<Stop> = pattern.stops[split_index..].to_vec();

        let mut first = tag_split_product(&pattern, "(1)");
        first.continues_to = second_stops.last().map(Endpoint::from_stop);
        first.stops = first_stops;

        let mut second = tag_split_product(&pattern, "(2)");
        second.comes_from = pattern.stops.first().map(Endpoint::from_stop);
        second.stops = second_stops;

        out.push(first);
        out.push(second);
    }

    out
}

/// Finds the split index for the first revisited station, if any.
///
/// Returns the index of the last corridor waypoint strictly between the
/// first visit and the repeat, or the stop just before the repeat when no
/// waypoint lies in between.
fn find_repeat_split_index(stops: &[Stop], corridor: &CorridorSpec) -> Option<usize> {
    let mut first_seen: HashMap<crate::domain::Crs, usize> = HashMap::new();

    for (i, stop) in stops.iter().enumerate() {
        if let Some(&first_index) = first_seen.get(&stop.station) {
            let mut split_index = i - 1;
            for j in (first_index + 1..i).rev() {
                if corridor.contains(stops[j].station) {
                    split_index = j;
                    break;
                }
            }
            return Some(split_index);
        }
        first_seen.insert(stop.station, i);
    }

    None
}

/// Copies a pattern's identity with a split suffix, retaining the original
/// run id.
fn tag_split_product(pattern: &CallPattern, suffix: &str) -> CallPattern {
    let mut tagged = pattern.clone();
    tagged.original_run_id = Some(pattern.run_id.clone());
    tagged.run_id = pattern.run_id.with_suffix(suffix);
    tagged.identity = format!("{}{}", pattern.identity, suffix);
    tagged
}

/// Removes records describing the same physical run, keeping the first.
///
/// Two records are the same run when their run id, run date, and ordered
/// stop fingerprints (station, schedule-first arrival/departure, call
/// type) all match. Run ids are mandatory in this model, so the upstream
/// fallback-identity chain collapses to the id itself.
pub fn dedupe_patterns(patterns: Vec<CallPattern>) -> Vec<CallPattern> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(patterns.len());

    for pattern in patterns {
        let key = dedupe_key(&pattern);
        if seen.insert(key) {
            out.push(pattern);
        } else {
            debug!(run_id = %pattern.run_id, "dropping duplicate record");
        }
    }

    out
}

fn dedupe_key(pattern: &CallPattern) -> String {
    let mut key = format!("{}|{}", pattern.run_id, pattern.run_date);
    for stop in &pattern.stops {
        let arr = stop
            .slot_arrival()
            .map(|t| t.to_string())
            .unwrap_or_default();
        let dep = stop
            .slot_departure()
            .map(|t| t.to_string())
            .unwrap_or_default();
        let _ = write!(
            key,
            ">{}|{}|{}|{:?}",
            stop.station, arr, dep, stop.call_type
        );
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CallType, Crs, RailTime, RunId};
    use chrono::NaiveDate;

    fn crs(s: &str) -> Crs {
        Crs::parse(s).unwrap()
    }

    fn t(s: &str) -> RailTime {
        RailTime::parse_hhmm(s).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 20).unwrap()
    }

    fn stop(code: &str, dep: &str) -> Stop {
        let mut stop = Stop::new(crs(code), code);
        if !dep.is_empty() {
            stop.booked_departure = Some(t(dep));
        }
        stop
    }

    fn pattern(id: &str, stops: Vec<Stop>) -> CallPattern {
        let mut p = CallPattern::new(RunId::new(id.to_string()).unwrap(), date());
        p.stops = stops;
        p
    }

    fn corridor(codes: &[&str]) -> CorridorSpec {
        let codes: Vec<Crs> = codes.iter().map(|c| crs(c)).collect();
        CorridorSpec::from_codes(&codes)
    }

    #[test]
    fn no_repeat_no_split() {
        let p = pattern(
            "P10001",
            vec![stop("AAA", "09:00"), stop("BBB", "09:20"), stop("CCC", "09:40")],
        );
        let out = split_reversing_patterns(vec![p], &corridor(&["AAA", "CCC"]));
        assert_eq!(out.len(), 1);
        assert!(!out[0].is_split_product());
    }

    #[test]
    fn split_at_last_corridor_station_before_repeat() {
        // AAA BBB CCC BBB: revisits BBB; CCC is a corridor waypoint between
        // the two visits, so the split lands on CCC.
        let p = pattern(
            "P10001",
            vec![
                stop("AAA", "09:00"),
                stop("BBB", "09:20"),
                stop("CCC", "09:40"),
                stop("BBB", "10:00"),
            ],
        );
        let out = split_reversing_patterns(vec![p], &corridor(&["AAA", "CCC"]));
        assert_eq!(out.len(), 2);

        let first = &out[0];
        let second = &out[1];

        assert_eq!(first.run_id.as_str(), "P10001(1)");
        assert_eq!(second.run_id.as_str(), "P10001(2)");
        assert_eq!(first.identity, "P10001(1)");
        assert!(first.is_split_product());
        assert!(second.is_split_product());
        assert_eq!(first.original_run_id.as_ref().unwrap().as_str(), "P10001");

        // Both halves share the boundary stop CCC.
        let first_codes: Vec<&str> = first.stops.iter().map(|s| s.station.as_str()).collect();
        let second_codes: Vec<&str> = second.stops.iter().map(|s| s.station.as_str()).collect();
        assert_eq!(first_codes, vec!["AAA", "BBB", "CCC"]);
        assert_eq!(second_codes, vec!["CCC", "BBB"]);

        // Cross-links point at the far ends of the other half.
        assert_eq!(
            first.continues_to.as_ref().unwrap().crs,
            Some(crs("BBB"))
        );
        assert_eq!(second.comes_from.as_ref().unwrap().crs, Some(crs("AAA")));
    }

    #[test]
    fn split_falls_back_to_stop_before_repeat() {
        // No corridor waypoint between the visits: split just before the
        // repeat.
        let p = pattern(
            "P10001",
            vec![
                stop("AAA", "09:00"),
                stop("BBB", "09:20"),
                stop("DDD", "09:40"),
                stop("BBB", "10:00"),
            ],
        );
        let out = split_reversing_patterns(vec![p], &corridor(&["AAA", "CCC"]));
        assert_eq!(out.len(), 2);
        let first_codes: Vec<&str> = out[0].stops.iter().map(|s| s.station.as_str()).collect();
        assert_eq!(first_codes, vec!["AAA", "BBB", "DDD"]);
        let second_codes: Vec<&str> = out[1].stops.iter().map(|s| s.station.as_str()).collect();
        assert_eq!(second_codes, vec!["DDD", "BBB"]);
    }

    #[test]
    fn split_products_never_resplit() {
        let p = pattern(
            "P10001",
            vec![
                stop("AAA", "09:00"),
                stop("BBB", "09:20"),
                stop("AAA", "09:40"),
                stop("BBB", "10:00"),
            ],
        );
        let once = split_reversing_patterns(vec![p], &corridor(&["AAA", "BBB"]));
        assert_eq!(once.len(), 2);
        let twice = split_reversing_patterns(once.clone(), &corridor(&["AAA", "BBB"]));
        assert_eq!(twice.len(), 2);
        assert_eq!(twice[0].run_id.as_str(), once[0].run_id.as_str());
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let a = pattern("P10001", vec![stop("AAA", "09:00"), stop("BBB", "09:20")]);
        let mut b = a.clone();
        b.operator_name = "discovered elsewhere".to_string();
        let c = pattern("P10002", vec![stop("AAA", "09:05"), stop("BBB", "09:25")]);

        let out = dedupe_patterns(vec![a, b, c]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].run_id.as_str(), "P10001");
        // First occurrence wins
        assert_eq!(out[0].operator_name, "");
        assert_eq!(out[1].run_id.as_str(), "P10002");
    }

    #[test]
    fn dedupe_distinguishes_differing_times() {
        let a = pattern("P10001", vec![stop("AAA", "09:00")]);
        let b = pattern("P10001", vec![stop("AAA", "09:05")]);
        let out = dedupe_patterns(vec![a, b]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn dedupe_distinguishes_call_types() {
        let a = pattern("P10001", vec![stop("AAA", "09:00")]);
        let mut cancelled = a.clone();
        cancelled.stops[0].call_type = CallType::CancelledCall;
        let out = dedupe_patterns(vec![a, cancelled]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn normalize_runs_split_then_dedupe() {
        let p = pattern(
            "P10001",
            vec![
                stop("AAA", "09:00"),
                stop("BBB", "09:20"),
                stop("CCC", "09:40"),
                stop("BBB", "10:00"),
            ],
        );
        let duplicate = p.clone();
        let out = normalize_patterns(vec![p, duplicate], &corridor(&["AAA", "CCC"]));
        // One split pair; the duplicate record collapses onto it.
        assert_eq!(out.len(), 2);
    }
}
