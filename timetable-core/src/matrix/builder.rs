//! Matrix construction.
//!
//! Takes the station order (already restricted to one direction's reading)
//! and that direction's patterns, prunes both to the displayed fixed
//! point, then lays out rows and fills cells.

use std::collections::HashSet;

use itertools::Itertools;
use tracing::debug;

use crate::config::BuildConfig;
use crate::domain::{CallPattern, Crs, Endpoint, RailTime, Station, Stop};

use super::cell::{Cell, PlatformNote, choose_displayed_time};
use super::{Matrix, Row, RowKind, Slot, StationRowMode, TrainColumn};

/// Dwells longer than this many minutes get separate arr/dep rows.
const TWO_ROW_DWELL_MINUTES: u32 = 2;

/// Cap on display fixed-point iterations.
const DISPLAY_FIXED_POINT_ITERATIONS: usize = 5;

/// Builds the matrix for one direction.
///
/// `stations` is the full merged station order in this direction's reading;
/// the builder prunes it to stations with at least one public call among
/// the surviving trains, iterating the station set and the ≥2-distinct-stop
/// train filter to a fixed point.
pub fn build_matrix(
    stations: &[Station],
    patterns: Vec<CallPattern>,
    config: &BuildConfig,
) -> Matrix {
    let full_set: HashSet<Crs> = stations.iter().map(|s| s.crs).collect();

    let (display, working) = display_fixed_point(stations, patterns, config);
    let num_stations = display.len();
    let num_trains = working.len();

    debug!(
        stations = num_stations,
        trains = num_trains,
        "matrix display set settled"
    );

    // Schedule-first time grid.
    let mut slots: Vec<Vec<Slot>> = vec![vec![Slot::default(); num_trains]; num_stations];
    for (i, station) in display.iter().enumerate() {
        for (s, pattern) in working.iter().enumerate() {
            if let Some(stop) = pattern.stops.iter().find(|st| st.station == station.crs) {
                slots[i][s] = Slot {
                    arr: stop.slot_arrival(),
                    dep: stop.slot_departure(),
                    stop: Some(stop.clone()),
                };
            }
        }
    }

    let station_modes = station_modes(&slots, num_trains);
    let trains = summarize_trains(working, &slots, config);
    let (comes_from, continues_to) = endpoint_links(&trains, &full_set);

    let need_top = comes_from.iter().any(Option::is_some);
    let need_bottom = continues_to.iter().any(Option::is_some);

    let mut rows = layout_rows(&display, &station_modes, need_top, need_bottom, num_trains);
    fill_station_cells(&mut rows, &slots, &trains, config);
    fill_endpoint_cells(&mut rows, &comes_from, &continues_to);

    let mut matrix = Matrix {
        stations: display,
        station_modes,
        rows,
        slots,
        trains,
    };
    mark_skipped_stations(&mut matrix);
    matrix
}

/// Iterates the displayed-station set and the train filter to a fixed
/// point, capped at five rounds.
fn display_fixed_point(
    stations: &[Station],
    patterns: Vec<CallPattern>,
    config: &BuildConfig,
) -> (Vec<Station>, Vec<CallPattern>) {
    let mut working = patterns;
    let mut display: Vec<Station> = Vec::new();
    let mut prev_key = String::new();

    for _ in 0..DISPLAY_FIXED_POINT_ITERATIONS {
        display = stations
            .iter()
            .filter(|station| {
                working.iter().any(|p| {
                    p.stops
                        .iter()
                        .any(|st| st.station == station.crs && st.is_calling() && st.is_public_call)
                })
            })
            .cloned()
            .collect();
        let display_set: HashSet<Crs> = display.iter().map(|s| s.crs).collect();

        let filtered: Vec<CallPattern> = working
            .into_iter()
            .filter(|p| {
                calls_at_least_two(p, &display_set) && calls_all_in_window(p, &display_set, config)
            })
            .collect();

        let key = format!(
            "{}|{}",
            display.iter().map(|s| s.crs.as_str()).join(","),
            filtered.len()
        );
        working = filtered;
        if key == prev_key {
            break;
        }
        prev_key = key;
    }

    (display, working)
}

/// At least two distinct displayed stations get a real call.
fn calls_at_least_two(pattern: &CallPattern, display_set: &HashSet<Crs>) -> bool {
    let mut seen = HashSet::new();
    for stop in &pattern.stops {
        if !display_set.contains(&stop.station) || !stop.is_calling() {
            continue;
        }
        seen.insert(stop.station);
        if seen.len() >= 2 {
            return true;
        }
    }
    false
}

/// Every displayed call falls inside the query time window.
fn calls_all_in_window(
    pattern: &CallPattern,
    display_set: &HashSet<Crs>,
    config: &BuildConfig,
) -> bool {
    if config.time_window.is_none() {
        return true;
    }
    pattern.stops.iter().all(|stop| {
        if !display_set.contains(&stop.station) || !stop.is_calling() {
            return true;
        }
        match window_time(stop) {
            Some(time) => config.in_window(time),
            None => false,
        }
    })
}

/// The time a stop is judged against the query window by.
fn window_time(stop: &Stop) -> Option<RailTime> {
    stop.booked_departure
        .or(stop.booked_arrival)
        .or(stop.realtime_departure)
        .or(stop.realtime_arrival)
}

/// Decides each station's row mode from the dwells across all trains.
fn station_modes(slots: &[Vec<Slot>], num_trains: usize) -> Vec<StationRowMode> {
    slots
        .iter()
        .map(|row| {
            let mut has_arr = false;
            let mut has_dep = false;
            let mut long_dwell = false;
            for s in 0..num_trains {
                let slot = &row[s];
                if slot.arr.is_some() {
                    has_arr = true;
                }
                if slot.dep.is_some() {
                    has_dep = true;
                }
                if let (Some(arr), Some(dep)) = (slot.arr, slot.dep) {
                    if dep.signed_minutes_since(arr).unsigned_abs() > TWO_ROW_DWELL_MINUTES {
                        long_dwell = true;
                    }
                }
            }
            match (has_arr && has_dep, long_dwell) {
                (true, true) => StationRowMode::Two,
                (true, false) => StationRowMode::Merged,
                (false, _) => StationRowMode::Single,
            }
        })
        .collect()
}

/// Wraps patterns as columns with their end-to-end summary flags.
fn summarize_trains(
    patterns: Vec<CallPattern>,
    slots: &[Vec<Slot>],
    config: &BuildConfig,
) -> Vec<TrainColumn> {
    patterns
        .into_iter()
        .enumerate()
        .map(|(s, pattern)| {
            let realtime = pattern.realtime_activated;
            let mut has_any = false;
            let mut has_non_struck = false;
            let mut has_any_time = false;
            let mut has_non_no_report = false;

            for station_slots in slots {
                let Some(stop) = station_slots[s].stop.as_ref() else {
                    continue;
                };
                for is_arrival in [true, false] {
                    let present = if is_arrival {
                        stop.has_arrival()
                    } else {
                        stop.has_departure()
                    };
                    if !present {
                        continue;
                    }
                    let chosen = choose_displayed_time(
                        stop,
                        is_arrival,
                        realtime,
                        config.realtime_enabled,
                    );
                    if chosen.is_present() {
                        has_any = true;
                        has_any_time = true;
                        if !chosen.format.no_report {
                            has_non_no_report = true;
                        }
                        if !chosen.format.cancelled {
                            has_non_struck = true;
                        }
                    }
                }
            }

            TrainColumn {
                pattern,
                all_cancelled: has_any && !has_non_struck,
                all_no_report: has_any_time && !has_non_no_report,
            }
        })
        .collect()
}

/// Per-train endpoint links for the extra rows.
///
/// A link exists when a pattern's first/last stop lies outside the full
/// station set, or when the normalizer split the pattern and recorded
/// where it continues from/to.
fn endpoint_links(
    trains: &[TrainColumn],
    full_set: &HashSet<Crs>,
) -> (Vec<Option<Endpoint>>, Vec<Option<Endpoint>>) {
    let mut comes_from = Vec::with_capacity(trains.len());
    let mut continues_to = Vec::with_capacity(trains.len());

    for column in trains {
        let pattern = &column.pattern;

        let mut from = pattern
            .first_stop()
            .filter(|stop| !full_set.contains(&stop.station))
            .map(Endpoint::from_stop);
        let mut to = pattern
            .last_stop()
            .filter(|stop| !full_set.contains(&stop.station))
            .map(Endpoint::from_stop);

        // Split cross-links win over plain off-corridor endpoints.
        if let Some(link) = &pattern.comes_from {
            from = Some(link.clone());
        }
        if let Some(link) = &pattern.continues_to {
            to = Some(link.clone());
        }

        comes_from.push(from);
        continues_to.push(to);
    }

    (comes_from, continues_to)
}

/// Lays out the empty row skeleton.
fn layout_rows(
    display: &[Station],
    modes: &[StationRowMode],
    need_top: bool,
    need_bottom: bool,
    num_trains: usize,
) -> Vec<Row> {
    let empty_cells = || vec![None; num_trains];
    let mut rows = Vec::new();

    if need_top {
        rows.push(Row {
            kind: RowKind::ComesFrom,
            station_label: "Comes from".to_string(),
            arr_dep_label: "",
            cells: empty_cells(),
        });
    }

    for (i, station) in display.iter().enumerate() {
        match modes[i] {
            StationRowMode::Two => {
                rows.push(Row {
                    kind: RowKind::Arrival { station: i },
                    station_label: station.name.clone(),
                    arr_dep_label: "arr",
                    cells: empty_cells(),
                });
                rows.push(Row {
                    kind: RowKind::Departure { station: i },
                    station_label: String::new(),
                    arr_dep_label: "dep",
                    cells: empty_cells(),
                });
            }
            StationRowMode::Merged => {
                rows.push(Row {
                    kind: RowKind::Merged { station: i },
                    station_label: station.name.clone(),
                    arr_dep_label: "",
                    cells: empty_cells(),
                });
            }
            StationRowMode::Single => {
                rows.push(Row {
                    kind: RowKind::Single { station: i },
                    station_label: station.name.clone(),
                    arr_dep_label: "",
                    cells: empty_cells(),
                });
            }
        }
    }

    if need_bottom {
        rows.push(Row {
            kind: RowKind::ContinuesTo,
            station_label: "Continues to".to_string(),
            arr_dep_label: "",
            cells: empty_cells(),
        });
    }

    rows
}

/// Fills the station rows with displayed times.
fn fill_station_cells(
    rows: &mut [Row],
    slots: &[Vec<Slot>],
    trains: &[TrainColumn],
    config: &BuildConfig,
) {
    for row in rows.iter_mut() {
        let Some(station) = row.kind.station() else {
            continue;
        };
        for (s, column) in trains.iter().enumerate() {
            let Some(stop) = slots[station][s].stop.as_ref() else {
                continue;
            };

            let is_arrival = match row.kind {
                RowKind::Arrival { .. } => true,
                RowKind::Departure { .. } => false,
                // Merged and single rows prefer the departure when the
                // stop has one.
                _ => !stop.has_departure(),
            };

            let chosen = choose_displayed_time(
                stop,
                is_arrival,
                column.pattern.realtime_activated,
                config.realtime_enabled,
            );
            if !chosen.is_present() {
                continue;
            }

            let platform = config.show_platforms.then(|| {
                let label = stop
                    .platform
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty());
                PlatformNote {
                    text: match label {
                        Some(p) => format!("[{p}]"),
                        None => "[?]".to_string(),
                    },
                    confirmed: config.realtime_enabled && stop.platform_confirmed,
                    changed: config.realtime_enabled && stop.platform_changed,
                }
            });

            row.cells[s] = Some(Cell {
                text: chosen.text,
                minutes: chosen.time,
                tooltip: None,
                platform,
                format: chosen.format,
            });
        }
    }
}

/// Fills the endpoint-link rows.
fn fill_endpoint_cells(
    rows: &mut [Row],
    comes_from: &[Option<Endpoint>],
    continues_to: &[Option<Endpoint>],
) {
    for row in rows.iter_mut() {
        let links = match row.kind {
            RowKind::ComesFrom => comes_from,
            RowKind::ContinuesTo => continues_to,
            _ => continue,
        };
        for (s, link) in links.iter().enumerate() {
            if let Some(endpoint) = link {
                if row.cells[s].is_none() {
                    row.cells[s] =
                        Some(Cell::endpoint(endpoint.display(), endpoint.name.clone()));
                }
            }
        }
    }
}

/// Marks stations a train runs through without data between its first and
/// last called stations.
fn mark_skipped_stations(matrix: &mut Matrix) {
    let num_stations = matrix.num_stations();
    let station_rows: Vec<Vec<usize>> = (0..num_stations)
        .map(|i| matrix.station_rows(i))
        .collect();

    for s in 0..matrix.num_trains() {
        let called: Vec<bool> = station_rows
            .iter()
            .map(|rows| {
                rows.iter()
                    .any(|&r| matrix.rows[r].cells[s].as_ref().is_some_and(|c| !c.text.is_empty()))
            })
            .collect();

        let Some(first) = called.iter().position(|&c| c) else {
            continue;
        };
        let Some(last) = called.iter().rposition(|&c| c) else {
            continue;
        };
        if last <= first {
            continue;
        }

        for station in first + 1..last {
            if called[station] {
                continue;
            }
            for &r in &station_rows[station] {
                let cell = &mut matrix.rows[r].cells[s];
                if cell.is_none() {
                    *cell = Some(Cell::skipped_marker());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CallType, RunId};
    use chrono::NaiveDate;

    fn crs(s: &str) -> Crs {
        Crs::parse(s).unwrap()
    }

    fn t(s: &str) -> RailTime {
        RailTime::parse_hhmm(s).unwrap()
    }

    fn station(code: &str) -> Station {
        Station::from_code(crs(code))
    }

    fn pattern(id: &str, calls: &[(&str, Option<&str>, Option<&str>)]) -> CallPattern {
        let mut p = CallPattern::new(
            RunId::new(id.to_string()).unwrap(),
            NaiveDate::from_ymd_opt(2025, 11, 20).unwrap(),
        );
        p.stops = calls
            .iter()
            .map(|(code, arr, dep)| {
                let mut stop = Stop::new(crs(code), *code);
                stop.booked_arrival = arr.map(|a| t(a));
                stop.booked_departure = dep.map(|d| t(d));
                stop
            })
            .collect();
        p
    }

    fn stations(codes: &[&str]) -> Vec<Station> {
        codes.iter().map(|c| station(c)).collect()
    }

    #[test]
    fn short_dwells_merge_long_dwells_split() {
        let patterns = vec![
            pattern(
                "P10001",
                &[
                    ("AAA", None, Some("09:00")),
                    ("BBB", Some("09:20"), Some("09:21")),
                    ("CCC", Some("09:40"), None),
                ],
            ),
            pattern(
                "P10002",
                &[
                    ("AAA", None, Some("10:00")),
                    ("BBB", Some("10:20"), Some("10:26")),
                    ("CCC", Some("10:45"), None),
                ],
            ),
        ];
        let matrix = build_matrix(
            &stations(&["AAA", "BBB", "CCC"]),
            patterns,
            &BuildConfig::default(),
        );

        // BBB has a 6-minute dwell on the second train: two rows.
        assert_eq!(matrix.station_modes[1], StationRowMode::Two);
        // AAA only ever departs, CCC only ever arrives.
        assert_eq!(matrix.station_modes[0], StationRowMode::Single);
        assert_eq!(matrix.station_modes[2], StationRowMode::Single);

        // Rows: AAA, BBB arr, BBB dep, CCC.
        assert_eq!(matrix.rows.len(), 4);
        assert_eq!(matrix.rows[1].arr_dep_label, "arr");
        assert_eq!(matrix.rows[2].arr_dep_label, "dep");
        assert_eq!(matrix.rows[1].label(), "BBB (arr)");
        assert_eq!(matrix.rows[2].label(), "(dep)");

        // Two-row pairs reported for the sequencer's scans.
        assert_eq!(matrix.two_row_pairs(), vec![(1, 2)]);
    }

    #[test]
    fn merged_mode_prefers_departure() {
        let patterns = vec![pattern(
            "P10001",
            &[
                ("AAA", None, Some("09:00")),
                ("BBB", Some("09:20"), Some("09:21")),
                ("CCC", Some("09:40"), Some("09:41")),
            ],
        )];
        let matrix = build_matrix(
            &stations(&["AAA", "BBB", "CCC"]),
            patterns,
            &BuildConfig::default(),
        );

        assert_eq!(matrix.station_modes[1], StationRowMode::Merged);
        let bbb_row = &matrix.rows[1];
        let cell = bbb_row.cells[0].as_ref().unwrap();
        assert_eq!(cell.text, "09:21");
    }

    #[test]
    fn trains_with_fewer_than_two_displayed_calls_are_dropped() {
        let patterns = vec![
            pattern(
                "P10001",
                &[("AAA", None, Some("09:00")), ("CCC", Some("09:40"), None)],
            ),
            // Only one corridor call.
            pattern("P10002", &[("AAA", None, Some("09:10"))]),
        ];
        let matrix = build_matrix(
            &stations(&["AAA", "CCC"]),
            patterns,
            &BuildConfig::default(),
        );
        assert_eq!(matrix.num_trains(), 1);
        assert_eq!(matrix.trains[0].pattern.run_id.as_str(), "P10001");
    }

    #[test]
    fn stations_without_public_calls_are_pruned() {
        let mut p1 = pattern(
            "P10001",
            &[
                ("AAA", None, Some("09:00")),
                ("BBB", Some("09:20"), Some("09:21")),
                ("CCC", Some("09:40"), None),
            ],
        );
        // BBB is a pass for the only train: hidden.
        p1.stops[1].call_type = CallType::Pass;
        let matrix = build_matrix(
            &stations(&["AAA", "BBB", "CCC"]),
            vec![p1],
            &BuildConfig::default(),
        );
        let codes: Vec<&str> = matrix.stations.iter().map(|s| s.crs.as_str()).collect();
        assert_eq!(codes, vec!["AAA", "CCC"]);
    }

    #[test]
    fn pruning_iterates_to_fixed_point() {
        // The second train only calls at AAA and BBB; once BBB is pruned
        // (its only other caller is a non-public stop) the train follows,
        // which in turn prunes nothing further.
        let mut p2 = pattern(
            "P10002",
            &[("AAA", None, Some("09:10")), ("BBB", Some("09:30"), None)],
        );
        p2.stops[1].is_public_call = false;
        let p1 = pattern(
            "P10001",
            &[("AAA", None, Some("09:00")), ("CCC", Some("09:40"), None)],
        );
        let matrix = build_matrix(
            &stations(&["AAA", "BBB", "CCC"]),
            vec![p1, p2],
            &BuildConfig::default(),
        );
        let codes: Vec<&str> = matrix.stations.iter().map(|s| s.crs.as_str()).collect();
        assert_eq!(codes, vec!["AAA", "CCC"]);
        assert_eq!(matrix.num_trains(), 1);
    }

    #[test]
    fn time_window_filters_trains() {
        let patterns = vec![
            pattern(
                "P10001",
                &[("AAA", None, Some("09:00")), ("CCC", Some("09:40"), None)],
            ),
            pattern(
                "P10002",
                &[("AAA", None, Some("14:00")), ("CCC", Some("14:40"), None)],
            ),
        ];
        let config = BuildConfig::default().windowed(t("08:00"), t("11:00"));
        let matrix = build_matrix(&stations(&["AAA", "CCC"]), patterns, &config);
        assert_eq!(matrix.num_trains(), 1);
        assert_eq!(matrix.trains[0].pattern.run_id.as_str(), "P10001");
    }

    #[test]
    fn off_corridor_endpoints_produce_extra_rows() {
        let patterns = vec![pattern(
            "P10001",
            &[
                ("XXX", None, Some("08:30")),
                ("AAA", Some("08:50"), Some("09:00")),
                ("CCC", Some("09:40"), Some("09:42")),
                ("YYY", Some("10:00"), None),
            ],
        )];
        let matrix = build_matrix(
            &stations(&["AAA", "CCC"]),
            patterns,
            &BuildConfig::default(),
        );

        assert!(matches!(matrix.rows.first().unwrap().kind, RowKind::ComesFrom));
        assert!(matches!(matrix.rows.last().unwrap().kind, RowKind::ContinuesTo));

        let top = matrix.rows.first().unwrap().cells[0].as_ref().unwrap();
        assert_eq!(top.text, "XXX");
        assert!(top.format.italic);
        let bottom = matrix.rows.last().unwrap().cells[0].as_ref().unwrap();
        assert_eq!(bottom.text, "YYY");
    }

    #[test]
    fn split_links_override_endpoints() {
        let mut p = pattern(
            "P10001",
            &[
                ("AAA", None, Some("09:00")),
                ("CCC", Some("09:40"), None),
            ],
        );
        p.continues_to = Some(Endpoint {
            crs: Some(crs("ZZZ")),
            tiploc: String::new(),
            name: "Somewhere Else".to_string(),
        });
        let matrix = build_matrix(
            &stations(&["AAA", "CCC"]),
            vec![p],
            &BuildConfig::default(),
        );
        let bottom = matrix.rows.last().unwrap().cells[0].as_ref().unwrap();
        assert_eq!(bottom.text, "ZZZ");
        assert_eq!(bottom.tooltip.as_deref(), Some("Somewhere Else"));
    }

    #[test]
    fn skipped_station_gets_marker() {
        let patterns = vec![
            pattern(
                "P10001",
                &[
                    ("AAA", None, Some("09:00")),
                    ("BBB", Some("09:20"), Some("09:21")),
                    ("CCC", Some("09:40"), None),
                ],
            ),
            // Second train runs through BBB without calling.
            pattern(
                "P10002",
                &[("AAA", None, Some("10:00")), ("CCC", Some("10:40"), None)],
            ),
        ];
        let matrix = build_matrix(
            &stations(&["AAA", "BBB", "CCC"]),
            patterns,
            &BuildConfig::default(),
        );

        let bbb_rows = matrix.station_rows(1);
        let marker = matrix.rows[bbb_rows[0]].cells[1].as_ref().unwrap();
        assert_eq!(marker.text, "|");
        assert!(!marker.has_time());
    }

    #[test]
    fn no_marker_outside_called_span() {
        // Train calls only at BBB and CCC: AAA is before its run, no marker.
        let patterns = vec![
            pattern(
                "P10001",
                &[("AAA", None, Some("09:00")), ("CCC", Some("09:40"), None)],
            ),
            pattern(
                "P10002",
                &[
                    ("BBB", None, Some("10:20")),
                    ("CCC", Some("10:40"), None),
                ],
            ),
        ];
        let matrix = build_matrix(
            &stations(&["AAA", "BBB", "CCC"]),
            patterns,
            &BuildConfig::default(),
        );
        let aaa_rows = matrix.station_rows(0);
        assert!(matrix.rows[aaa_rows[0]].cells[1].is_none());
    }

    #[test]
    fn all_cancelled_flag() {
        let mut p = pattern(
            "P10001",
            &[
                ("AAA", None, Some("09:00")),
                ("CCC", Some("09:40"), None),
            ],
        );
        for stop in &mut p.stops {
            stop.call_type = CallType::CancelledCall;
        }
        let reference = pattern(
            "P10002",
            &[("AAA", None, Some("10:00")), ("CCC", Some("10:40"), None)],
        );
        let matrix = build_matrix(
            &stations(&["AAA", "CCC"]),
            vec![p, reference],
            &BuildConfig::default(),
        );
        assert!(matrix.trains[0].all_cancelled);
        assert!(!matrix.trains[1].all_cancelled);
    }

    #[test]
    fn all_no_report_flag() {
        let mut p = pattern(
            "P10001",
            &[
                ("AAA", None, Some("09:00")),
                ("CCC", Some("09:40"), None),
            ],
        );
        p.realtime_activated = true;
        for stop in &mut p.stops {
            stop.arrival_no_report = true;
            stop.departure_no_report = true;
        }
        let matrix = build_matrix(
            &stations(&["AAA", "CCC"]),
            vec![p.clone()],
            &BuildConfig::with_realtime(),
        );
        assert!(matrix.trains[0].all_no_report);

        // Schedule-only display never sees no-reports.
        let matrix = build_matrix(&stations(&["AAA", "CCC"]), vec![p], &BuildConfig::default());
        assert!(!matrix.trains[0].all_no_report);
    }

    #[test]
    fn platform_notes_only_when_enabled() {
        let mut p = pattern(
            "P10001",
            &[
                ("AAA", None, Some("09:00")),
                ("CCC", Some("09:40"), None),
            ],
        );
        p.stops[0].platform = Some("4".to_string());

        let plain = build_matrix(
            &stations(&["AAA", "CCC"]),
            vec![p.clone()],
            &BuildConfig::default(),
        );
        let cell = plain.rows[0].cells[0].as_ref().unwrap();
        assert!(cell.platform.is_none());

        let mut config = BuildConfig::default();
        config.show_platforms = true;
        let with_platforms = build_matrix(&stations(&["AAA", "CCC"]), vec![p], &config);
        let cell = with_platforms.rows[0].cells[0].as_ref().unwrap();
        assert_eq!(cell.platform.as_ref().unwrap().text, "[4]");

        // Unknown platform shows the placeholder.
        let cell = with_platforms.rows[1].cells[0].as_ref().unwrap();
        assert_eq!(cell.platform.as_ref().unwrap().text, "[?]");
    }
}
