//! Relaxation passes for stuck trains.
//!
//! When a full queue rotation completes with no insertions, the trains
//! left over genuinely conflict with the placed order. Three passes try
//! progressively weaker constraint views, each gated so that trains whose
//! unmodified bounds still admit more than one open slot are left alone —
//! weakening a genuinely free ordering would corrupt it.

use crate::config::BuildConfig;
use crate::matrix::{Matrix, StationRowMode};

use super::bounds::{
    TimeView, ViewOverrides, attempt_exact_insert, count_open_slots, insert_first_candidate,
    station_bounds,
};
use super::trace::SortTrace;

/// Pass 1: retry with only the arrival value at a two-row station.
///
/// Scans candidate stations end to start. If the override alone does not
/// free an exact (or first-eligible) slot, additionally try removing the
/// blocking lower- or upper-bound neighbour, inserting the candidate
/// normally, then reinserting the neighbour under the same arr-only view.
///
/// Returns the resolved train, with `queue` and `placed` updated.
pub fn arr_only_pass(
    matrix: &Matrix,
    config: &BuildConfig,
    queue: &mut Vec<usize>,
    placed: &mut Vec<usize>,
    trace: &mut SortTrace,
) -> Option<usize> {
    trace.line("Resolution pass 1: start");
    let baseline = TimeView::new(matrix, config);

    for idx in 0..queue.len() {
        let train = queue[idx];

        let open = count_open_slots(&baseline, train, placed);
        if open > 1 {
            trace.line(format!(
                "Resolution pass 1: skipping {} ({} open positions; won't modify)",
                matrix.train_label(train),
                open
            ));
            continue;
        }

        trace.line(format!(
            "Resolution pass 1: evaluating {} for arr-only fixes",
            matrix.train_label(train)
        ));
        let mut attempted_station = false;

        for station in (0..matrix.num_stations()).rev() {
            if matrix.station_modes[station] != StationRowMode::Two {
                continue;
            }
            if matrix.slot(station, train).arr.is_none() {
                continue;
            }
            attempted_station = true;

            trace.line(format!(
                "Resolution attempt for {} at {} (arr-only station)",
                matrix.train_label(train),
                matrix.station_label(station)
            ));

            let arr_only = TimeView::with_overrides(
                matrix,
                config,
                ViewOverrides {
                    arr_only_station: Some(station),
                    ..ViewOverrides::NONE
                },
            );

            // Option A: insert the candidate itself under the arr-only view.
            let mut attempt = placed.clone();
            trace.line("  Option A: insert service with arr-only at station.");
            if attempt_exact_insert(&arr_only, train, &mut attempt, trace)
                || insert_first_candidate(&arr_only, train, &mut attempt, trace, "Resolution pass 1")
            {
                *placed = attempt;
                queue.remove(idx);
                return Some(train);
            }

            let (last_pos, first_pos) = station_bounds(matrix, config, train, placed, station);

            // Option B: displace the lower-bound neighbour.
            if let Some(pos) = last_pos {
                if try_displace_neighbour(
                    matrix, config, &baseline, &arr_only, train, placed, pos, "lower", trace,
                ) {
                    queue.remove(idx);
                    return Some(train);
                }
            }

            // Option C: displace the upper-bound neighbour.
            if let Some(pos) = first_pos {
                if try_displace_neighbour(
                    matrix, config, &baseline, &arr_only, train, placed, pos, "upper", trace,
                ) {
                    queue.remove(idx);
                    return Some(train);
                }
            }
        }

        if !attempted_station {
            trace.line(format!(
                "Resolution pass 1: no eligible arr-only stations for {}",
                matrix.train_label(train)
            ));
        }
    }

    trace.line("Resolution pass 1: no resolution found");
    None
}

/// Removes the neighbour at `pos`, inserts the candidate normally, then
/// reinserts the neighbour under the arr-only view. Commits on success.
#[allow(clippy::too_many_arguments)]
fn try_displace_neighbour(
    matrix: &Matrix,
    _config: &BuildConfig,
    baseline: &TimeView<'_>,
    arr_only: &TimeView<'_>,
    train: usize,
    placed: &mut Vec<usize>,
    pos: usize,
    which: &str,
    trace: &mut SortTrace,
) -> bool {
    trace.line(format!(
        "  Option {}: remove {}-bound {}, insert service normally, reinsert with arr-only.",
        if which == "lower" { "B" } else { "C" },
        which,
        matrix.train_label(placed[pos])
    ));

    let mut attempt = placed.clone();
    let removed = attempt.remove(pos);

    let inserted = attempt_exact_insert(baseline, train, &mut attempt, trace)
        || insert_first_candidate(baseline, train, &mut attempt, trace, "Resolution pass 1");
    if !inserted {
        return false;
    }
    if !attempt_exact_insert(arr_only, removed, &mut attempt, trace) {
        return false;
    }

    *placed = attempt;
    true
}

/// Pass 2: progressively discard the candidate's values.
///
/// Per station end to start: first drop just the departure there along
/// with every later row, then drop the whole station and every later row,
/// retrying the insert with the weakened constraints each time.
pub fn ignore_value_pass(
    matrix: &Matrix,
    config: &BuildConfig,
    queue: &mut Vec<usize>,
    placed: &mut Vec<usize>,
    trace: &mut SortTrace,
) -> Option<usize> {
    trace.line("Resolution pass 2: start");
    let baseline = TimeView::new(matrix, config);

    for idx in 0..queue.len() {
        let train = queue[idx];

        let open = count_open_slots(&baseline, train, placed);
        if open > 1 {
            trace.line(format!(
                "Resolution pass 2: skipping {} ({} open positions; won't modify)",
                matrix.train_label(train),
                open
            ));
            continue;
        }

        trace.line(format!(
            "Resolution pass 2: evaluating {} for ignore-value fixes",
            matrix.train_label(train)
        ));
        let mut attempted_station = false;

        for station in (0..matrix.num_stations()).rev() {
            let slot = matrix.slot(station, train);
            if slot.stop.is_none() {
                continue;
            }
            attempted_station = true;

            if slot.dep.is_some() {
                trace.line(format!(
                    "Resolution pass 2 for {} at {}: ignore dep time and all rows below.",
                    matrix.train_label(train),
                    matrix.station_label(station)
                ));
                let view = TimeView::with_overrides(
                    matrix,
                    config,
                    ViewOverrides {
                        arr_only_station: Some(station),
                        ignore_from_station: Some(station + 1),
                        ignore_station: None,
                    },
                );
                let mut attempt = placed.clone();
                if attempt_exact_insert(&view, train, &mut attempt, trace)
                    || insert_first_candidate(&view, train, &mut attempt, trace, "Resolution pass 2")
                {
                    *placed = attempt;
                    queue.remove(idx);
                    return Some(train);
                }
            }

            if slot.arr.is_some() {
                trace.line(format!(
                    "Resolution pass 2 for {} at {}: ignore arr+dep time and all rows below.",
                    matrix.train_label(train),
                    matrix.station_label(station)
                ));
                let view = TimeView::with_overrides(
                    matrix,
                    config,
                    ViewOverrides {
                        arr_only_station: None,
                        ignore_from_station: Some(station + 1),
                        ignore_station: Some(station),
                    },
                );
                let mut attempt = placed.clone();
                if attempt_exact_insert(&view, train, &mut attempt, trace)
                    || insert_first_candidate(&view, train, &mut attempt, trace, "Resolution pass 2")
                {
                    *placed = attempt;
                    queue.remove(idx);
                    return Some(train);
                }
            }
        }

        if !attempted_station {
            trace.line(format!(
                "Resolution pass 2: no eligible stations for {}",
                matrix.train_label(train)
            ));
        }
    }

    trace.line("Resolution pass 2: no resolution found");
    None
}

/// Pass 3: accept the first eligible slot under unmodified constraints.
pub fn first_slot_pass(
    matrix: &Matrix,
    config: &BuildConfig,
    queue: &mut Vec<usize>,
    placed: &mut Vec<usize>,
    trace: &mut SortTrace,
) -> Option<usize> {
    trace.line("Resolution pass 3: start");
    let baseline = TimeView::new(matrix, config);

    for idx in 0..queue.len() {
        let train = queue[idx];
        if insert_first_candidate(&baseline, train, placed, trace, "Resolution pass 3") {
            queue.remove(idx);
            return Some(train);
        }
    }

    trace.line("Resolution pass 3: no resolution found");
    None
}
