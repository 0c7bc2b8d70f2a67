//! Cell annotation for ordering violations.
//!
//! The only phase permitted to mutate built cells. Three scans over the
//! final column order flag what the sequencer could not reconcile:
//! per-row running-minimum regressions, departures earlier than a
//! preceding arrival at two-row stations, and per-train chronological
//! regressions. A resort sweep between the per-train scan and the final
//! row scans retries exact reinsertion for any train that triggered a
//! flag, in case removing it unlocks a now-exact slot.

use crate::config::BuildConfig;
use crate::domain::{RailTime, RolloverTracker};
use crate::matrix::{Highlight, Matrix};

use super::bounds::{TimeView, attempt_exact_insert, insert_first_candidate};
use super::trace::SortTrace;

/// Flags cells that regress against their own train's earlier rows.
///
/// Day rollover is forgiven only for backward jumps beyond the rollover
/// threshold; anything nearer is a genuine misorder. Returns the number
/// of cells flagged.
pub fn annotate_internal_misorder(
    matrix: &mut Matrix,
    placed: &[usize],
    trace: &mut SortTrace,
) -> usize {
    let mut flagged = 0;

    for &train in placed {
        let mut tracker = RolloverTracker::new();
        let mut max_abs: Option<u32> = None;

        for r in 0..matrix.rows.len() {
            let Some(cell) = matrix.rows[r].cells[train].as_ref() else {
                continue;
            };
            if cell.format.cancelled || cell.format.no_report {
                continue;
            }
            let Some(time) = cell.minutes else {
                continue;
            };

            let abs = tracker.absolute(time);
            if max_abs.is_some_and(|max| abs < max) {
                let label = matrix.rows[r].label();
                trace.line(format!(
                    "Highlight {}: {} ({}) regresses within its own column",
                    label,
                    time,
                    matrix.train_identity(train)
                ));
                if let Some(cell) = matrix.rows[r].cells[train].as_mut() {
                    cell.format.highlight = Some(Highlight::InternallyMisordered);
                }
                flagged += 1;
            }
            if max_abs.is_none_or(|max| abs > max) {
                max_abs = Some(abs);
            }
        }
    }

    flagged
}

/// One sweep of remove-and-reinsert for trains that trigger a highlight.
///
/// Scans the current order for out-of-order and departs-before-arrival
/// conditions, then retries each triggering train: removed from the
/// order, reinserted on exact bounds (or the first eligible slot). Returns
/// true when any column moved.
pub fn resort_for_highlights(
    matrix: &Matrix,
    config: &BuildConfig,
    placed: &mut Vec<usize>,
    trace: &mut SortTrace,
) -> bool {
    trace.line("Highlight resort pass: start");
    let triggers = collect_triggers(matrix, placed, trace);

    let view = TimeView::new(matrix, config);
    let mut moved = false;

    for train in triggers {
        let mut attempt: Vec<usize> = placed.iter().copied().filter(|&t| t != train).collect();
        if attempt.len() == placed.len() {
            continue;
        }
        if attempt_exact_insert(&view, train, &mut attempt, trace) {
            *placed = attempt;
            moved = true;
            continue;
        }
        if insert_first_candidate(&view, train, &mut attempt, trace, "Highlight resort") {
            *placed = attempt;
            moved = true;
        }
    }

    if !moved {
        trace.line("Highlight resort pass: no moves");
    }
    moved
}

/// Collects trains triggering either row-scan condition, without
/// mutating anything.
fn collect_triggers(matrix: &Matrix, placed: &[usize], trace: &mut SortTrace) -> Vec<usize> {
    let mut triggers = Vec::new();

    // Per-row running minimum, right to left.
    for (r, row) in matrix.rows.iter().enumerate() {
        let mut min_time: Option<RailTime> = None;
        for &train in placed.iter().rev() {
            let Some(cell) = row.cells[train].as_ref() else {
                continue;
            };
            if cell.format.cancelled {
                continue;
            }
            let Some(time) = cell.minutes else {
                continue;
            };
            if min_time.is_none_or(|min| time <= min) {
                min_time = Some(time);
                continue;
            }
            trace.line(format!(
                "Highlight resort trigger: row {} {} service {} time {} (min {})",
                r + 1,
                row.label(),
                matrix.train_label(train),
                time,
                min_time.expect("checked above"),
            ));
            triggers.push(train);
        }
    }

    // Departures behind the running maximum arrival at two-row stations.
    for (arr_row, dep_row) in matrix.two_row_pairs() {
        let mut max_arr: Option<RailTime> = None;
        for &train in placed {
            if let Some(arr_cell) = matrix.rows[arr_row].cells[train].as_ref() {
                if arr_cell.format.cancelled {
                    continue;
                }
                if let Some(arr) = arr_cell.minutes {
                    if max_arr.is_none_or(|max| arr > max) {
                        max_arr = Some(arr);
                    }
                }
            }

            let Some(dep_cell) = matrix.rows[dep_row].cells[train].as_ref() else {
                continue;
            };
            if dep_cell.format.cancelled {
                continue;
            }
            let (Some(dep), Some(max)) = (dep_cell.minutes, max_arr) else {
                continue;
            };
            if dep < max {
                trace.line(format!(
                    "Highlight resort trigger: station {} service {} dep {} before max arr {}",
                    matrix.rows[dep_row].label(),
                    matrix.train_label(train),
                    dep,
                    max,
                ));
                triggers.push(train);
            }
        }
    }

    triggers
}

/// Flags cells whose value exceeds the running minimum to their right.
///
/// Returns the number of cells flagged.
pub fn annotate_out_of_order(
    matrix: &mut Matrix,
    placed: &[usize],
    trace: &mut SortTrace,
) -> usize {
    let mut flagged = 0;

    for r in 0..matrix.rows.len() {
        let mut min_time: Option<RailTime> = None;
        for &train in placed.iter().rev() {
            let Some(cell) = matrix.rows[r].cells[train].as_ref() else {
                continue;
            };
            if cell.format.cancelled {
                continue;
            }
            let Some(time) = cell.minutes else {
                continue;
            };
            if min_time.is_none_or(|min| time <= min) {
                min_time = Some(time);
                continue;
            }

            let label = matrix.rows[r].label();
            trace.line(format!(
                "Highlight {}: {} ({}) > {} to the right",
                label,
                time,
                matrix.train_identity(train),
                min_time.expect("checked above"),
            ));
            if let Some(cell) = matrix.rows[r].cells[train].as_mut() {
                cell.format.highlight = Some(Highlight::OutOfOrder);
            }
            flagged += 1;
        }
    }

    flagged
}

/// Flags departures earlier than the maximum arrival to their left at
/// two-row stations. Returns the number of cells flagged.
pub fn annotate_departs_before_arrival(
    matrix: &mut Matrix,
    placed: &[usize],
    trace: &mut SortTrace,
) -> usize {
    let mut flagged = 0;

    for (arr_row, dep_row) in matrix.two_row_pairs() {
        let mut max_arr: Option<RailTime> = None;
        for &train in placed {
            if let Some(arr_cell) = matrix.rows[arr_row].cells[train].as_ref() {
                if arr_cell.format.cancelled {
                    continue;
                }
                if let Some(arr) = arr_cell.minutes {
                    if max_arr.is_none_or(|max| arr > max) {
                        max_arr = Some(arr);
                    }
                }
            }

            let Some(dep_cell) = matrix.rows[dep_row].cells[train].as_ref() else {
                continue;
            };
            if dep_cell.format.cancelled {
                continue;
            }
            let (Some(dep), Some(max)) = (dep_cell.minutes, max_arr) else {
                continue;
            };
            if dep < max {
                let label = matrix.rows[dep_row].label();
                trace.line(format!(
                    "Highlight {}: dep {} ({}) before max arr {}",
                    label,
                    dep,
                    matrix.train_identity(train),
                    max,
                ));
                if let Some(cell) = matrix.rows[dep_row].cells[train].as_mut() {
                    cell.format.highlight = Some(Highlight::DepartsBeforeArrival);
                }
                flagged += 1;
            }
        }
    }

    flagged
}
