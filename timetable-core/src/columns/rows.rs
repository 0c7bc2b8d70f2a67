//! Post-sort row resequencing.
//!
//! After the columns are ordered, every train's own rows should read
//! chronologically top to bottom. When they don't, a topological re-order
//! of the station rows (edges from each train's chronological sequence,
//! original row order as tie-break) sometimes fixes it without breaking
//! anyone else. The re-order is applied only if it removes, and does not
//! introduce, per-train monotonicity violations.

use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::domain::RolloverTracker;
use crate::matrix::Matrix;

/// A per-train chronological regression found in the row order.
#[derive(Debug, Clone)]
pub struct MonotonicViolation {
    /// Train identity
    pub train: String,
    /// Label of the earlier row
    pub prev_row: String,
    /// Text of the earlier cell
    pub prev_text: String,
    /// Label of the regressing row
    pub row: String,
    /// Text of the regressing cell
    pub text: String,
}

/// Finds the first train whose rows do not read chronologically.
///
/// Cancelled and no-report cells are exempt; backward jumps beyond the
/// rollover threshold are forgiven as overnight crossings.
pub fn find_monotonic_violation(
    matrix: &Matrix,
    placed: &[usize],
) -> Option<MonotonicViolation> {
    for &train in placed {
        let mut tracker = RolloverTracker::new();
        let mut prev_abs: Option<u32> = None;
        let mut prev_text = String::new();
        let mut prev_row = String::new();

        for row in &matrix.rows {
            let Some(cell) = row.cells[train].as_ref() else {
                continue;
            };
            if cell.format.cancelled || cell.format.no_report {
                continue;
            }
            let Some(time) = cell.minutes else {
                continue;
            };

            let abs = tracker.absolute(time);
            if let Some(prev) = prev_abs {
                if abs < prev {
                    return Some(MonotonicViolation {
                        train: matrix.train_identity(train).to_string(),
                        prev_row,
                        prev_text,
                        row: row.label(),
                        text: cell.text.clone(),
                    });
                }
            }

            prev_abs = Some(abs);
            prev_text = cell.text.clone();
            prev_row = row.label();
        }
    }

    None
}

/// Builds a station-row order consistent with every train's chronology.
///
/// Returns `None` when the constraints cycle or the current order is
/// already consistent.
pub fn build_monotonic_row_order(matrix: &Matrix, placed: &[usize]) -> Option<Vec<usize>> {
    let station_rows: Vec<usize> = matrix
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.kind.station().is_some())
        .map(|(i, _)| i)
        .collect();
    if station_rows.len() < 2 {
        return None;
    }

    let original_position: HashMap<usize, usize> = station_rows
        .iter()
        .enumerate()
        .map(|(pos, &row)| (row, pos))
        .collect();

    let mut edges: HashMap<usize, HashSet<usize>> = HashMap::new();
    let mut indegree: HashMap<usize, usize> = HashMap::new();
    for &row in &station_rows {
        edges.insert(row, HashSet::new());
        indegree.insert(row, 0);
    }

    for &train in placed {
        let mut tracker = RolloverTracker::new();
        let mut entries: Vec<(usize, u32)> = Vec::new();

        for &row_idx in &station_rows {
            let Some(cell) = matrix.rows[row_idx].cells[train].as_ref() else {
                continue;
            };
            if cell.format.cancelled || cell.format.no_report {
                continue;
            }
            let Some(time) = cell.minutes else {
                continue;
            };
            entries.push((row_idx, tracker.absolute(time)));
        }

        if entries.len() < 2 {
            continue;
        }
        let mut chronological: Vec<(usize, (usize, u32))> =
            entries.into_iter().enumerate().collect();
        chronological.sort_by_key(|&(order, (_, abs))| (abs, order));

        for pair in chronological.windows(2) {
            let from = pair[0].1.0;
            let to = pair[1].1.0;
            if from == to {
                continue;
            }
            let outgoing = edges.entry(from).or_default();
            if outgoing.insert(to) {
                *indegree.entry(to).or_default() += 1;
            }
        }
    }

    // Kahn's algorithm, preferring the original row position on ties so
    // the result is as close to the existing layout as possible.
    let mut ready: BinaryHeap<std::cmp::Reverse<(usize, usize)>> = station_rows
        .iter()
        .filter(|&&row| indegree[&row] == 0)
        .map(|&row| std::cmp::Reverse((original_position[&row], row)))
        .collect();

    let mut sorted = Vec::with_capacity(station_rows.len());
    while let Some(std::cmp::Reverse((_, row))) = ready.pop() {
        sorted.push(row);
        if let Some(targets) = edges.get(&row) {
            for &next in targets {
                let count = indegree.get_mut(&next).expect("known row");
                *count -= 1;
                if *count == 0 {
                    ready.push(std::cmp::Reverse((original_position[&next], next)));
                }
            }
        }
    }

    if sorted.len() != station_rows.len() {
        return None;
    }
    if sorted == station_rows {
        return None;
    }
    Some(sorted)
}

/// Rebuilds the row list with station rows in the given order; endpoint
/// rows keep their slots.
pub fn apply_row_order(matrix: &mut Matrix, order: &[usize]) {
    let mut station_counter = 0;
    let reordered: Vec<crate::matrix::Row> = matrix
        .rows
        .iter()
        .map(|row| {
            if row.kind.station().is_some() {
                let target = order[station_counter];
                station_counter += 1;
                matrix.rows[target].clone()
            } else {
                row.clone()
            }
        })
        .collect();
    matrix.rows = reordered;
}

/// Attempts the topological resequencing; keeps it only when it leaves no
/// per-train violations behind.
pub fn resequence_rows(matrix: &mut Matrix, placed: &[usize]) -> bool {
    let Some(order) = build_monotonic_row_order(matrix, placed) else {
        return false;
    };

    let original = matrix.rows.clone();
    apply_row_order(matrix, &order);
    if find_monotonic_violation(matrix, placed).is_some() {
        matrix.rows = original;
        return false;
    }
    true
}
