//! Column sequencing.
//!
//! Orders the matrix's train columns so that times increase consistently
//! down every row. Insertion is bounded: a train is placed only where
//! every station's constraints pin a single slot; trains that cannot be
//! pinned rotate to the back of the queue, and a stalled rotation
//! escalates through relaxation passes. Whatever still cannot be placed
//! is segregated into an unsorted tail, and the annotation phase flags
//! every cell the final order could not reconcile.

mod bounds;
mod highlight;
mod relax;
mod rows;
mod trace;


pub use bounds::{InsertBounds, TimeView, ViewOverrides, find_insert_bounds};
pub use rows::{MonotonicViolation, find_monotonic_violation};

use itertools::Itertools;
use tracing::debug;

use crate::config::BuildConfig;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::domain::RailTime;
use crate::matrix::Matrix;

use bounds::attempt_exact_insert;
use highlight::{
    annotate_departs_before_arrival, annotate_internal_misorder, annotate_out_of_order,
    resort_for_highlights,
};
use relax::{arr_only_pass, first_slot_pass, ignore_value_pass};
use rows::resequence_rows;
use trace::SortTrace;

/// The final column order: placed columns plus an unsorted tail.
///
/// Terminal once returned; `placed` followed by `unsorted` is a
/// permutation of the original train indices. Renderers show a separator
/// before the tail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnOrder {
    /// Columns in display order
    pub placed: Vec<usize>,
    /// Columns no pass could place, in queue order
    pub unsorted: Vec<usize>,
}

impl ColumnOrder {
    /// True when every column was placed.
    pub fn is_fully_sorted(&self) -> bool {
        self.unsorted.is_empty()
    }

    /// Placed columns followed by the unsorted tail.
    pub fn display_order(&self) -> Vec<usize> {
        self.placed
            .iter()
            .chain(self.unsorted.iter())
            .copied()
            .collect()
    }

    /// Total number of columns.
    pub fn len(&self) -> usize {
        self.placed.len() + self.unsorted.len()
    }

    /// True when there are no columns at all.
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty() && self.unsorted.is_empty()
    }
}

/// Sorts the matrix's columns and annotates irreconcilable cells.
///
/// The matrix is mutated only by the annotation phase (highlights) and
/// the guarded row resequencing; everything else reads it. Returns the
/// column order and the textual trace log.
pub fn sort_columns(
    matrix: &mut Matrix,
    config: &BuildConfig,
    diagnostics: &mut Diagnostics,
) -> (ColumnOrder, String) {
    let mut trace = SortTrace::new();
    trace.line("Column sort log");
    trace.line(format!(
        "Stations: {}",
        matrix.stations.iter().map(|s| s.name.as_str()).join(" → ")
    ));
    trace.line(format!("Services: {}", matrix.num_trains()));

    let (placed, unsorted) = place_columns(matrix, config, &mut trace);

    trace.blank();
    trace.line(format!(
        "Final order: {}",
        if placed.is_empty() {
            "(none)".to_string()
        } else {
            placed.iter().map(|&t| matrix.train_label(t)).join(", ")
        }
    ));

    // Give every train a chronological reading down its own column where
    // a consistent row order exists.
    resequence_rows(matrix, &placed);
    if let Some(violation) = rows::find_monotonic_violation(matrix, &placed) {
        diagnostics.push(
            DiagnosticKind::CellOrderViolation,
            format!(
                "run {} cannot show calling points in order ({} {} then {} {})",
                violation.train,
                violation.prev_row,
                violation.prev_text,
                violation.row,
                violation.text
            ),
        );
    }

    let misordered = annotate_internal_misorder(matrix, &placed, &mut trace);

    let mut placed = placed;
    resort_for_highlights(matrix, config, &mut placed, &mut trace);

    let out_of_order = annotate_out_of_order(matrix, &placed, &mut trace);
    let dep_before_arr = annotate_departs_before_arrival(matrix, &placed, &mut trace);

    if misordered > 0 {
        diagnostics.push(
            DiagnosticKind::CellOrderViolation,
            format!("{misordered} cell(s) regress within their own column"),
        );
    }
    if out_of_order > 0 {
        diagnostics.push(
            DiagnosticKind::CellOrderViolation,
            format!("{out_of_order} cell(s) out of order across columns"),
        );
    }
    if dep_before_arr > 0 {
        diagnostics.push(
            DiagnosticKind::CellOrderViolation,
            format!("{dep_before_arr} departure(s) earlier than a preceding arrival"),
        );
    }

    if !unsorted.is_empty() {
        let identities = unsorted
            .iter()
            .map(|&t| matrix.train_label(t))
            .join(", ");
        trace.line(format!(
            "Unable to determine strict bounds for remaining services: {identities}"
        ));
        diagnostics.push(
            DiagnosticKind::ColumnOrderUnresolved,
            format!("unable to place: {identities}"),
        );
    }

    debug!(
        placed = placed.len(),
        unsorted = unsorted.len(),
        "column sort finished"
    );

    (ColumnOrder { placed, unsorted }, trace.into_log())
}

/// The queue/rotation driver: pre-sort, seed, exact-slot insertion, pass
/// escalation, unsorted tail.
fn place_columns(
    matrix: &Matrix,
    config: &BuildConfig,
    trace: &mut SortTrace,
) -> (Vec<usize>, Vec<usize>) {
    let view = TimeView::new(matrix, config);
    let num_trains = matrix.num_trains();

    // Pre-sort by (earliest row with a defined time, that row's value),
    // original index as the tie-break.
    let mut queue: Vec<usize> = (0..num_trains).collect();
    queue.sort_by_key(|&train| {
        let (row, time) = first_time_info(&view, matrix, train);
        (
            row.unwrap_or(usize::MAX),
            time.map_or(u32::MAX, |t| t.minutes()),
            train,
        )
    });

    if !queue.is_empty() {
        trace.blank();
        trace.line("Initial queue order (after pre-sort):");
        for (position, &train) in queue.iter().enumerate() {
            let (row, time) = first_time_info(&view, matrix, train);
            trace.line(format!(
                "{}. {}: first row {}, first time {}",
                position + 1,
                matrix.train_identity(train),
                row.map_or("none".to_string(), |r| r.to_string()),
                time.map_or("none".to_string(), |t| t.to_string()),
            ));
        }
    }

    let mut placed: Vec<usize> = Vec::with_capacity(num_trains);
    let mut unsorted: Vec<usize> = Vec::new();

    if !queue.is_empty() {
        let seed = queue.remove(0);
        placed.push(seed);
        trace.blank();
        trace.line(format!("Seed service: {}", matrix.train_label(seed)));
    }

    let mut rotations_without_insert = 0;
    while !queue.is_empty() {
        if rotations_without_insert >= queue.len() {
            trace.line(format!(
                "Queue cycled with no inserts; contents: {}",
                queue.iter().map(|&t| matrix.train_label(t)).join(", ")
            ));

            let resolved = arr_only_pass(matrix, config, &mut queue, &mut placed, trace)
                .or_else(|| ignore_value_pass(matrix, config, &mut queue, &mut placed, trace))
                .or_else(|| first_slot_pass(matrix, config, &mut queue, &mut placed, trace));

            if resolved.is_some() {
                rotations_without_insert = 0;
                continue;
            }

            unsorted = std::mem::take(&mut queue);
            break;
        }

        let train = queue.remove(0);
        if attempt_exact_insert(&view, train, &mut placed, trace) {
            rotations_without_insert = 0;
        } else {
            trace.line(format!(
                "Moved to end of queue: {}",
                matrix.train_label(train)
            ));
            queue.push(train);
            rotations_without_insert += 1;
        }
    }

    (placed, unsorted)
}

/// The earliest row holding a usable time for a train, and that value.
fn first_time_info(
    view: &TimeView<'_>,
    matrix: &Matrix,
    train: usize,
) -> (Option<usize>, Option<RailTime>) {
    for (r, row) in matrix.rows.iter().enumerate() {
        let Some(station) = row.kind.station() else {
            continue;
        };
        if let Some(time) = view.time(train, station) {
            return (Some(r), Some(time));
        }
    }
    (None, None)
}
