//! The full assembly pipeline for one corridor query.
//!
//! Normalizer → station sequencer → direction classifier → per-direction
//! matrix builder → column sequencer. Everything runs synchronously and
//! deterministically; every structure is created fresh for the query and
//! nothing is retained afterwards.

use tracing::debug;

use crate::config::BuildConfig;
use crate::corridor::CorridorSpec;
use crate::diagnostics::Diagnostics;
use crate::direction::split_by_direction;
use crate::domain::{CallPattern, Station};
use crate::matrix::build_matrix;
use crate::normalize::normalize_patterns;
use crate::output::{TimetableModel, train_meta};
use crate::sequence::build_station_order;

/// Both directions of an assembled corridor timetable.
#[derive(Debug, Clone)]
pub struct CorridorTimetable {
    /// Origin-to-destination reading
    pub forward: TimetableModel,
    /// Destination-to-origin reading
    pub reverse: TimetableModel,
    /// Conditions recorded by the shared stages (normalizing, station
    /// sequencing, direction classification); per-direction conditions
    /// live on the models
    pub diagnostics: Diagnostics,
}

/// Assembles the timetable for one corridor query.
pub fn assemble_timetable(
    corridor: &CorridorSpec,
    patterns: Vec<CallPattern>,
    config: &BuildConfig,
) -> CorridorTimetable {
    let mut diagnostics = Diagnostics::new();

    let normalized = normalize_patterns(patterns, corridor);
    debug!(patterns = normalized.len(), "patterns normalized");

    let order = build_station_order(corridor, &normalized, &mut diagnostics);
    let (forward, reverse) = split_by_direction(normalized, &order, &mut diagnostics);

    let forward_model = build_direction_model(order.stations(), forward, config);

    let reversed: Vec<Station> = order.stations().iter().rev().cloned().collect();
    let reverse_model = build_direction_model(&reversed, reverse, config);

    CorridorTimetable {
        forward: forward_model,
        reverse: reverse_model,
        diagnostics,
    }
}

/// Builds and sorts one direction's model.
fn build_direction_model(
    stations: &[Station],
    patterns: Vec<CallPattern>,
    config: &BuildConfig,
) -> TimetableModel {
    let mut diagnostics = Diagnostics::new();

    let mut matrix = build_matrix(stations, patterns, config);
    let (column_order, diagnostic_log) =
        crate::columns::sort_columns(&mut matrix, config, &mut diagnostics);

    let metas = matrix
        .trains
        .iter()
        .map(|column| train_meta(&column.pattern))
        .collect();
    let unsorted_train_ids = column_order
        .unsorted
        .iter()
        .map(|&t| matrix.trains[t].pattern.run_id.as_str().to_string())
        .collect();

    TimetableModel {
        rows: matrix.rows,
        column_order,
        train_meta: metas,
        diagnostic_log,
        unsorted_train_ids,
        diagnostics,
    }
}
