//! The assembled timetable matrix.
//!
//! Rows are stations (one or two rows each, by dwell) plus optional
//! endpoint-link rows; columns are trains. The matrix is built once per
//! direction and then handed to the column sequencer, which reorders
//! columns and annotates cells but never restructures the grid.

mod builder;
mod cell;

pub use builder::build_matrix;
pub use cell::{
    Cell, CellFormat, DisplayedTime, Highlight, PlatformNote, choose_displayed_time, delay_color,
};

use crate::domain::{CallPattern, RailTime, Station, Stop};

/// Row presentation mode for one station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationRowMode {
    /// Separate arrival and departure rows (a long dwell exists)
    Two,
    /// One row, departure preferred (arrivals and departures exist but all
    /// dwells are short)
    Merged,
    /// One row (only arrivals or only departures ever exist)
    Single,
}

/// What a single row displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Arrival row of a two-row station
    Arrival { station: usize },
    /// Departure row of a two-row station
    Departure { station: usize },
    /// Merged single row (departure preferred)
    Merged { station: usize },
    /// Single row (only one movement exists at this station)
    Single { station: usize },
    /// Leading row linking trains to their off-corridor origin
    ComesFrom,
    /// Trailing row linking trains to their off-corridor destination
    ContinuesTo,
}

impl RowKind {
    /// The displayed-station index, for station rows.
    pub fn station(&self) -> Option<usize> {
        match *self {
            RowKind::Arrival { station }
            | RowKind::Departure { station }
            | RowKind::Merged { station }
            | RowKind::Single { station } => Some(station),
            RowKind::ComesFrom | RowKind::ContinuesTo => None,
        }
    }

    /// True for the arrival half of a two-row station.
    pub fn is_arrival_row(&self) -> bool {
        matches!(self, RowKind::Arrival { .. })
    }

    /// True for the departure half of a two-row station.
    pub fn is_departure_row(&self) -> bool {
        matches!(self, RowKind::Departure { .. })
    }
}

/// One row of the matrix.
#[derive(Debug, Clone)]
pub struct Row {
    /// What the row displays
    pub kind: RowKind,
    /// Station name, set on the first row of each station group
    pub station_label: String,
    /// "arr"/"dep" on two-row stations, empty otherwise
    pub arr_dep_label: &'static str,
    /// One cell per train, in original train order
    pub cells: Vec<Option<Cell>>,
}

impl Row {
    /// Human-readable label for traces and exports.
    pub fn label(&self) -> String {
        match (self.station_label.is_empty(), self.arr_dep_label.is_empty()) {
            (false, false) => format!("{} ({})", self.station_label, self.arr_dep_label),
            (false, true) => self.station_label.clone(),
            (true, false) => format!("({})", self.arr_dep_label),
            (true, true) => String::new(),
        }
    }
}

/// Schedule-first times for one train at one displayed station.
#[derive(Debug, Clone, Default)]
pub struct Slot {
    /// The source stop record, when the train visits this station
    pub stop: Option<Stop>,
    /// Schedule-first arrival
    pub arr: Option<RailTime>,
    /// Schedule-first departure
    pub dep: Option<RailTime>,
}

/// One train column with its pattern and summary flags.
#[derive(Debug, Clone)]
pub struct TrainColumn {
    /// The pattern behind the column
    pub pattern: CallPattern,
    /// Every displayable time is struck (cancelled end to end)
    pub all_cancelled: bool,
    /// Every displayable time is a no-report
    pub all_no_report: bool,
}

/// The assembled matrix for one direction.
#[derive(Debug, Clone)]
pub struct Matrix {
    /// Displayed stations, in row order
    pub stations: Vec<Station>,
    /// Row mode per displayed station
    pub station_modes: Vec<StationRowMode>,
    /// All rows, endpoint links included
    pub rows: Vec<Row>,
    /// Schedule-first time grid, `[station][train]`
    pub slots: Vec<Vec<Slot>>,
    /// Train columns in original order
    pub trains: Vec<TrainColumn>,
}

impl Matrix {
    /// Number of train columns.
    pub fn num_trains(&self) -> usize {
        self.trains.len()
    }

    /// Number of displayed stations.
    pub fn num_stations(&self) -> usize {
        self.stations.len()
    }

    /// The slot for one train at one displayed station.
    pub fn slot(&self, station: usize, train: usize) -> &Slot {
        &self.slots[station][train]
    }

    /// Display label for a station.
    pub fn station_label(&self, station: usize) -> &str {
        &self.stations[station].name
    }

    /// Trace label for a train.
    pub fn train_label(&self, train: usize) -> String {
        self.trains[train].pattern.label()
    }

    /// Short identity for a train.
    pub fn train_identity(&self, train: usize) -> &str {
        &self.trains[train].pattern.identity
    }

    /// Row indices belonging to one station, in row order.
    pub fn station_rows(&self, station: usize) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.kind.station() == Some(station))
            .map(|(i, _)| i)
            .collect()
    }

    /// `(arrival row, departure row)` pairs for two-row stations.
    pub fn two_row_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for station in 0..self.num_stations() {
            let mut arr = None;
            let mut dep = None;
            for (i, row) in self.rows.iter().enumerate() {
                if row.kind.station() != Some(station) {
                    continue;
                }
                if row.kind.is_arrival_row() {
                    arr = Some(i);
                }
                if row.kind.is_departure_row() {
                    dep = Some(i);
                }
            }
            if let (Some(a), Some(d)) = (arr, dep) {
                pairs.push((a, d));
            }
        }
        pairs
    }
}
