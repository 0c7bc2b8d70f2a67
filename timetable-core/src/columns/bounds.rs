//! Insertion-bound computation.
//!
//! For a candidate train and a partial column order, every station the
//! candidate has a usable time at constrains where its column may go:
//! after the rightmost placed column with a strictly smaller value, before
//! the leftmost with a strictly greater one. The intersection across
//! stations is the candidate's slot interval; a single-point interval is
//! an exact slot.

use crate::config::{BuildConfig, CancelledTimePolicy};
use crate::domain::RailTime;
use crate::matrix::{DisplayedTime, Matrix, choose_displayed_time};

use super::trace::SortTrace;

/// Constraint-view overrides used by the relaxation passes.
///
/// Each override weakens the candidate's constraints at chosen stations:
/// reading only the arrival half of a two-row station, ignoring one
/// station outright, or ignoring everything from a station onwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewOverrides {
    /// Read only the arrival value at this station
    pub arr_only_station: Option<usize>,
    /// Ignore this station and every later one
    pub ignore_from_station: Option<usize>,
    /// Ignore this one station
    pub ignore_station: Option<usize>,
}

impl ViewOverrides {
    /// No overrides: the baseline constraint view.
    pub const NONE: Self = Self {
        arr_only_station: None,
        ignore_from_station: None,
        ignore_station: None,
    };
}

/// A filtered view of the matrix's time values for ordering purposes.
///
/// Applies the cancelled-time policy, the no-report exclusion, and any
/// relaxation overrides on top of the displayed times.
#[derive(Clone, Copy)]
pub struct TimeView<'a> {
    matrix: &'a Matrix,
    config: &'a BuildConfig,
    overrides: ViewOverrides,
}

impl<'a> TimeView<'a> {
    /// The baseline view with no overrides.
    pub fn new(matrix: &'a Matrix, config: &'a BuildConfig) -> Self {
        Self {
            matrix,
            config,
            overrides: ViewOverrides::NONE,
        }
    }

    /// A view with relaxation overrides applied.
    pub fn with_overrides(
        matrix: &'a Matrix,
        config: &'a BuildConfig,
        overrides: ViewOverrides,
    ) -> Self {
        Self {
            matrix,
            config,
            overrides,
        }
    }

    /// The matrix behind this view.
    pub fn matrix(&self) -> &'a Matrix {
        self.matrix
    }

    fn resolve(&self, train: usize, station: usize) -> Option<DisplayedTime> {
        if self.overrides.ignore_station == Some(station) {
            return None;
        }
        if let Some(from) = self.overrides.ignore_from_station {
            if station >= from {
                return None;
            }
        }

        let stop = self.matrix.slot(station, train).stop.as_ref()?;
        let is_arrival = if self.overrides.arr_only_station == Some(station) {
            true
        } else {
            !stop.has_departure()
        };

        let column = &self.matrix.trains[train];
        let chosen = choose_displayed_time(
            stop,
            is_arrival,
            column.pattern.realtime_activated,
            self.config.realtime_enabled,
        );
        if !chosen.is_present() {
            return None;
        }

        let allow_cancelled = self.config.cancelled_times == CancelledTimePolicy::Always
            || column.all_cancelled;
        if chosen.format.cancelled && !allow_cancelled {
            return None;
        }

        Some(chosen)
    }

    /// The ordering value for one train at one station, if any.
    ///
    /// No-report values are excluded unless the whole train is no-report
    /// end to end (then they are all it has).
    pub fn time(&self, train: usize, station: usize) -> Option<RailTime> {
        let chosen = self.resolve(train, station)?;
        if chosen.format.no_report && !self.matrix.trains[train].all_no_report {
            return None;
        }
        chosen.time
    }

    /// Display text for the trace, empty when nothing usable.
    pub fn label(&self, train: usize, station: usize) -> String {
        self.resolve(train, station)
            .map(|c| c.text)
            .unwrap_or_default()
    }
}

/// The intersected slot interval for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertBounds {
    /// Whether any station constrained the candidate at all
    pub has_constraint: bool,
    /// Leftmost admissible position
    pub lower: usize,
    /// Rightmost admissible position (may cross below `lower` when the
    /// stations disagree)
    pub upper: usize,
}

impl InsertBounds {
    /// True when the interval pins a single position.
    pub fn is_exact(&self) -> bool {
        self.has_constraint && self.lower == self.upper
    }

    /// Number of open positions for a queue of the given length.
    pub fn open_slots(&self, placed_len: usize) -> usize {
        let start = if self.has_constraint { self.lower } else { 0 };
        let end = if self.has_constraint {
            self.upper
        } else {
            placed_len
        };
        if start > end { 0 } else { end - start + 1 }
    }
}

/// Computes per-station bounds for a candidate and intersects them.
///
/// When one station's own bounds cross (its placed values interleave
/// around the candidate), the upper bound recovers to the first greater
/// value right of the lower bound before joining the intersection.
pub fn find_insert_bounds(
    view: &TimeView<'_>,
    train: usize,
    placed: &[usize],
    mut trace: Option<&mut SortTrace>,
) -> InsertBounds {
    let matrix = view.matrix();
    let mut lower = 0usize;
    let mut upper = placed.len();
    let mut has_constraint = false;

    if let Some(trace) = trace.as_deref_mut() {
        trace.blank();
        trace.line(format!("Service: {}", matrix.train_label(train)));
        trace.line(format!("Sorted count: {}", placed.len()));
    }

    for station in 0..matrix.num_stations() {
        let Some(time) = view.time(train, station) else {
            continue;
        };

        let mut last_le: Option<usize> = None;
        let mut first_ge: Option<usize> = None;
        let mut greater_positions: Vec<usize> = Vec::new();

        for (pos, &other) in placed.iter().enumerate() {
            let Some(other_time) = view.time(other, station) else {
                continue;
            };
            if other_time < time {
                last_le = Some(pos);
            }
            if other_time > time {
                greater_positions.push(pos);
                if first_ge.is_none() {
                    first_ge = Some(pos);
                }
            }
        }

        let station_lower = last_le.map_or(0, |p| p + 1);
        let mut station_upper = first_ge.unwrap_or(placed.len());

        if station_lower > station_upper {
            // This station's placed values interleave around the
            // candidate; recover by jumping to the first greater value
            // right of the lower bound.
            let next_greater = greater_positions
                .iter()
                .copied()
                .find(|&p| Some(p) > last_le);
            first_ge = next_greater;
            station_upper = next_greater.unwrap_or(placed.len());
        }

        if last_le.is_some() || first_ge.is_some() {
            has_constraint = true;
            lower = lower.max(station_lower);
            upper = upper.min(station_upper);
        }

        if let Some(trace) = trace.as_deref_mut() {
            let left = last_le
                .map(|p| view.label(placed[p], station))
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| "start".to_string());
            let right = first_ge
                .map(|p| view.label(placed[p], station))
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| "end".to_string());
            trace.line(format!(
                "  {}: {} < {} < {}, bounds {}-{}",
                matrix.station_label(station),
                left,
                time,
                right,
                station_lower,
                station_upper,
            ));
        }
    }

    let bounds = InsertBounds {
        has_constraint,
        lower,
        upper,
    };

    if let Some(trace) = trace {
        let conclusion = if bounds.is_exact() {
            format!("strict position {}", bounds.lower)
        } else if has_constraint {
            "no strict bounds".to_string()
        } else {
            "no constraints".to_string()
        };
        trace.line(format!(
            "Combined bounds: {}-{} ({} open). Conclusion: {}.",
            bounds.lower,
            bounds.upper,
            bounds.open_slots(placed.len()),
            conclusion
        ));
    }

    bounds
}

/// Number of open positions under the unmodified baseline view.
pub fn count_open_slots(view: &TimeView<'_>, train: usize, placed: &[usize]) -> usize {
    find_insert_bounds(view, train, placed, None).open_slots(placed.len())
}

/// Bounds at a single station, reading only arrivals there.
///
/// Used by the arr-only relaxation to identify the blocking neighbours.
pub fn station_bounds(
    matrix: &Matrix,
    config: &BuildConfig,
    train: usize,
    placed: &[usize],
    station: usize,
) -> (Option<usize>, Option<usize>) {
    let view = TimeView::with_overrides(
        matrix,
        config,
        ViewOverrides {
            arr_only_station: Some(station),
            ..ViewOverrides::NONE
        },
    );
    let Some(time) = view.time(train, station) else {
        return (None, None);
    };

    let mut last_pos = None;
    let mut first_pos = None;
    for (pos, &other) in placed.iter().enumerate() {
        let Some(other_time) = view.time(other, station) else {
            continue;
        };
        if other_time < time {
            last_pos = Some(pos);
        }
        if first_pos.is_none() && other_time > time {
            first_pos = Some(pos);
        }
    }
    (last_pos, first_pos)
}

/// Inserts the candidate when its bounds pin an exact slot.
pub fn attempt_exact_insert(
    view: &TimeView<'_>,
    train: usize,
    placed: &mut Vec<usize>,
    trace: &mut SortTrace,
) -> bool {
    let bounds = find_insert_bounds(view, train, placed, Some(trace));
    if bounds.is_exact() {
        placed.insert(bounds.lower, train);
        trace.line(format!(
            "Chosen position: {} (bounds {}-{})",
            bounds.lower, bounds.lower, bounds.upper
        ));
        return true;
    }
    false
}

/// Accepts the first position inside the candidate's interval, provided
/// the interval is genuinely open (more than a pinned point).
pub fn insert_first_candidate(
    view: &TimeView<'_>,
    train: usize,
    placed: &mut Vec<usize>,
    trace: &mut SortTrace,
    pass_label: &str,
) -> bool {
    let bounds = find_insert_bounds(view, train, placed, None);
    let start = if bounds.has_constraint { bounds.lower } else { 0 };
    let end = if bounds.has_constraint {
        bounds.upper
    } else {
        placed.len()
    };
    if end > start {
        placed.insert(start, train);
        trace.line(format!(
            "{}: selected first position {} (bounds {}-{}) for {}",
            pass_label,
            start,
            start,
            end,
            view.matrix().train_label(train)
        ));
        return true;
    }
    false
}
