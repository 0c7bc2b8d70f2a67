//! Direction classification.
//!
//! Once the station order exists, each pattern is assigned to forward or
//! reverse traversal of the corridor by comparing the first and last
//! positions of its corridor-relevant calling points.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::domain::CallPattern;
use crate::sequence::StationOrder;

/// Traversal direction of a pattern along the corridor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Origin-to-destination traversal
    Forward,
    /// Destination-to-origin traversal
    Reverse,
}

/// Classifies one pattern against the station order.
///
/// Positions of every calling (non-pass) stop present in the order are
/// collected; `first <= last` means forward. Fewer than two such stops is
/// a degenerate case: the pattern defaults to forward so it still appears
/// somewhere, and a diagnostic records the defaulting.
pub fn classify_direction(
    pattern: &CallPattern,
    order: &StationOrder,
    diagnostics: &mut Diagnostics,
) -> Direction {
    let positions: Vec<usize> = pattern
        .stops
        .iter()
        .filter(|s| s.is_calling())
        .filter_map(|s| order.position(s.station))
        .collect();

    if positions.len() < 2 {
        diagnostics.push(
            DiagnosticKind::DegenerateDirection,
            format!(
                "run {} has {} corridor-relevant stop(s); defaulting to forward",
                pattern.run_id,
                positions.len()
            ),
        );
        return Direction::Forward;
    }

    let first = positions[0];
    let last = positions[positions.len() - 1];
    if first <= last {
        Direction::Forward
    } else {
        Direction::Reverse
    }
}

/// Splits patterns into forward and reverse groups, preserving input order.
pub fn split_by_direction(
    patterns: Vec<CallPattern>,
    order: &StationOrder,
    diagnostics: &mut Diagnostics,
) -> (Vec<CallPattern>, Vec<CallPattern>) {
    let mut forward = Vec::new();
    let mut reverse = Vec::new();

    for pattern in patterns {
        match classify_direction(&pattern, order, diagnostics) {
            Direction::Forward => forward.push(pattern),
            Direction::Reverse => reverse.push(pattern),
        }
    }

    (forward, reverse)
}
