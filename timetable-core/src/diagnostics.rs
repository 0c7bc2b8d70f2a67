//! Soft-failure reporting.
//!
//! Nothing in the assembly pipeline is fatal: a pattern that disagrees with
//! the merged station order, a train that cannot be placed, a cell that
//! cannot be shown in order — each is recorded here and the pipeline keeps
//! its best-effort result. Callers branch on the `fatal` tag rather than
//! catching anything; this core never sets it.

use std::fmt;

use tracing::warn;

/// Classification of a non-fatal condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A pattern disagrees with the merged station order; the best-effort
    /// order is kept
    StationOrderConflict,
    /// A train could not be placed even after relaxation; it is segregated
    /// into the unsorted tail
    ColumnOrderUnresolved,
    /// A cell is out of order, departs before an arrival, or regresses
    /// within its own train; flagged visually
    CellOrderViolation,
    /// A pattern has fewer than two corridor-relevant stops and was
    /// defaulted to the forward direction
    DegenerateDirection,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::StationOrderConflict => "station order conflict",
            DiagnosticKind::ColumnOrderUnresolved => "column order unresolved",
            DiagnosticKind::CellOrderViolation => "cell order violation",
            DiagnosticKind::DegenerateDirection => "degenerate direction",
        };
        f.write_str(name)
    }
}

/// One recorded condition.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// What went wrong
    pub kind: DiagnosticKind,
    /// Whether the caller should abandon the result. Never set by this
    /// core; reserved for hosts that layer their own validation on top.
    pub fatal: bool,
    /// Human-readable detail
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Accumulated diagnostics for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a non-fatal condition.
    pub fn push(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        warn!(kind = %kind, "{message}");
        self.entries.push(Diagnostic {
            kind,
            fatal: false,
            message,
        });
    }

    /// Appends all entries from another collection.
    pub fn append(&mut self, mut other: Diagnostics) {
        self.entries.append(&mut other.entries);
    }

    /// True when no fatal entry has been recorded.
    pub fn ok(&self) -> bool {
        self.entries.iter().all(|d| !d.fatal)
    }

    /// All recorded entries, in order.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Number of entries of one kind.
    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
