//! Renderer- and exporter-facing output types.
//!
//! The renderer receives the full model: rows with formatted cells, the
//! column order, per-train metadata, the sort trace, and diagnostics. The
//! exporter receives the same matrix flattened to plain text cells
//! carrying only the cancelled/predicted/actual tags.

use chrono::NaiveDate;

use crate::columns::ColumnOrder;
use crate::diagnostics::Diagnostics;
use crate::domain::CallPattern;
use crate::matrix::Row;

/// Per-train display metadata.
#[derive(Debug, Clone)]
pub struct TrainMeta {
    /// Short column-header label
    pub visible: String,
    /// Hover text: operator, identity, date, route
    pub tooltip: String,
    /// Run identifier, for external service links
    pub run_id: String,
    /// Run date
    pub run_date: NaiveDate,
    /// First-class accommodation available
    pub first_class_available: bool,
    /// Sleeper service
    pub is_sleeper: bool,
    /// Replacement bus
    pub is_bus: bool,
}

/// Builds the display metadata for one train.
pub fn train_meta(pattern: &CallPattern) -> TrainMeta {
    let visible = pattern
        .operator_code
        .map(|code| code.as_str().to_string())
        .filter(|code| !code.is_empty())
        .unwrap_or_else(|| {
            if pattern.identity.is_empty() {
                "?".to_string()
            } else {
                pattern.identity.clone()
            }
        });

    let mut line1_parts = Vec::new();
    if !pattern.operator_name.is_empty() {
        line1_parts.push(pattern.operator_name.clone());
    }
    if !pattern.identity.is_empty() {
        line1_parts.push(pattern.identity.clone());
    }
    line1_parts.push(pattern.run_date.to_string());
    let line1 = line1_parts.join(" • ");

    let line2 = pattern.route_text();
    let tooltip = if line2.is_empty() {
        line1.clone()
    } else {
        format!("{line1}\n{line2}")
    };

    TrainMeta {
        visible,
        tooltip,
        run_id: pattern.run_id.as_str().to_string(),
        run_date: pattern.run_date,
        first_class_available: pattern.first_class_available(),
        is_sleeper: pattern.is_sleeper(),
        is_bus: pattern.is_bus,
    }
}

/// The assembled timetable for one direction, ready for rendering.
#[derive(Debug, Clone)]
pub struct TimetableModel {
    /// All rows, cells in original train order (indexed by train)
    pub rows: Vec<Row>,
    /// Column display order plus unsorted tail
    pub column_order: ColumnOrder,
    /// Per-train metadata, indexed by train
    pub train_meta: Vec<TrainMeta>,
    /// The column sequencer's trace log
    pub diagnostic_log: String,
    /// Run ids of trains in the unsorted tail
    pub unsorted_train_ids: Vec<String>,
    /// Non-fatal conditions recorded while building this direction
    pub diagnostics: Diagnostics,
}

impl TimetableModel {
    /// Number of train columns.
    pub fn num_trains(&self) -> usize {
        self.train_meta.len()
    }
}

/// One exported cell: text plus the status tags exporters care about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportCell {
    /// Plain text, platform annotation folded in
    pub text: String,
    /// Struck through
    pub cancelled: bool,
    /// Predicted realtime value
    pub predicted: bool,
    /// Observed realtime value
    pub actual: bool,
}

/// The matrix flattened for table export.
#[derive(Debug, Clone)]
pub struct ExportTable {
    /// Header row: label column then one entry per displayed train
    pub headers: Vec<String>,
    /// Body rows: label cell then one cell per displayed train
    pub rows: Vec<Vec<ExportCell>>,
}

/// Flattens a model to plain text cells in display column order.
pub fn export_table(model: &TimetableModel) -> ExportTable {
    let order = model.column_order.display_order();

    let mut headers = Vec::with_capacity(order.len() + 1);
    headers.push("Operator".to_string());
    headers.extend(order.iter().map(|&t| model.train_meta[t].visible.clone()));

    let rows = model
        .rows
        .iter()
        .map(|row| {
            let mut cells = Vec::with_capacity(order.len() + 1);
            cells.push(ExportCell {
                text: row.label(),
                ..ExportCell::default()
            });
            for &train in &order {
                let cell = match row.cells[train].as_ref() {
                    Some(cell) => {
                        let text = match cell.platform.as_ref() {
                            Some(platform) => format!("{} {}", cell.text, platform.text),
                            None => cell.text.clone(),
                        };
                        ExportCell {
                            text,
                            cancelled: cell.format.cancelled,
                            predicted: cell.format.predicted,
                            actual: cell.format.actual,
                        }
                    }
                    None => ExportCell::default(),
                };
                cells.push(cell);
            }
            cells
        })
        .collect();

    ExportTable { headers, rows }
}
