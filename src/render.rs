// src/render.rs
//! Pure display computation: everything the UI layer needs to draw a cell,
//! derived from the column specs and the fetched rows alone.

use serde_json::Value;

use crate::config::{ColumnAlign, ColumnSpec, TableOptions};
use crate::data_source::Row;
use crate::format::{cell_text, format_by_pattern, format_date, format_grouped, numeric_value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellTone {
    #[default]
    Plain,
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellDisplay {
    pub text: String,
    /// Fill percentage for progress-bar columns, 0..=100.
    pub progress_percent: Option<f32>,
    pub tone: CellTone,
}

/// A renderable column: the column spec, its resolved header title and, for
/// progress-bar columns, the aggregate the percentages are computed against.
#[derive(Debug, Clone)]
pub struct DisplayColumn {
    pub spec: ColumnSpec,
    pub title: String,
    pub progress_total: f64,
}

impl DisplayColumn {
    pub fn align(&self) -> ColumnAlign {
        self.spec.align_content.unwrap_or_default()
    }
}

/// Columns to draw, in configured order, hidden ones excluded. Header titles
/// fall back to the column name when no explicit title is set.
pub fn display_columns(options: Option<&TableOptions>, rows: &[Row]) -> Vec<DisplayColumn> {
    let Some(options) = options else {
        return Vec::new();
    };
    options
        .columns
        .iter()
        .filter(|spec| !spec.is_hidden)
        .map(|spec| {
            let progress_total = if spec.is_progress_bar() {
                progress_total(rows, &spec.name)
            } else {
                0.0
            };
            DisplayColumn {
                title: spec.title.clone().unwrap_or_else(|| spec.name.clone()),
                spec: spec.clone(),
                progress_total,
            }
        })
        .collect()
}

/// Sum of the column's numeric values over all rows. Missing and
/// non-numeric cells count as zero.
pub fn progress_total(rows: &[Row], name: &str) -> f64 {
    rows.iter()
        .filter_map(|row| row.get(name))
        .filter_map(numeric_value)
        .sum()
}

/// Compute a cell's display value. Formatting precedence: a configured date
/// format wins, then a numeric pattern for numeric values, then default
/// integer grouping for numeric values, else the raw text. A column absent
/// from the row renders blank.
pub fn cell_display(column: &DisplayColumn, value: Option<&Value>) -> CellDisplay {
    let spec = &column.spec;
    let raw = value.map(cell_text).unwrap_or_default();
    let numeric = value.and_then(numeric_value);

    let text = if let Some(date_format) = spec.date_format.as_deref().filter(|f| !f.is_empty()) {
        format_date(&raw, spec.date_type.as_deref(), date_format).unwrap_or(raw)
    } else if let (Some(n), Some(pattern)) = (
        numeric,
        spec.number_format.as_deref().filter(|f| !f.is_empty()),
    ) {
        format_by_pattern(n, pattern)
    } else if let Some(n) = numeric {
        format_grouped(n, 0)
    } else {
        raw
    };

    let progress_percent = spec.is_progress_bar().then(|| {
        let n = numeric.unwrap_or(0.0);
        if column.progress_total > 0.0 {
            ((n / column.progress_total) * 100.0) as f32
        } else {
            0.0
        }
    });

    let tone = match numeric {
        Some(n) if spec.colored_negative_values && n < 0.0 => CellTone::Negative,
        Some(n) if spec.colored_positive_values && n > 0.0 => CellTone::Positive,
        _ => CellTone::Plain,
    };

    CellDisplay {
        text,
        progress_percent,
        tone,
    }
}

/// Footer row-count label over the pre-filter count; hidden when empty.
pub fn row_count_label(total_rows: usize) -> Option<String> {
    match total_rows {
        0 => None,
        1 => Some("1 row".to_string()),
        n => Some(format!("{n} rows")),
    }
}

/// Height left for the table body inside the panel after the info header and
/// the footer, matching the fixed paddings the layout uses.
pub fn table_height(panel_height: f32, info_height: f32, footer_height: f32) -> f32 {
    let table_panel = panel_height - (info_height + 10.0);
    (table_panel - (footer_height + 20.0)).max(0.0)
}
