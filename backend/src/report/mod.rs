//! Presentation and persistence of finished tables.
//!
//! Nothing here aggregates or reorders: cubes and rotated tables are shown
//! and written exactly as the engine produced them.
//!
//! - [`render_cube`] / [`render_rotated`] - fixed-width console tables
//! - [`export`] - CSV persistence
//! - [`ChartSeries`] - dual-axis chart data for the rotate view

pub mod export;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{AggregateError, AggregateResult, ReportResult};
use crate::transform::{Cube, RotatedTable, SEGMENT_SEPARATOR};

pub use export::{save_cube_csv, save_rotated_csv, write_cube_csv, write_rotated_csv};

// =============================================================================
// Console rendering
// =============================================================================

/// Render a cube as a text table, showing at most `max_rows` × `max_cols`
/// cells.
pub fn render_cube(cube: &Cube, max_rows: usize, max_cols: usize) -> String {
    let n_row_dims = cube.row_dims().len();
    let shown_rows = cube.n_rows().min(max_rows);
    let shown_cols = cube.n_cols().min(max_cols);
    let mut grid: Vec<Vec<String>> = Vec::new();

    if cube.col_dims().is_empty() {
        let mut header: Vec<String> = cube.row_dims().to_vec();
        header.push(format!("{} ({})", cube.measure(), cube.agg_fn()));
        grid.push(header);
    } else {
        for (level, dim) in cube.col_dims().iter().enumerate() {
            let mut line = vec![String::new(); n_row_dims - 1];
            line.push(dim.clone());
            line.extend(
                cube.column_keys()[..shown_cols]
                    .iter()
                    .map(|k| k.level(level).unwrap_or("").to_string()),
            );
            grid.push(line);
        }
        let mut dims_line = cube.row_dims().to_vec();
        dims_line.extend(std::iter::repeat(String::new()).take(shown_cols));
        grid.push(dims_line);
    }

    for (r, key) in cube.row_keys()[..shown_rows].iter().enumerate() {
        let mut line = key.values().to_vec();
        line.extend(cube.row_values(r)[..shown_cols].iter().map(|v| format_number(*v)));
        grid.push(line);
    }

    let mut out = format_grid(&grid, n_row_dims);
    if shown_rows < cube.n_rows() || shown_cols < cube.n_cols() {
        out.push_str(&format!(
            "[{} rows x {} columns, showing {} x {}]\n",
            cube.n_rows(),
            cube.n_cols(),
            shown_rows,
            shown_cols
        ));
    }
    out
}

/// Render a rotated table as a text table.
pub fn render_rotated(table: &RotatedTable) -> String {
    let mut header: Vec<String> = table.row_dims().to_vec();
    header.extend(
        table
            .measures()
            .iter()
            .zip(table.agg_fns())
            .map(|(m, f)| format!("{} ({})", m, f)),
    );

    let mut grid = vec![header];
    for row in table.rows() {
        let mut line = row.key().values().to_vec();
        line.extend(row.values().iter().map(|v| format_number(*v)));
        grid.push(line);
    }

    format_grid(&grid, table.row_dims().len())
}

/// Shortest representation, rounded to two decimals.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    rounded.to_string()
}

/// Pad a grid into aligned columns. The first `key_cols` columns are
/// left-aligned, the rest right-aligned.
fn format_grid(grid: &[Vec<String>], key_cols: usize) -> String {
    let n_cols = grid.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..n_cols)
        .map(|c| {
            grid.iter()
                .filter_map(|line| line.get(c))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for line in grid {
        let cells: Vec<String> = line
            .iter()
            .enumerate()
            .map(|(c, cell)| {
                if c < key_cols {
                    format!("{:<width$}", cell, width = widths[c])
                } else {
                    format!("{:>width$}", cell, width = widths[c])
                }
            })
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}

// =============================================================================
// Chart data
// =============================================================================

/// One axis of the dual-axis chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartAxis {
    pub measure: String,
    pub label: String,
    pub values: Vec<f64>,
}

/// Data of the "Price vs. Horsepower" segment chart: bars for one measure,
/// a line for the other, over the leading segments of a rotated table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub title: String,
    pub x_label: String,
    /// Segment labels, in rotated-table order
    pub segments: Vec<String>,
    pub bars: ChartAxis,
    pub line: ChartAxis,
    pub generated_at: DateTime<Utc>,
}

impl ChartSeries {
    /// Take the first `top_n` rows of `table` as chart data.
    ///
    /// Fails with [`AggregateError::UnknownField`] if either measure is not
    /// part of the table.
    pub fn from_rotated(
        table: &RotatedTable,
        bar_measure: &str,
        line_measure: &str,
        top_n: usize,
    ) -> AggregateResult<Self> {
        let top = table.top(top_n);
        let column = |measure: &str| {
            top.column(measure).ok_or_else(|| AggregateError::UnknownField {
                field: measure.to_string(),
            })
        };
        let bars = column(bar_measure)?;
        let line = column(line_measure)?;

        Ok(Self {
            title: format!(
                "OLAP Rotate: top {} segments ({} vs. {})",
                top.len(),
                bar_measure,
                line_measure
            ),
            x_label: format!("Segment ({})", table.row_dims().join(" + ")),
            segments: top.labels(SEGMENT_SEPARATOR),
            bars: ChartAxis {
                measure: bar_measure.to_string(),
                label: axis_label(&top, bar_measure),
                values: bars,
            },
            line: ChartAxis {
                measure: line_measure.to_string(),
                label: axis_label(&top, line_measure),
                values: line,
            },
            generated_at: Utc::now(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Write the chart data as pretty JSON. Empty charts are not written;
    /// returns whether a file was produced.
    pub fn save(&self, path: &Path) -> ReportResult<bool> {
        if self.is_empty() {
            return Ok(false);
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(true)
    }
}

fn axis_label(table: &RotatedTable, measure: &str) -> String {
    let agg = table
        .measures()
        .iter()
        .position(|m| m == measure)
        .map(|i| table.agg_fns()[i].to_string())
        .unwrap_or_default();
    format!("{} {}", agg, measure).trim().to_string()
}
