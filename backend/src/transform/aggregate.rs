//! Pivot-table aggregation: one measure, row and column dimensions.
//!
//! ```text
//!                 Drive_Type
//!                 fwd      rwd
//! Brand  toyota   10000    20000
//!        honda    15000    0        ← no honda/rwd record: fill value
//! ```

use std::collections::HashMap;

use super::grouper::partition;
use crate::error::{AggregateError, AggregateResult};
use crate::models::{AggFn, DimensionKey, Record};

/// Aggregated cross-tabulation of one measure.
///
/// Every (row-key, column-key) pair of the observed keys has a value; pairs
/// without contributing records hold the fill value.
#[derive(Debug, Clone)]
pub struct Cube {
    measure: String,
    agg_fn: AggFn,
    row_dims: Vec<String>,
    col_dims: Vec<String>,
    fill_value: f64,
    row_keys: Vec<DimensionKey>,
    col_keys: Vec<DimensionKey>,
    row_index: HashMap<DimensionKey, usize>,
    col_index: HashMap<DimensionKey, usize>,
    /// Row-major, `row_keys.len() * col_keys.len()` cells
    values: Vec<f64>,
    observed: Vec<bool>,
}

impl Cube {
    pub fn measure(&self) -> &str {
        &self.measure
    }

    pub fn agg_fn(&self) -> AggFn {
        self.agg_fn
    }

    pub fn row_dims(&self) -> &[String] {
        &self.row_dims
    }

    pub fn col_dims(&self) -> &[String] {
        &self.col_dims
    }

    pub fn fill_value(&self) -> f64 {
        self.fill_value
    }

    /// Observed row keys, first-seen order.
    pub fn row_keys(&self) -> &[DimensionKey] {
        &self.row_keys
    }

    /// Observed column keys, first-seen order. A single empty key when the
    /// cube has no column dimensions.
    pub fn column_keys(&self) -> &[DimensionKey] {
        &self.col_keys
    }

    pub fn n_rows(&self) -> usize {
        self.row_keys.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_keys.len()
    }

    /// Cell value by key pair. `None` only if a key was never observed.
    pub fn cell(&self, row: &DimensionKey, col: &DimensionKey) -> Option<f64> {
        let r = *self.row_index.get(row)?;
        let c = *self.col_index.get(col)?;
        Some(self.value_at(r, c))
    }

    /// Cell value by position.
    ///
    /// # Panics
    /// If `row` or `col` is out of range.
    pub fn value_at(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.col_keys.len() + col]
    }

    /// `true` if at least one record contributed to the cell.
    pub fn is_observed(&self, row: usize, col: usize) -> bool {
        self.observed[row * self.col_keys.len() + col]
    }

    /// Values of one row, in column-key order.
    pub fn row_values(&self, row: usize) -> &[f64] {
        let width = self.col_keys.len();
        &self.values[row * width..(row + 1) * width]
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (&DimensionKey, &DimensionKey, f64)> + '_ {
        self.row_keys.iter().enumerate().flat_map(move |(r, row)| {
            self.col_keys
                .iter()
                .enumerate()
                .map(move |(c, col)| (row, col, self.value_at(r, c)))
        })
    }

    /// Explicit (row-key, column-key) → value mapping.
    pub fn to_map(&self) -> HashMap<(DimensionKey, DimensionKey), f64> {
        self.cells()
            .map(|(row, col, value)| ((row.clone(), col.clone()), value))
            .collect()
    }
}

/// Cross-tabulate `measure` by `row_dims` × `col_dims`.
///
/// Records are partitioned by their (row values, column values); each
/// non-empty group is reduced with `agg_fn` over its measure values in input
/// order. Cells of the observed rows × observed columns that received no
/// record are set to `fill_value`.
///
/// # Errors
/// - [`AggregateError::InvalidQuery`] if `row_dims` is empty
/// - [`AggregateError::EmptyInput`] if no record contributes to any group
/// - [`AggregateError::UnknownField`] if a field is absent from a record
/// - [`AggregateError::FieldTypeMismatch`] if the measure is categorical
pub fn aggregate(
    records: &[Record],
    measure: &str,
    row_dims: &[&str],
    col_dims: &[&str],
    agg_fn: AggFn,
    fill_value: f64,
) -> AggregateResult<Cube> {
    if row_dims.is_empty() {
        return Err(AggregateError::InvalidQuery(
            "at least one row dimension is required".to_string(),
        ));
    }
    if records.is_empty() {
        return Err(AggregateError::EmptyInput);
    }

    let part = partition(records, row_dims, col_dims, &[measure])?;
    if part.groups().is_empty() {
        return Err(AggregateError::EmptyInput);
    }

    let width = part.col_keys().len();
    let mut values = vec![fill_value; part.row_keys().len() * width];
    let mut observed = vec![false; values.len()];

    for group in part.groups() {
        let group_values: Vec<f64> = group
            .members
            .iter()
            .filter_map(|&i| records[i].number(measure))
            .collect();

        let cell = group.row * width + group.col;
        values[cell] = agg_fn.apply(&group_values);
        observed[cell] = true;
    }

    let row_keys = part.row_keys().to_vec();
    let col_keys = part.col_keys().to_vec();

    Ok(Cube {
        measure: measure.to_string(),
        agg_fn,
        row_dims: row_dims.iter().map(|d| d.to_string()).collect(),
        col_dims: col_dims.iter().map(|d| d.to_string()).collect(),
        fill_value,
        row_index: index_of(&row_keys),
        col_index: index_of(&col_keys),
        row_keys,
        col_keys,
        values,
        observed,
    })
}

fn index_of(keys: &[DimensionKey]) -> HashMap<DimensionKey, usize> {
    keys.iter().cloned().enumerate().map(|(i, k)| (k, i)).collect()
}
