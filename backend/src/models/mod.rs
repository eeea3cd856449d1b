//! Domain models for the autolap analysis pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`Record`] - One cleaned dataset row, keyed by field name
//! - [`FieldValue`] - Numeric, categorical or missing cell
//! - [`DimensionKey`] - Ordered tuple of dimension values identifying a group
//! - [`AggFn`] - Supported aggregation functions
//! - [`fields`] - Canonical automobile field catalogue

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::AggregateError;

pub mod fields;

// =============================================================================
// Field Values
// =============================================================================

/// A single cell of a record.
///
/// Serializes as a bare JSON number, string or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Numeric measure value.
    Number(f64),
    /// Categorical dimension value.
    Category(String),
    /// Absent value (`?` or empty in the source file).
    Missing,
}

impl FieldValue {
    /// Get the numeric value if present.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the categorical value if present.
    pub fn as_category(&self) -> Option<&str> {
        match self {
            FieldValue::Category(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// The string used when this value acts as a grouping key.
    ///
    /// Numbers use their shortest display form (`2.0` becomes `"2"`).
    pub fn key_string(&self) -> Option<String> {
        match self {
            FieldValue::Category(s) => Some(s.clone()),
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Missing => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Category(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Category(value)
    }
}

// =============================================================================
// Records
// =============================================================================

/// One row of the dataset, typed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly used to assemble fixtures.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Numeric value of `field`, `None` if absent, missing or categorical.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_number)
    }

    /// Categorical value of `field`, `None` if absent, missing or numeric.
    pub fn category(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_category)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// =============================================================================
// Dimension Keys
// =============================================================================

/// Ordered tuple of dimension values identifying one group on one axis.
///
/// An axis with no dimensions has exactly one key: the empty tuple.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionKey(Vec<String>);

impl DimensionKey {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    /// The key of an axis without dimensions.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    /// Value at a given dimension level.
    pub fn level(&self, level: usize) -> Option<&str> {
        self.0.get(level).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Display label formed by joining the values with `separator`.
    pub fn label(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

impl fmt::Display for DimensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.join(", "))
    }
}

impl<S: Into<String>> FromIterator<S> for DimensionKey {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// Aggregation Functions
// =============================================================================

/// Aggregation applied to the measure values of one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggFn {
    /// Arithmetic mean, summed in input order.
    Mean,
    /// Middle value (mean of the two middle values for even counts).
    Median,
    /// Sum in input order.
    Sum,
    /// Number of contributing records.
    Count,
    Min,
    Max,
}

impl AggFn {
    /// Every supported function, in display order.
    pub const ALL: [AggFn; 6] = [
        AggFn::Mean,
        AggFn::Median,
        AggFn::Sum,
        AggFn::Count,
        AggFn::Min,
        AggFn::Max,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AggFn::Mean => "mean",
            AggFn::Median => "median",
            AggFn::Sum => "sum",
            AggFn::Count => "count",
            AggFn::Min => "min",
            AggFn::Max => "max",
        }
    }

    /// Apply the function to a group's values.
    ///
    /// `values` holds at least one element; groups are only created by a
    /// contributing record.
    pub fn apply(&self, values: &[f64]) -> f64 {
        match self {
            AggFn::Mean => values.iter().sum::<f64>() / values.len() as f64,
            AggFn::Median => median(values),
            AggFn::Sum => values.iter().sum(),
            AggFn::Count => values.len() as f64,
            AggFn::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            AggFn::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

impl fmt::Display for AggFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggFn {
    type Err = AggregateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mean" | "avg" | "average" => Ok(AggFn::Mean),
            "median" => Ok(AggFn::Median),
            "sum" => Ok(AggFn::Sum),
            "count" => Ok(AggFn::Count),
            "min" => Ok(AggFn::Min),
            "max" => Ok(AggFn::Max),
            _ => Err(AggregateError::UnsupportedAggregation { name: s.to_string() }),
        }
    }
}

/// Median of a non-empty slice.
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}
