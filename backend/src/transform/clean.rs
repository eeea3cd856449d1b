//! Turn raw CSV rows into clean, typed records.
//!
//! ```text
//! ParseResult (strings)  →  coerce  →  impute  →  brand filter  →  Vec<Record>
//!   "?" / ""                 Missing    median (Price, Horsepower)
//!   "111"                    Number     mode   (Num_of_Doors)
//! ```
//!
//! Imputation statistics are computed over the whole file, before the brand
//! filter runs.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{fields, median, FieldValue, Record};
use crate::parser::ParseResult;

/// Brands kept by default: the Japanese manufacturers of the dataset.
pub const JAPANESE_BRANDS: [&str; 7] = [
    "toyota",
    "honda",
    "nissan",
    "mazda",
    "subaru",
    "mitsubishi",
    "isuzu",
];

/// Marker used for unknown values in the source dataset.
const MISSING_MARKER: &str = "?";

/// Statistics collected while cleaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanReport {
    /// Rows read from the source
    pub loaded: usize,
    /// Rows kept after the brand filter
    pub kept: usize,
    /// Numeric cells that could not be parsed
    pub coercion_failures: usize,
    /// Imputed cells per column
    pub imputed: BTreeMap<String, usize>,
}

impl CleanReport {
    pub fn filtered_out(&self) -> usize {
        self.loaded - self.kept
    }
}

/// Cleaned record set plus the statistics describing how it was produced.
#[derive(Debug, Clone)]
pub struct CleanedDataset {
    pub records: Vec<Record>,
    pub report: CleanReport,
}

/// Coerce, impute and filter a parsed file.
///
/// An empty `brands` list disables the brand filter.
pub fn clean_records<S: AsRef<str>>(parsed: &ParseResult, brands: &[S]) -> CleanedDataset {
    let mut report = CleanReport {
        loaded: parsed.rows.len(),
        ..CleanReport::default()
    };

    let mut records: Vec<Record> = parsed
        .rows
        .iter()
        .map(|row| coerce_row(&parsed.headers, row, &mut report.coercion_failures))
        .collect();

    for field in [fields::PRICE, fields::HORSEPOWER] {
        let filled = impute_median(&mut records, field);
        if filled > 0 {
            report.imputed.insert(field.to_string(), filled);
        }
    }

    let filled = impute_mode(&mut records, fields::NUM_OF_DOORS);
    if filled > 0 {
        report.imputed.insert(fields::NUM_OF_DOORS.to_string(), filled);
    }

    let records = filter_brands(records, brands);
    report.kept = records.len();

    CleanedDataset { records, report }
}

/// Build a typed record from one raw row.
fn coerce_row(headers: &[String], row: &[String], failures: &mut usize) -> Record {
    let mut record = Record::new();

    for (header, raw) in headers.iter().zip(row) {
        let raw = raw.trim();
        let value = if raw.is_empty() || raw == MISSING_MARKER {
            FieldValue::Missing
        } else if fields::is_numeric(header) {
            match raw.parse::<f64>() {
                Ok(n) if n.is_finite() => FieldValue::Number(n),
                _ => {
                    *failures += 1;
                    FieldValue::Missing
                }
            }
        } else {
            FieldValue::Category(raw.to_string())
        };
        record.insert(header.clone(), value);
    }

    record
}

/// Fill missing numeric cells of `field` with the median of the present ones.
///
/// Returns the number of filled cells. Nothing is filled when the column has
/// no present value at all.
pub fn impute_median(records: &mut [Record], field: &str) -> usize {
    let present: Vec<f64> = records.iter().filter_map(|r| r.number(field)).collect();
    if present.is_empty() {
        return 0;
    }
    let fill = median(&present);

    fill_missing(records, field, FieldValue::Number(fill))
}

/// Fill missing categorical cells of `field` with the most frequent value.
///
/// Ties go to the value that sorts first.
pub fn impute_mode(records: &mut [Record], field: &str) -> usize {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records.iter() {
        if let Some(value) = record.category(field) {
            *counts.entry(value).or_default() += 1;
        }
    }

    let mut mode: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if mode.map_or(true, |(_, best)| count > best) {
            mode = Some((value, count));
        }
    }

    match mode {
        Some((value, _)) => {
            let fill = FieldValue::Category(value.to_string());
            fill_missing(records, field, fill)
        }
        None => 0,
    }
}

fn fill_missing(records: &mut [Record], field: &str, fill: FieldValue) -> usize {
    let mut filled = 0;
    for record in records.iter_mut() {
        if record.get(field).map_or(false, FieldValue::is_missing) {
            record.insert(field, fill.clone());
            filled += 1;
        }
    }
    filled
}

/// Keep only records whose brand is listed (case-insensitive).
pub fn filter_brands<S: AsRef<str>>(records: Vec<Record>, brands: &[S]) -> Vec<Record> {
    if brands.is_empty() {
        return records;
    }

    records
        .into_iter()
        .filter(|r| {
            r.category(fields::BRAND).map_or(false, |brand| {
                brands.iter().any(|b| {
                    let b: &str = b.as_ref();
                    b.eq_ignore_ascii_case(brand)
                })
            })
        })
        .collect()
}
