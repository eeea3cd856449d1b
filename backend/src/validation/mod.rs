//! Schema validation for loaded and cleaned datasets.
//!
//! Two checks run before records reach the aggregation engine:
//!
//! - [`validate_schema`] - every required column is present in the header
//! - [`validate_measures`] - measure values are finite and non-negative
//!
//! # Example
//!
//! ```rust,ignore
//! use autolap::{parse_csv_file_auto, validate_schema};
//! use autolap::models::fields;
//!
//! let parsed = parse_csv_file_auto("Automobile_data.csv")?;
//! validate_schema(&parsed.headers, &fields::REQUIRED)?;
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::models::Record;

/// Check that every `required` column appears in `headers`.
///
/// Fails on the first absent column, in `required` order.
pub fn validate_schema<S: AsRef<str>>(headers: &[S], required: &[&str]) -> ValidationResult<()> {
    for column in required {
        let present = headers.iter().any(|h| {
            let h: &str = h.as_ref();
            h == *column
        });
        if !present {
            return Err(ValidationError::MissingColumn(column.to_string()));
        }
    }
    Ok(())
}

/// Check that every record carries a finite, non-negative number for each
/// measure.
pub fn validate_measures(records: &[Record], measures: &[&str]) -> ValidationResult<()> {
    for (i, record) in records.iter().enumerate() {
        for measure in measures {
            let value = record.number(measure).ok_or_else(|| ValidationError::InvalidValue {
                field: measure.to_string(),
                message: format!("record {} has no numeric value", i),
            })?;

            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: measure.to_string(),
                    message: format!("record {} has out-of-range value {}", i, value),
                });
            }
        }
    }
    Ok(())
}
