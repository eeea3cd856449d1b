//! Partition flat records into groups keyed by dimension values.
//!
//! This is the step shared by [`aggregate`](super::aggregate) and
//! [`rotate`](super::rotate): every record is assigned to the group of its
//! (row-key, column-key) pair.
//!
//! # Architecture
//!
//! ```text
//! Records (flat)                          →  Partition
//! ┌──────────────────────────────────┐       ┌──────────────────────────────┐
//! │ toyota, fwd, 10000               │       │ rows: [toyota, honda]        │
//! │ toyota, rwd, 20000               │  →    │ cols: [fwd, rwd]             │
//! │ honda,  fwd, 15000               │       │ (toyota,fwd) → [0]           │
//! └──────────────────────────────────┘       │ (toyota,rwd) → [1]           │
//!                                            │ (honda,fwd)  → [2]           │
//!                                            └──────────────────────────────┘
//! ```
//!
//! Row keys and column keys are deduplicated independently, each in the
//! order first seen while scanning the input. Groups keep their members in
//! input order.

use std::collections::HashMap;

use crate::error::{AggregateError, AggregateResult};
use crate::models::{DimensionKey, FieldValue, Record};

/// One non-empty group of the partition.
#[derive(Debug, Clone)]
pub struct Group {
    /// Index into [`Partition::row_keys`]
    pub row: usize,
    /// Index into [`Partition::col_keys`]
    pub col: usize,
    /// Indices of the member records, in input order
    pub members: Vec<usize>,
}

/// Records partitioned by (row-key, column-key).
#[derive(Debug, Clone, Default)]
pub struct Partition {
    row_keys: Vec<DimensionKey>,
    col_keys: Vec<DimensionKey>,
    groups: Vec<Group>,
    lookup: HashMap<(usize, usize), usize>,
}

impl Partition {
    /// Observed row keys, first-seen order.
    pub fn row_keys(&self) -> &[DimensionKey] {
        &self.row_keys
    }

    /// Observed column keys, first-seen order.
    pub fn col_keys(&self) -> &[DimensionKey] {
        &self.col_keys
    }

    /// Non-empty groups, in the order their first member appeared.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Group at (row, col), if any record contributed to it.
    pub fn group(&self, row: usize, col: usize) -> Option<&Group> {
        self.lookup.get(&(row, col)).map(|&i| &self.groups[i])
    }

    /// Total number of member records across all groups.
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }
}

/// Partition `records` by `row_dims` and `col_dims`.
///
/// Every record must carry every dimension and every measure, otherwise the
/// call fails with [`AggregateError::UnknownField`]. A categorical measure is
/// a [`AggregateError::FieldTypeMismatch`]. Records with a missing dimension
/// or measure value do not join any group.
pub fn partition(
    records: &[Record],
    row_dims: &[&str],
    col_dims: &[&str],
    measures: &[&str],
) -> AggregateResult<Partition> {
    let referenced: Vec<&str> = row_dims.iter().chain(col_dims).chain(measures).copied().collect();
    check_fields(records, &referenced)?;

    let mut part = Partition::default();
    let mut row_index: HashMap<DimensionKey, usize> = HashMap::new();
    let mut col_index: HashMap<DimensionKey, usize> = HashMap::new();

    for (i, record) in records.iter().enumerate() {
        if !has_measures(record, measures)? {
            continue;
        }
        let (Some(row_key), Some(col_key)) = (key_of(record, row_dims), key_of(record, col_dims))
        else {
            continue;
        };

        let row = intern(&mut row_index, &mut part.row_keys, row_key);
        let col = intern(&mut col_index, &mut part.col_keys, col_key);

        let slot = *part.lookup.entry((row, col)).or_insert_with(|| {
            part.groups.push(Group {
                row,
                col,
                members: Vec::new(),
            });
            part.groups.len() - 1
        });
        part.groups[slot].members.push(i);
    }

    Ok(part)
}

fn check_fields(records: &[Record], fields: &[&str]) -> AggregateResult<()> {
    for field in fields {
        if records.iter().any(|r| !r.contains(field)) {
            return Err(AggregateError::UnknownField {
                field: field.to_string(),
            });
        }
    }
    Ok(())
}

/// `Ok(false)` if any measure is missing on this record.
fn has_measures(record: &Record, measures: &[&str]) -> AggregateResult<bool> {
    for measure in measures {
        match record.get(measure) {
            Some(FieldValue::Number(_)) => {}
            Some(FieldValue::Category(_)) => {
                return Err(AggregateError::FieldTypeMismatch {
                    field: measure.to_string(),
                })
            }
            Some(FieldValue::Missing) | None => return Ok(false),
        }
    }
    Ok(true)
}

/// Key tuple of `record` over `dims`; `None` if any value is missing.
fn key_of(record: &Record, dims: &[&str]) -> Option<DimensionKey> {
    dims.iter()
        .map(|dim| record.get(dim).and_then(FieldValue::key_string))
        .collect::<Option<Vec<_>>>()
        .map(DimensionKey::new)
}

fn intern(
    index: &mut HashMap<DimensionKey, usize>,
    keys: &mut Vec<DimensionKey>,
    key: DimensionKey,
) -> usize {
    if let Some(&i) = index.get(&key) {
        return i;
    }
    keys.push(key.clone());
    index.insert(key, keys.len() - 1);
    keys.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(brand: &str, drive: &str, price: f64) -> Record {
        Record::new()
            .with("Brand", brand)
            .with("Drive_Type", drive)
            .with("Price", price)
    }

    #[test]
    fn test_first_seen_order_per_axis() {
        let records = vec![
            car("toyota", "rwd", 1.0),
            car("honda", "fwd", 2.0),
            car("toyota", "fwd", 3.0),
        ];
        let part = partition(&records, &["Brand"], &["Drive_Type"], &["Price"]).unwrap();

        let rows: Vec<String> = part.row_keys().iter().map(|k| k.label("")).collect();
        let cols: Vec<String> = part.col_keys().iter().map(|k| k.label("")).collect();
        assert_eq!(rows, vec!["toyota", "honda"]);
        assert_eq!(cols, vec!["rwd", "fwd"]);
        assert_eq!(part.groups().len(), 3);
        assert!(part.group(1, 0).is_none());
    }

    #[test]
    fn test_members_in_input_order() {
        let records = vec![
            car("toyota", "fwd", 1.0),
            car("honda", "fwd", 2.0),
            car("toyota", "fwd", 3.0),
        ];
        let part = partition(&records, &["Brand"], &[], &["Price"]).unwrap();

        assert_eq!(part.col_keys(), &[DimensionKey::empty()]);
        assert_eq!(part.group(0, 0).unwrap().members, vec![0, 2]);
        assert_eq!(part.member_count(), 3);
    }

    #[test]
    fn test_unknown_field() {
        let records = vec![car("toyota", "fwd", 1.0), Record::new().with("Brand", "honda")];
        let err = partition(&records, &["Brand"], &["Drive_Type"], &["Price"]).unwrap_err();
        assert_eq!(err, AggregateError::UnknownField { field: "Drive_Type".into() });
    }

    #[test]
    fn test_categorical_measure_rejected() {
        let records = vec![car("toyota", "fwd", 1.0)];
        let err = partition(&records, &["Drive_Type"], &[], &["Brand"]).unwrap_err();
        assert_eq!(err, AggregateError::FieldTypeMismatch { field: "Brand".into() });
    }

    #[test]
    fn test_missing_values_skip_the_record() {
        let records = vec![
            car("toyota", "fwd", 1.0),
            car("honda", "fwd", 1.0).with("Price", FieldValue::Missing),
            car("mazda", "fwd", 1.0).with("Brand", FieldValue::Missing),
        ];
        let part = partition(&records, &["Brand"], &[], &["Price"]).unwrap();
        assert_eq!(part.row_keys().len(), 1);
        assert_eq!(part.member_count(), 1);
    }
}
