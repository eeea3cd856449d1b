//! Roll-up over several measures on a single axis, followed by ranking.
//!
//! Each measure is reduced with its own function over the same groups, then
//! the rows are ordered by one of the measures. The sort is stable, so rows
//! with equal sort values keep the order in which their group was first seen.

use std::collections::{BTreeMap, HashMap};

use super::grouper::partition;
use crate::error::{AggregateError, AggregateResult};
use crate::models::{AggFn, DimensionKey, Record};

/// Separator used to build segment labels from row keys.
pub const SEGMENT_SEPARATOR: &str = " / ";

/// One row of a [`RotatedTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct RotatedRow {
    key: DimensionKey,
    /// Aligned with [`RotatedTable::measures`]
    values: Vec<f64>,
    rank: usize,
}

impl RotatedRow {
    pub fn key(&self) -> &DimensionKey {
        &self.key
    }

    /// Aggregated values, in measure order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// 0-based position after sorting.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Display label: the row-dimension values joined by `separator`.
    pub fn label(&self, separator: &str) -> String {
        self.key.label(separator)
    }
}

/// Row-keyed table of several independently aggregated measures, sorted on
/// one of them.
#[derive(Debug, Clone, PartialEq)]
pub struct RotatedTable {
    row_dims: Vec<String>,
    measures: Vec<String>,
    agg_fns: Vec<AggFn>,
    sort_by: String,
    ascending: bool,
    rows: Vec<RotatedRow>,
}

impl RotatedTable {
    pub fn row_dims(&self) -> &[String] {
        &self.row_dims
    }

    pub fn measures(&self) -> &[String] {
        &self.measures
    }

    /// Aggregation used for each measure, aligned with [`Self::measures`].
    pub fn agg_fns(&self) -> &[AggFn] {
        &self.agg_fns
    }

    pub fn sort_by(&self) -> &str {
        &self.sort_by
    }

    pub fn ascending(&self) -> bool {
        self.ascending
    }

    /// Rows in sort order.
    pub fn rows(&self) -> &[RotatedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `measure` in row `row`.
    pub fn value(&self, row: usize, measure: &str) -> Option<f64> {
        let m = self.measures.iter().position(|name| name == measure)?;
        self.rows.get(row).map(|r| r.values[m])
    }

    /// Values of one measure down the table, in sort order.
    pub fn column(&self, measure: &str) -> Option<Vec<f64>> {
        let m = self.measures.iter().position(|name| name == measure)?;
        Some(self.rows.iter().map(|r| r.values[m]).collect())
    }

    /// Measure name → value mapping of one row.
    pub fn row_map(&self, row: usize) -> Option<BTreeMap<String, f64>> {
        let r = self.rows.get(row)?;
        Some(self.measures.iter().cloned().zip(r.values.iter().copied()).collect())
    }

    /// First `n` rows in sort order, ranks unchanged.
    pub fn top(&self, n: usize) -> RotatedTable {
        RotatedTable {
            rows: self.rows.iter().take(n).cloned().collect(),
            ..self.clone()
        }
    }

    /// Display labels of every row, in sort order.
    pub fn labels(&self, separator: &str) -> Vec<String> {
        self.rows.iter().map(|r| r.label(separator)).collect()
    }
}

/// Group `records` by `row_dims`, aggregate every measure with its own
/// function and sort the rows on `sort_by`.
///
/// An empty record set yields an empty table; the query is still validated.
///
/// # Errors
/// - [`AggregateError::InvalidQuery`] if `measures` or `row_dims` is empty,
///   or a measure has no entry in `agg_fns`
/// - [`AggregateError::UnknownField`] if `sort_by` is not one of `measures`
///   or a field is absent from a record
/// - [`AggregateError::FieldTypeMismatch`] if a measure is categorical
pub fn rotate(
    records: &[Record],
    measures: &[&str],
    row_dims: &[&str],
    agg_fns: &HashMap<String, AggFn>,
    sort_by: &str,
    ascending: bool,
) -> AggregateResult<RotatedTable> {
    if measures.is_empty() {
        return Err(AggregateError::InvalidQuery("at least one measure is required".to_string()));
    }
    if row_dims.is_empty() {
        return Err(AggregateError::InvalidQuery(
            "at least one row dimension is required".to_string(),
        ));
    }
    let sort_index = measures
        .iter()
        .position(|m| *m == sort_by)
        .ok_or_else(|| AggregateError::UnknownField {
            field: sort_by.to_string(),
        })?;
    let fns = measures
        .iter()
        .map(|m| {
            agg_fns.get(*m).copied().ok_or_else(|| {
                AggregateError::InvalidQuery(format!("no aggregation given for measure '{}'", m))
            })
        })
        .collect::<AggregateResult<Vec<AggFn>>>()?;

    let mut table = RotatedTable {
        row_dims: row_dims.iter().map(|d| d.to_string()).collect(),
        measures: measures.iter().map(|m| m.to_string()).collect(),
        agg_fns: fns,
        sort_by: sort_by.to_string(),
        ascending,
        rows: Vec::new(),
    };
    if records.is_empty() {
        return Ok(table);
    }

    let part = partition(records, row_dims, &[], measures)?;

    for group in part.groups() {
        let values = measures
            .iter()
            .zip(&table.agg_fns)
            .map(|(measure, agg_fn)| {
                let measure_values: Vec<f64> = group
                    .members
                    .iter()
                    .filter_map(|&i| records[i].number(measure))
                    .collect();
                agg_fn.apply(&measure_values)
            })
            .collect();

        table.rows.push(RotatedRow {
            key: part.row_keys()[group.row].clone(),
            values,
            rank: 0,
        });
    }

    // `sort_by` is stable: ties keep first-seen group order. Adding 0.0
    // folds -0.0 into 0.0 so both zeros tie.
    table.rows.sort_by(|a, b| {
        let ord = (a.values[sort_index] + 0.0).total_cmp(&(b.values[sort_index] + 0.0));
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });
    for (rank, row) in table.rows.iter_mut().enumerate() {
        row.rank = rank;
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn car(brand: &str, body: &str, hp: f64, price: f64) -> Record {
        Record::new()
            .with("Brand", brand)
            .with("Body_Style", body)
            .with("Horsepower", hp)
            .with("Price", price)
    }

    fn fns(pairs: &[(&str, AggFn)]) -> HashMap<String, AggFn> {
        pairs.iter().map(|(m, f)| (m.to_string(), *f)).collect()
    }

    #[test]
    fn test_tie_keeps_first_seen_order() {
        let records = vec![
            car("toyota", "sedan", 70.0, 10000.0),
            car("toyota", "sedan", 90.0, 20000.0),
            car("honda", "sedan", 80.0, 15000.0),
        ];
        let table = rotate(
            &records,
            &["Price"],
            &["Brand"],
            &fns(&[("Price", AggFn::Mean)]),
            "Price",
            false,
        )
        .unwrap();

        assert_eq!(table.labels(SEGMENT_SEPARATOR), vec!["toyota", "honda"]);
        assert_eq!(table.value(0, "Price"), Some(15000.0));
        assert_eq!(table.value(1, "Price"), Some(15000.0));
    }

    #[test]
    fn test_signed_zeros_tie() {
        let records = vec![
            car("toyota", "sedan", 70.0, 10000.0),
            car("mazda", "sedan", 68.0, -0.0),
            car("honda", "sedan", 76.0, 0.0),
        ];
        let price = fns(&[("Price", AggFn::Max)]);

        let desc = rotate(&records, &["Price"], &["Brand"], &price, "Price", false).unwrap();
        assert_eq!(desc.labels(SEGMENT_SEPARATOR), vec!["toyota", "mazda", "honda"]);

        let asc = rotate(&records, &["Price"], &["Brand"], &price, "Price", true).unwrap();
        assert_eq!(asc.labels(SEGMENT_SEPARATOR), vec!["mazda", "honda", "toyota"]);
    }

    #[test]
    fn test_descending_puts_max_first() {
        let records = vec![
            car("mazda", "sedan", 68.0, 6000.0),
            car("nissan", "wagon", 200.0, 30000.0),
            car("honda", "sedan", 76.0, 8000.0),
        ];
        let table = rotate(
            &records,
            &["Horsepower", "Price"],
            &["Brand", "Body_Style"],
            &fns(&[("Horsepower", AggFn::Mean), ("Price", AggFn::Mean)]),
            "Price",
            false,
        )
        .unwrap();

        assert_eq!(table.rows()[0].label(SEGMENT_SEPARATOR), "nissan / wagon");
        assert_eq!(table.column("Price").unwrap(), vec![30000.0, 8000.0, 6000.0]);
        assert_eq!(table.rows()[2].rank(), 2);
    }

    #[test]
    fn test_ascending_puts_min_first() {
        let records = vec![
            car("a", "x", 1.0, 3.0),
            car("b", "x", 1.0, 1.0),
            car("c", "x", 1.0, 2.0),
        ];
        let table = rotate(
            &records,
            &["Price"],
            &["Brand"],
            &fns(&[("Price", AggFn::Sum)]),
            "Price",
            true,
        )
        .unwrap();
        assert_eq!(table.labels(","), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_measures_use_independent_functions() {
        let records = vec![
            car("toyota", "sedan", 70.0, 10000.0),
            car("toyota", "sedan", 110.0, 30000.0),
            car("toyota", "sedan", 90.0, 11000.0),
        ];
        let table = rotate(
            &records,
            &["Horsepower", "Price"],
            &["Brand"],
            &fns(&[("Horsepower", AggFn::Max), ("Price", AggFn::Median)]),
            "Price",
            false,
        )
        .unwrap();

        let row = table.row_map(0).unwrap();
        assert_eq!(row["Horsepower"], 110.0);
        assert_eq!(row["Price"], 11000.0);
        assert_eq!(table.agg_fns(), &[AggFn::Max, AggFn::Median]);
    }

    #[test]
    fn test_row_count_matches_distinct_keys() {
        let records = vec![
            car("toyota", "sedan", 1.0, 1.0),
            car("toyota", "wagon", 1.0, 1.0),
            car("honda", "sedan", 1.0, 1.0),
            car("toyota", "sedan", 1.0, 1.0),
        ];
        let distinct: HashSet<(String, String)> = records
            .iter()
            .map(|r| {
                (
                    r.category("Brand").unwrap_or("").to_string(),
                    r.category("Body_Style").unwrap_or("").to_string(),
                )
            })
            .collect();

        let table = rotate(
            &records,
            &["Price"],
            &["Brand", "Body_Style"],
            &fns(&[("Price", AggFn::Count)]),
            "Price",
            false,
        )
        .unwrap();
        assert_eq!(table.len(), distinct.len());
        assert_eq!(table.value(0, "Price"), Some(2.0));
    }

    #[test]
    fn test_empty_input_gives_empty_table() {
        let table = rotate(&[], &["Price"], &["Brand"], &fns(&[("Price", AggFn::Mean)]), "Price", false)
            .unwrap();
        assert!(table.is_empty());
        assert_eq!(table.measures(), &["Price".to_string()]);
    }

    #[test]
    fn test_sort_by_must_be_a_measure() {
        let err = rotate(&[], &["Price"], &["Brand"], &fns(&[("Price", AggFn::Mean)]), "Horsepower", false)
            .unwrap_err();
        assert_eq!(err, AggregateError::UnknownField { field: "Horsepower".into() });
    }

    #[test]
    fn test_missing_aggregation_for_measure() {
        let err = rotate(
            &[],
            &["Price", "Horsepower"],
            &["Brand"],
            &fns(&[("Price", AggFn::Mean)]),
            "Price",
            false,
        )
        .unwrap_err();
        assert!(matches!(err, AggregateError::InvalidQuery(ref m) if m.contains("Horsepower")));
    }

    #[test]
    fn test_top_keeps_order() {
        let records = vec![
            car("a", "x", 1.0, 1.0),
            car("b", "x", 1.0, 3.0),
            car("c", "x", 1.0, 2.0),
        ];
        let table = rotate(&records, &["Price"], &["Brand"], &fns(&[("Price", AggFn::Mean)]), "Price", false)
            .unwrap();

        let top = table.top(2);
        assert_eq!(top.labels(""), vec!["b", "c"]);
        assert_eq!(table.top(10).len(), 3);
    }
}
