//! CSV persistence of cubes and rotated tables.
//!
//! Cube layout with column dimensions (one header line per column level,
//! then the row-dimension names):
//!
//! ```text
//! ,Drive_Type,fwd,rwd
//! Brand,,,
//! toyota,,10000,20000     ← row key, then one value per column key
//! ```
//!
//! Without column dimensions a single header line is written:
//! `Brand,Price`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;

use crate::error::ReportResult;
use crate::transform::{Cube, RotatedTable};

/// Write a cube as CSV.
pub fn write_cube_csv<W: Write>(cube: &Cube, writer: W) -> ReportResult<()> {
    let mut wtr = Writer::from_writer(writer);
    let n_row_dims = cube.row_dims().len();

    if cube.col_dims().is_empty() {
        let mut header: Vec<&str> = cube.row_dims().iter().map(String::as_str).collect();
        header.push(cube.measure());
        wtr.write_record(&header)?;

        for (r, key) in cube.row_keys().iter().enumerate() {
            let mut line = key.values().to_vec();
            line.push(cube.value_at(r, 0).to_string());
            wtr.write_record(&line)?;
        }
    } else {
        for (level, dim) in cube.col_dims().iter().enumerate() {
            let mut line = vec![String::new(); n_row_dims - 1];
            line.push(dim.clone());
            line.extend(
                cube.column_keys()
                    .iter()
                    .map(|k| k.level(level).unwrap_or("").to_string()),
            );
            wtr.write_record(&line)?;
        }

        // The value cells under the row-dimension names stay blank.
        let mut dims_line = cube.row_dims().to_vec();
        dims_line.extend(std::iter::repeat(String::new()).take(cube.n_cols()));
        wtr.write_record(&dims_line)?;

        for (r, key) in cube.row_keys().iter().enumerate() {
            let mut line = key.values().to_vec();
            line.extend(cube.row_values(r).iter().map(f64::to_string));
            wtr.write_record(&line)?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Write a rotated table as CSV: row dimensions then measures, in sort order.
pub fn write_rotated_csv<W: Write>(table: &RotatedTable, writer: W) -> ReportResult<()> {
    let mut wtr = Writer::from_writer(writer);

    let mut header = table.row_dims().to_vec();
    header.extend(table.measures().iter().cloned());
    wtr.write_record(&header)?;

    for row in table.rows() {
        let mut line = row.key().values().to_vec();
        line.extend(row.values().iter().map(f64::to_string));
        wtr.write_record(&line)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Save a cube to `path`. Cubes without rows are not written; returns
/// whether a file was produced.
pub fn save_cube_csv(cube: &Cube, path: &Path) -> ReportResult<bool> {
    if cube.n_rows() == 0 {
        return Ok(false);
    }
    write_cube_csv(cube, File::create(path)?)?;
    Ok(true)
}

/// Save a rotated table to `path`. Empty tables are not written; returns
/// whether a file was produced.
pub fn save_rotated_csv(table: &RotatedTable, path: &Path) -> ReportResult<bool> {
    if table.is_empty() {
        return Ok(false);
    }
    write_rotated_csv(table, File::create(path)?)?;
    Ok(true)
}
