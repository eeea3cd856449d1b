//! Transformation module.
//!
//! This module turns raw CSV rows into OLAP views:
//! - Clean: type coercion, imputation, brand filter
//! - Grouper: partition records by dimension keys
//! - Aggregate: pivot tables (slice, drill-down)
//! - Rotate: multi-measure roll-up with ranking
//! - Pipeline: the complete automobile analysis

pub mod aggregate;
pub mod clean;
pub mod grouper;
pub mod pipeline;
pub mod rotate;

pub use aggregate::{aggregate, Cube};
pub use clean::{clean_records, CleanReport, CleanedDataset, JAPANESE_BRANDS};
pub use grouper::{partition, Group, Partition};
pub use pipeline::*;
pub use rotate::{rotate, RotatedRow, RotatedTable, SEGMENT_SEPARATOR};
