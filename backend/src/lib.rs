//! # Autolap - OLAP views over automobile data
//!
//! Autolap loads the automobile dataset, cleans it, and computes pivot-table
//! views over numeric measures grouped by categorical dimensions: slice,
//! drill-down and rotate/roll-up.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│    Clean    │────▶│  Aggregate  │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (impute/flt)│     │  / Rotate   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                                                             ┌──────▼──────┐
//!                                                             │   Report    │
//!                                                             │ (CSV/chart) │
//!                                                             └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use autolap::{aggregate, AggFn, Record};
//!
//! let records = vec![
//!     Record::new().with("Brand", "toyota").with("Drive_Type", "fwd").with("Price", 10000.0),
//!     Record::new().with("Brand", "honda").with("Drive_Type", "fwd").with("Price", 15000.0),
//! ];
//! let cube = aggregate(&records, "Price", &["Brand"], &["Drive_Type"], AggFn::Median, 0.0)?;
//! assert_eq!(cube.n_rows(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Records, dimension keys, aggregation functions
//! - [`parser`] - CSV loading with auto-detection
//! - [`validation`] - Schema checks
//! - [`transform`] - Cleaning, aggregation engine, rotator and pipeline
//! - [`report`] - Console rendering, CSV persistence, chart data
//! - [`logs`] - Progress logging

// Core modules
pub mod error;
pub mod models;

// Loading
pub mod parser;

// Validation
pub mod validation;

// Aggregation
pub mod transform;

// Output
pub mod report;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AggregateError,
    CsvError,
    PipelineError,
    ReportError,
    ValidationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    fields,
    AggFn,
    DimensionKey,
    FieldValue,
    Record,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    parse_str,
    parse_bytes_auto,
    parse_csv_file_auto,
    detect_encoding,
    detect_delimiter,
    decode_content,
    ParseResult,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{validate_measures, validate_schema};

// =============================================================================
// Re-exports - Aggregation engine
// =============================================================================

pub use transform::{
    aggregate,
    rotate,
    Cube,
    RotatedRow,
    RotatedTable,
    SEGMENT_SEPARATOR,
};

// =============================================================================
// Re-exports - Cleaning and pipeline
// =============================================================================

pub use transform::{
    clean_records,
    CleanReport,
    CleanedDataset,
    JAPANESE_BRANDS,
    run_analysis,
    analyse,
    load_dataset,
    load_dataset_bytes,
    save_results,
    olap_slice,
    olap_drill_down,
    olap_rotate,
    AnalysisOptions,
    AnalysisResult,
    Dataset,
    CsvInfo,
};

// =============================================================================
// Re-exports - Report
// =============================================================================

pub use report::{
    render_cube,
    render_rotated,
    save_cube_csv,
    save_rotated_csv,
    write_cube_csv,
    write_rotated_csv,
    ChartSeries,
};
