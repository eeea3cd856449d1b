//! High-level analysis API: load, clean, aggregate, persist.
//!
//! This module runs the three OLAP views of the automobile analysis:
//!
//! - **slice**: median Price by Brand × Drive_Type
//! - **drill-down**: median Price by (Brand, Body_Style) × (Drive_Type, Fuel_Type)
//! - **rotate**: mean Horsepower and mean Price by (Brand, Body_Style),
//!   most expensive segment first
//!
//! # Example
//!
//! ```rust,ignore
//! use autolap::{run_analysis, save_results, AnalysisOptions};
//!
//! let options = AnalysisOptions::from_env();
//! let result = run_analysis(&options)?;
//! save_results(&result, &options)?;
//! println!("{} segments ranked", result.rotated.len());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use super::aggregate::{aggregate, Cube};
use super::clean::{clean_records, CleanReport, JAPANESE_BRANDS};
use super::rotate::{rotate, RotatedTable};
use crate::error::{PipelineError, PipelineResult};
use crate::logs::{
    log_error, log_info, log_info_indent, log_success, log_warning, LogCapture, LogEntry,
    LogLevel,
};
use crate::models::{fields, AggFn, Record};
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, ParseResult};
use crate::report::{render_cube, render_rotated, save_cube_csv, save_rotated_csv, ChartSeries};
use crate::validation::{validate_measures, validate_schema};

pub const SLICE_FILE: &str = "auto_slice_result.csv";
pub const DRILL_FILE: &str = "auto_drill_result.csv";
pub const ROTATE_FILE: &str = "auto_rotate_result.csv";
pub const CHART_FILE: &str = "auto_rotate_chart.json";

/// Options for the analysis pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Source CSV file
    pub data_file: PathBuf,

    /// Directory receiving CSV results and chart data
    pub output_dir: PathBuf,

    /// Brands kept by the filter (empty keeps every brand)
    pub brands: Vec<String>,

    /// Number of segments in the chart data
    pub top_segments: usize,

    /// Rows and columns of the drill-down shown on the console
    pub preview_rows: usize,
    pub preview_cols: usize,

    /// Write results to `output_dir`
    pub save: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("Automobile_data.csv"),
            output_dir: PathBuf::from("olap_auto_results"),
            brands: JAPANESE_BRANDS.iter().map(|b| b.to_string()).collect(),
            top_segments: 15,
            preview_rows: 10,
            preview_cols: 10,
            save: true,
        }
    }
}

impl AnalysisOptions {
    /// Defaults overlaid with `AUTOLAP_*` environment variables.
    ///
    /// - `AUTOLAP_DATA_FILE`
    /// - `AUTOLAP_OUTPUT_DIR`
    /// - `AUTOLAP_BRANDS` (comma-separated)
    /// - `AUTOLAP_TOP_SEGMENTS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();

        if let Some(path) = lookup("AUTOLAP_DATA_FILE") {
            options.data_file = PathBuf::from(path);
        }
        if let Some(dir) = lookup("AUTOLAP_OUTPUT_DIR") {
            options.output_dir = PathBuf::from(dir);
        }
        if let Some(brands) = lookup("AUTOLAP_BRANDS") {
            options.brands = split_list(&brands);
        }
        if let Some(top) = lookup("AUTOLAP_TOP_SEGMENTS").and_then(|v| v.trim().parse().ok()) {
            options.top_segments = top;
        }

        options
    }
}

/// Split a comma-separated list, dropping blanks.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Clean record set plus loading metadata
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<Record>,
    pub info: CsvInfo,
    pub report: CleanReport,
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Result of a complete analysis run
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub slice: Cube,
    pub drill_down: Cube,
    pub rotated: RotatedTable,
    pub chart: ChartSeries,
    pub info: CsvInfo,
    pub report: CleanReport,
    /// Progress entries logged while the analysis ran
    pub log: Vec<LogEntry>,
}

impl AnalysisResult {
    /// Logged entries at `level`.
    pub fn log_count(&self, level: LogLevel) -> usize {
        self.log.iter().filter(|e| e.level == level).count()
    }
}

/// Load, validate and clean the dataset at `options.data_file`.
pub fn load_dataset(options: &AnalysisOptions) -> PipelineResult<Dataset> {
    log_info(format!("📖 Reading {}...", options.data_file.display()));
    let parsed = parse_csv_file_auto(&options.data_file)?;
    prepare(parsed, &options.brands)
}

/// Same as [`load_dataset`] but from raw bytes.
pub fn load_dataset_bytes(bytes: &[u8], brands: &[String]) -> PipelineResult<Dataset> {
    let parsed = parse_bytes_auto(bytes)?;
    prepare(parsed, brands)
}

fn prepare(parsed: ParseResult, brands: &[String]) -> PipelineResult<Dataset> {
    log_success(format!("Detected encoding: {}", parsed.encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(parsed.delimiter)));
    log_success(format!("Read {} rows", parsed.rows.len()));

    validate_schema(&parsed.headers, &fields::REQUIRED)?;

    let info = CsvInfo {
        encoding: parsed.encoding.clone(),
        delimiter: parsed.delimiter,
        headers: parsed.headers.clone(),
        row_count: parsed.rows.len(),
    };

    log_info("🧹 Cleaning...");
    let cleaned = clean_records(&parsed, brands);
    for (column, count) in &cleaned.report.imputed {
        log_info_indent(format!("{}: {} missing values imputed", column, count), 1);
    }
    if cleaned.report.coercion_failures > 0 {
        log_warning(format!(
            "{} numeric cells could not be parsed",
            cleaned.report.coercion_failures
        ));
    }
    log_success(format!(
        "{} records kept, {} filtered out by brand",
        cleaned.report.kept,
        cleaned.report.filtered_out()
    ));

    if cleaned.records.is_empty() {
        log_error("No records left to analyse");
        return Err(PipelineError::NoRecords(cleaned.report.loaded));
    }
    validate_measures(&cleaned.records, &[fields::PRICE, fields::HORSEPOWER])?;

    Ok(Dataset {
        records: cleaned.records,
        info,
        report: cleaned.report,
    })
}

/// Median Price by Brand × Drive_Type.
pub fn olap_slice(records: &[Record]) -> PipelineResult<Cube> {
    Ok(aggregate(
        records,
        fields::PRICE,
        &[fields::BRAND],
        &[fields::DRIVE_TYPE],
        AggFn::Median,
        0.0,
    )?)
}

/// Median Price by (Brand, Body_Style) × (Drive_Type, Fuel_Type).
pub fn olap_drill_down(records: &[Record]) -> PipelineResult<Cube> {
    Ok(aggregate(
        records,
        fields::PRICE,
        &[fields::BRAND, fields::BODY_STYLE],
        &[fields::DRIVE_TYPE, fields::FUEL_TYPE],
        AggFn::Median,
        0.0,
    )?)
}

/// Mean Horsepower and mean Price by (Brand, Body_Style), highest price first.
pub fn olap_rotate(records: &[Record]) -> PipelineResult<RotatedTable> {
    let agg_fns = HashMap::from([
        (fields::HORSEPOWER.to_string(), AggFn::Mean),
        (fields::PRICE.to_string(), AggFn::Mean),
    ]);
    Ok(rotate(
        records,
        &[fields::HORSEPOWER, fields::PRICE],
        &[fields::BRAND, fields::BODY_STYLE],
        &agg_fns,
        fields::PRICE,
        false,
    )?)
}

/// Run the complete analysis.
///
/// 1. Load and clean the dataset
/// 2. Slice
/// 3. Drill-down
/// 4. Rotate, plus chart data for the leading segments
pub fn run_analysis(options: &AnalysisOptions) -> PipelineResult<AnalysisResult> {
    let mut capture = LogCapture::start();
    let dataset = load_dataset(options)?;
    capture.drain();
    let mut result = run_views(dataset, options)?;
    result.log = capture.finish();
    Ok(result)
}

/// Run the views over an already loaded dataset.
pub fn analyse(dataset: Dataset, options: &AnalysisOptions) -> PipelineResult<AnalysisResult> {
    let capture = LogCapture::start();
    let mut result = run_views(dataset, options)?;
    result.log = capture.finish();
    Ok(result)
}

fn run_views(dataset: Dataset, options: &AnalysisOptions) -> PipelineResult<AnalysisResult> {
    log_info("🔪 OLAP slice: median Price by Brand and Drive_Type");
    let slice = olap_slice(&dataset.records)?;
    print!("{}", render_cube(&slice, usize::MAX, usize::MAX));

    log_info("🔍 OLAP drill-down: median Price by segment, drive and fuel type");
    let drill_down = olap_drill_down(&dataset.records)?;
    print!("{}", render_cube(&drill_down, options.preview_rows, options.preview_cols));

    log_info("🔄 OLAP rotate: mean Horsepower and Price by Brand and Body_Style");
    let rotated = olap_rotate(&dataset.records)?;
    print!("{}", render_rotated(&rotated));

    let chart = ChartSeries::from_rotated(
        &rotated,
        fields::PRICE,
        fields::HORSEPOWER,
        options.top_segments,
    )?;
    if chart.is_empty() {
        log_warning("Rotate table is empty, no chart data");
    }

    Ok(AnalysisResult {
        slice,
        drill_down,
        rotated,
        chart,
        info: dataset.info,
        report: dataset.report,
        log: Vec::new(),
    })
}

/// Write every non-empty result into `options.output_dir`.
///
/// Returns the paths that were written.
pub fn save_results(result: &AnalysisResult, options: &AnalysisOptions) -> PipelineResult<Vec<PathBuf>> {
    let dir = options.output_dir.as_path();
    fs::create_dir_all(dir).map_err(crate::error::ReportError::from)?;

    let mut written = Vec::new();
    let mut keep = |saved: bool, path: PathBuf| {
        if saved {
            log_success(format!("💾 Saved {}", path.display()));
            written.push(path);
        } else {
            log_warning(format!("Skipped empty result {}", path.display()));
        }
    };

    let path = dir.join(SLICE_FILE);
    keep(save_cube_csv(&result.slice, &path)?, path);

    let path = dir.join(DRILL_FILE);
    keep(save_cube_csv(&result.drill_down, &path)?, path);

    let path = dir.join(ROTATE_FILE);
    keep(save_rotated_csv(&result.rotated, &path)?, path);

    let path = dir.join(CHART_FILE);
    keep(result.chart.save(&path)?, path);

    Ok(written)
}

/// Format delimiter for display
fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
make,fuel-type,num-of-doors,body-style,drive-wheels,horsepower,price
toyota,gas,four,sedan,fwd,70,10000
toyota,gas,four,sedan,rwd,110,20000
honda,gas,two,hatchback,fwd,76,15000
bmw,gas,four,sedan,rwd,121,30000
mazda,diesel,?,sedan,rwd,?,?
";

    fn brands() -> Vec<String> {
        AnalysisOptions::default().brands
    }

    #[test]
    fn test_default_options() {
        let opts = AnalysisOptions::default();
        assert_eq!(opts.top_segments, 15);
        assert_eq!(opts.output_dir, PathBuf::from("olap_auto_results"));
        assert_eq!(opts.brands.len(), 7);
        assert!(opts.save);
    }

    #[test]
    fn test_options_from_lookup() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("AUTOLAP_DATA_FILE", "cars.csv"),
            ("AUTOLAP_BRANDS", "toyota, honda,"),
            ("AUTOLAP_TOP_SEGMENTS", "5"),
        ]);
        let opts = AnalysisOptions::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(opts.data_file, PathBuf::from("cars.csv"));
        assert_eq!(opts.brands, vec!["toyota", "honda"]);
        assert_eq!(opts.top_segments, 5);
        assert_eq!(opts.output_dir, PathBuf::from("olap_auto_results"));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let opts: AnalysisOptions = serde_json::from_str(r#"{ "top_segments": 3 }"#).unwrap();
        assert_eq!(opts.top_segments, 3);
        assert_eq!(opts.preview_rows, 10);
    }

    #[test]
    fn test_load_dataset_bytes() {
        let dataset = load_dataset_bytes(SAMPLE.as_bytes(), &brands()).unwrap();

        assert_eq!(dataset.info.row_count, 5);
        assert_eq!(dataset.records.len(), 4);
        // mazda price imputed with the median of 10000, 20000, 15000, 30000
        let mazda = &dataset.records[3];
        assert_eq!(mazda.number("Price"), Some(17500.0));
        assert_eq!(mazda.category("Num_of_Doors"), Some("four"));
    }

    #[test]
    fn test_missing_required_column() {
        let err = load_dataset_bytes(b"make,price\ntoyota,1\n", &brands()).unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[test]
    fn test_no_records_after_filter() {
        let err = load_dataset_bytes(SAMPLE.as_bytes(), &["audi".to_string()]).unwrap_err();
        assert!(matches!(err, PipelineError::NoRecords(5)));
    }

    #[test]
    fn test_views() {
        let dataset = load_dataset_bytes(SAMPLE.as_bytes(), &brands()).unwrap();
        let options = AnalysisOptions::default();
        let result = analyse(dataset, &options).unwrap();

        let slice_rows: Vec<String> =
            result.slice.row_keys().iter().map(|k| k.label("")).collect();
        assert_eq!(slice_rows, vec!["toyota", "honda", "mazda"]);
        assert_eq!(result.slice.n_cols(), 2);

        assert_eq!(result.drill_down.row_dims(), &["Brand", "Body_Style"]);
        assert_eq!(result.drill_down.n_cols(), 3);

        // toyota/sedan mean price 15000, mazda/sedan 17500 (imputed)
        assert_eq!(result.rotated.rows()[0].label(" / "), "mazda / sedan");
        assert_eq!(result.rotated.value(1, "Price"), Some(15000.0));
        assert_eq!(result.chart.segments.len(), 3);
    }

    #[test]
    fn test_run_analysis_returns_its_log() {
        let dir = tempfile::tempdir().unwrap();
        let data_file = dir.path().join("cars.csv");
        std::fs::write(&data_file, SAMPLE).unwrap();
        let options = AnalysisOptions {
            data_file,
            save: false,
            ..AnalysisOptions::default()
        };

        let result = run_analysis(&options).unwrap();
        let has = |text: &str| result.log.iter().any(|e| e.message.contains(text));

        assert!(has("Reading"));
        assert!(has("records kept"));
        assert!(has("OLAP slice"));
        assert!(has("OLAP rotate"));
        assert!(result.log_count(LogLevel::Success) >= 1);
    }

    #[test]
    fn test_save_results() {
        let dir = tempfile::tempdir().unwrap();
        let options = AnalysisOptions {
            output_dir: dir.path().join("out"),
            ..AnalysisOptions::default()
        };
        let dataset = load_dataset_bytes(SAMPLE.as_bytes(), &brands()).unwrap();
        let result = analyse(dataset, &options).unwrap();

        let written = save_results(&result, &options).unwrap();
        assert_eq!(written.len(), 4);
        assert!(options.output_dir.join(SLICE_FILE).exists());
        assert!(options.output_dir.join(CHART_FILE).exists());
    }
}
