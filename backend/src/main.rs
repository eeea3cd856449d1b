//! Autolap CLI - OLAP views over the automobile dataset
//!
//! # Main Commands
//!
//! ```bash
//! autolap run                          # Slice, drill-down and rotate, saved to olap_auto_results/
//! autolap pivot --measure Price --rows Brand --cols Drive_Type --agg median
//! autolap rotate --measures Horsepower,Price --rows Brand,Body_Style --sort-by Price
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! autolap load                         # Clean the dataset and dump it as JSON
//! autolap aggregations                 # Show supported aggregation functions
//! ```

use clap::{Parser, Subcommand};
use autolap::{
    aggregate, load_dataset, render_cube, render_rotated, rotate, run_analysis, save_cube_csv,
    save_results, save_rotated_csv, AggFn, AggregateError, AnalysisOptions,
};
use autolap::logs::LogLevel;
use autolap::transform::split_list;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "autolap")]
#[command(about = "OLAP slice, drill-down and rotate views over automobile data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Dataset selection shared by every command
#[derive(clap::Args)]
struct DataArgs {
    /// Input CSV file (default: $AUTOLAP_DATA_FILE or Automobile_data.csv)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Comma-separated brands to keep, "all" keeps every brand
    #[arg(short, long)]
    brands: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full analysis: slice, drill-down, rotate, CSV results and chart data
    Run {
        #[command(flatten)]
        data: DataArgs,

        /// Output directory (default: olap_auto_results)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Number of segments in the chart data
        #[arg(long)]
        top: Option<usize>,

        /// Print the views without writing files
        #[arg(long)]
        no_save: bool,
    },

    /// Clean the dataset and output records as JSON
    Load {
        #[command(flatten)]
        data: DataArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Ad-hoc pivot table of one measure
    Pivot {
        #[command(flatten)]
        data: DataArgs,

        /// Measure to aggregate
        #[arg(short, long, default_value = "Price")]
        measure: String,

        /// Comma-separated row dimensions
        #[arg(short, long)]
        rows: String,

        /// Comma-separated column dimensions
        #[arg(short, long, default_value = "")]
        cols: String,

        /// Aggregation function
        #[arg(short, long, default_value = "median")]
        agg: String,

        /// Value of cells without records
        #[arg(long, default_value = "0")]
        fill: f64,

        /// Save the cube as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Ad-hoc multi-measure roll-up, ranked on one measure
    Rotate {
        #[command(flatten)]
        data: DataArgs,

        /// Comma-separated measures
        #[arg(short, long, default_value = "Horsepower,Price")]
        measures: String,

        /// Comma-separated row dimensions
        #[arg(short, long)]
        rows: String,

        /// Per-measure functions, e.g. "Price=median,Horsepower=max" (default: mean)
        #[arg(short, long, default_value = "")]
        agg: String,

        /// Measure to sort on (default: last measure)
        #[arg(short, long)]
        sort_by: Option<String>,

        /// Smallest value first
        #[arg(long)]
        ascending: bool,

        /// Keep only the first N rows
        #[arg(short, long)]
        top: Option<usize>,

        /// Save the table as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show supported aggregation functions
    Aggregations,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            data,
            output_dir,
            top,
            no_save,
        } => cmd_run(&data, output_dir, top, no_save),

        Commands::Load { data, output } => cmd_load(&data, output.as_deref()),

        Commands::Pivot {
            data,
            measure,
            rows,
            cols,
            agg,
            fill,
            output,
        } => cmd_pivot(&data, &measure, &rows, &cols, &agg, fill, output.as_deref()),

        Commands::Rotate {
            data,
            measures,
            rows,
            agg,
            sort_by,
            ascending,
            top,
            output,
        } => cmd_rotate(
            &data,
            &measures,
            &rows,
            &agg,
            sort_by.as_deref(),
            ascending,
            top,
            output.as_deref(),
        ),

        Commands::Aggregations => cmd_aggregations(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Environment defaults with the command-line flags applied on top.
fn options_from(data: &DataArgs) -> AnalysisOptions {
    let mut options = AnalysisOptions::from_env();
    if let Some(ref path) = data.data {
        options.data_file = path.clone();
    }
    if let Some(ref brands) = data.brands {
        options.brands = if brands.trim().eq_ignore_ascii_case("all") {
            Vec::new()
        } else {
            split_list(brands)
        };
    }
    options
}

fn cmd_run(
    data: &DataArgs,
    output_dir: Option<PathBuf>,
    top: Option<usize>,
    no_save: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = options_from(data);
    if let Some(dir) = output_dir {
        options.output_dir = dir;
    }
    if let Some(n) = top {
        options.top_segments = n;
    }
    options.save = !no_save;

    let result = run_analysis(&options)?;
    let warnings = result.log_count(LogLevel::Warning);
    if warnings > 0 {
        eprintln!("\n⚠️  {} warning(s) during the analysis", warnings);
    }

    if options.save {
        let written = save_results(&result, &options)?;
        eprintln!("\n✅ Analysis complete: {} files in '{}'", written.len(), options.output_dir.display());
    } else {
        eprintln!("\n✅ Analysis complete (nothing saved)");
    }
    Ok(())
}

fn cmd_load(data: &DataArgs, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let options = options_from(data);
    let dataset = load_dataset(&options)?;

    eprintln!("   Columns: {}", dataset.info.headers.join(", "));
    eprintln!("✅ {} clean records", dataset.records.len());

    let json = serde_json::to_string_pretty(&dataset.records)?;
    write_output(&json, output)?;
    Ok(())
}

fn cmd_pivot(
    data: &DataArgs,
    measure: &str,
    rows: &str,
    cols: &str,
    agg: &str,
    fill: f64,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let agg_fn: AggFn = agg.parse()?;
    let row_dims = split_list(rows);
    let col_dims = split_list(cols);

    let dataset = load_dataset(&options_from(data))?;
    let cube = aggregate(
        &dataset.records,
        measure,
        &as_strs(&row_dims),
        &as_strs(&col_dims),
        agg_fn,
        fill,
    )?;

    eprintln!("\n📊 {} of {} ({} rows x {} columns)", agg_fn, measure, cube.n_rows(), cube.n_cols());
    print!("{}", render_cube(&cube, usize::MAX, usize::MAX));

    if let Some(path) = output {
        if save_cube_csv(&cube, path)? {
            eprintln!("💾 Output written to: {}", path.display());
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_rotate(
    data: &DataArgs,
    measures: &str,
    rows: &str,
    agg: &str,
    sort_by: Option<&str>,
    ascending: bool,
    top: Option<usize>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let measures = split_list(measures);
    let row_dims = split_list(rows);
    let agg_fns = parse_agg_fns(&measures, agg)?;
    let sort_by = match sort_by {
        Some(m) => m.to_string(),
        None => measures.last().cloned().ok_or("at least one measure is required")?,
    };

    let dataset = load_dataset(&options_from(data))?;
    let mut table = rotate(
        &dataset.records,
        &as_strs(&measures),
        &as_strs(&row_dims),
        &agg_fns,
        &sort_by,
        ascending,
    )?;
    if let Some(n) = top {
        table = table.top(n);
    }

    eprintln!("\n🔄 {} segments by {}", table.len(), sort_by);
    print!("{}", render_rotated(&table));

    if let Some(path) = output {
        if save_rotated_csv(&table, path)? {
            eprintln!("💾 Output written to: {}", path.display());
        } else {
            eprintln!("⚠️  Empty table, nothing written");
        }
    }
    Ok(())
}

fn cmd_aggregations() -> Result<(), Box<dyn std::error::Error>> {
    for agg_fn in AggFn::ALL {
        println!("{}", agg_fn);
    }
    Ok(())
}

/// Parse "Measure=fn" pairs; measures without an entry use the mean.
fn parse_agg_fns(measures: &[String], pairs: &str) -> Result<HashMap<String, AggFn>, AggregateError> {
    let mut agg_fns: HashMap<String, AggFn> =
        measures.iter().map(|m| (m.clone(), AggFn::Mean)).collect();

    for pair in split_list(pairs) {
        let (measure, name) = pair.split_once('=').ok_or_else(|| {
            AggregateError::InvalidQuery(format!("expected Measure=function, got '{}'", pair))
        })?;
        agg_fns.insert(measure.trim().to_string(), name.parse()?);
    }
    Ok(agg_fns)
}

fn as_strs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
