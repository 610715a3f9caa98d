// Entry point and high-level CLI flow.
//
// `report` runs one full pass over a footfall log and a facility master
// list, prints the dashboard cards and summary previews, and writes the
// exports. `columns` shows how a single file's headers normalize.
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use footfall_report::config::{
    ReportConfig, TableKind, COMBINED_XLSX, DASHBOARD_JSON, DISTRICT_CSV, DISTRICT_PDF,
    DISTRICT_TITLE, DISTRICT_XLSX, FACILITY_CSV, FACILITY_PDF, FACILITY_TITLE, FACILITY_XLSX,
};
use footfall_report::export::{pdf, xlsx};
use footfall_report::loader::load_table;
use footfall_report::normalize::{missing_columns, normalize_headers};
use footfall_report::output::{preview_table_rows, write_bytes, write_csv, write_json};
use footfall_report::pipeline::{self, ReportBundle};
use footfall_report::types::AamType;
use footfall_report::util::format_int;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser)]
#[command(name = "footfall-report", version)]
#[command(
    about = "Footfall summary reports from a facility master list and a daily footfall log",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the dashboard and both summaries, then write the exports
    Report(ReportArgs),
    /// Show how a file's headers normalize and which required columns are missing
    Columns {
        /// Input file (.csv, .tsv, .xlsx, .xls, .ods)
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,

        /// Which checklist to apply
        #[arg(short, long, value_enum)]
        kind: TableArg,
    },
}

#[derive(Args)]
struct ReportArgs {
    /// Daily footfall log
    #[arg(long, env = "FOOTFALL_FILE", value_name = "FILE")]
    footfall: PathBuf,

    /// Facility master list
    #[arg(long, env = "MASTER_FILE", value_name = "FILE")]
    master: PathBuf,

    /// Facility category to summarize (AAM-UPHC or AAM-USHC)
    #[arg(short, long, env = "AAM_TYPE", default_value = "AAM-USHC")]
    aam_type: AamType,

    /// First day of the range (defaults to the earliest entry date)
    #[arg(long, env = "REPORT_FROM", value_name = "YYYY-MM-DD")]
    from: Option<NaiveDate>,

    /// Last day of the range (defaults to the latest entry date)
    #[arg(long, env = "REPORT_TO", value_name = "YYYY-MM-DD")]
    to: Option<NaiveDate>,

    /// Directory the exports are written to
    #[arg(short, long, env = "REPORT_OUT_DIR", default_value = "reports")]
    out_dir: PathBuf,

    /// Export formats, comma separated
    #[arg(long, value_enum, value_delimiter = ',', default_values = ["xlsx", "pdf"])]
    format: Vec<ExportFormat>,

    /// Rows shown per summary preview (the total row is always shown)
    #[arg(long, default_value_t = 10)]
    preview_rows: usize,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Xlsx,
    Pdf,
    Csv,
    Json,
}

#[derive(Copy, Clone, ValueEnum)]
enum TableArg {
    Master,
    Footfall,
}

impl From<TableArg> for TableKind {
    fn from(arg: TableArg) -> Self {
        match arg {
            TableArg::Master => TableKind::Master,
            TableArg::Footfall => TableKind::Footfall,
        }
    }
}

/// Human-readable stderr output plus an append-only plain-text diagnostics
/// file. The returned guard flushes the file writer when dropped.
fn init_tracing() -> WorkerGuard {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "debug.log".to_string());
    let log_path = Path::new(&log_file_path);
    let log_dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let log_file_name = log_path.file_name().unwrap_or(OsStr::new("debug.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("info")));

    let file_layer = fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::try_from_env("RUST_LOG_FILE").unwrap_or_else(|_| EnvFilter::new("debug")),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
    guard
}

fn print_dashboard(bundle: &ReportBundle) {
    println!("Footfall Summary Report");
    println!(
        "(AAM type {}, {} | {} footfall rows in range of {}, {} master rows)\n",
        bundle.aam_type,
        bundle.range,
        format_int(bundle.counts.footfall_in_range),
        format_int(bundle.counts.footfall_rows),
        format_int(bundle.counts.master_rows),
    );
    println!("Dashboard\n");
    println!("{}\n", preview_table_rows(&bundle.metrics.rows(), 4));
}

fn print_summaries(bundle: &ReportBundle, preview_rows: usize) {
    println!("Facility-wise Summary\n");
    println!("{}\n", preview_table_rows(&bundle.facility, preview_rows));
    println!("District-wise Summary\n");
    println!("{}\n", preview_table_rows(&bundle.district, preview_rows));
}

/// Render every spreadsheet/PDF artifact in memory first so a rendering
/// failure leaves the output directory untouched.
fn write_artifacts(bundle: &ReportBundle, out_dir: &Path, formats: &[ExportFormat]) -> Result<()> {
    let wants = |f: ExportFormat| formats.contains(&f);
    let mut rendered: Vec<(&str, Vec<u8>)> = Vec::new();

    if wants(ExportFormat::Xlsx) {
        let metric_rows = bundle.metrics.rows();
        rendered.push((FACILITY_XLSX, xlsx::to_xlsx(&bundle.facility, "Sheet1")?));
        rendered.push((DISTRICT_XLSX, xlsx::to_xlsx(&bundle.district, "Sheet1")?));
        rendered.push((
            COMBINED_XLSX,
            xlsx::to_combined_xlsx(&bundle.facility, &bundle.district, &metric_rows)?,
        ));
    }
    if wants(ExportFormat::Pdf) {
        rendered.push((FACILITY_PDF, pdf::to_pdf(&bundle.facility, FACILITY_TITLE)?));
        rendered.push((DISTRICT_PDF, pdf::to_pdf(&bundle.district, DISTRICT_TITLE)?));
    }

    for (name, bytes) in &rendered {
        let path = out_dir.join(name);
        write_bytes(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
    }
    if wants(ExportFormat::Csv) {
        let path = out_dir.join(FACILITY_CSV);
        write_csv(&path, &bundle.facility).with_context(|| format!("writing {}", path.display()))?;
        let path = out_dir.join(DISTRICT_CSV);
        write_csv(&path, &bundle.district).with_context(|| format!("writing {}", path.display()))?;
    }
    if wants(ExportFormat::Json) {
        let path = out_dir.join(DASHBOARD_JSON);
        write_json(&path, bundle).with_context(|| format!("writing {}", path.display()))?;
    }
    info!(out_dir = %out_dir.display(), "Exports written");
    Ok(())
}

fn handle_report(args: ReportArgs) -> Result<()> {
    let config = ReportConfig {
        aam_type: args.aam_type,
        from: args.from,
        to: args.to,
    };
    let bundle = pipeline::run_files(&args.footfall, &args.master, &config)?;
    print_dashboard(&bundle);
    print_summaries(&bundle, args.preview_rows);
    write_artifacts(&bundle, &args.out_dir, &args.format)?;
    println!("(Exports saved to {})", args.out_dir.display());
    Ok(())
}

fn handle_columns(file: &Path, kind: TableKind) -> Result<()> {
    let mut table = load_table(file).with_context(|| format!("reading {}", file.display()))?;
    let changes = normalize_headers(&mut table, kind);
    println!("{} table: {}\n", kind.label(), file.display());
    for change in &changes {
        if change.original == change.normalized {
            println!("  {:?}", change.original);
        } else {
            println!("  {:?} -> {}", change.original, change.normalized);
        }
    }
    let missing = missing_columns(&table, kind);
    if missing.is_empty() {
        println!("\nAll required columns present.");
    } else {
        println!("\nMissing columns: {}", missing.join(", "));
    }
    println!("Required: {}", kind.required_columns().join(", "));
    Ok(())
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let _guard = init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Report(args) => handle_report(args),
        Commands::Columns { file, kind } => handle_columns(&file, kind.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Report pass failed");
            eprintln!("Error processing files: {e:#}");
            ExitCode::FAILURE
        }
    }
}
